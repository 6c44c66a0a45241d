use std::fmt::Write;

use crate::color::{resolve_stops, ResolvedStops};
use crate::config::{GaugeConfig, ShapeType};
use crate::gauge::Frame;
use crate::path::{format_number as num, FillRule, Path};
use crate::shape::{FillShape, HitRegion};

const TRANSPARENT: &str = "rgba(0, 0, 0, 0)";
const UNIT_FONT_RATIO: f64 = 0.6;

/// Writes a complete standalone SVG document for a committed frame.
///
/// Output depends only on its inputs, so a gauge built with deterministic ids
/// always produces the same text.
pub fn render_document(frame: &Frame, config: &GaugeConfig) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_document(&mut out, frame, config);
    out
}

fn write_document(out: &mut String, frame: &Frame, config: &GaugeConfig) -> std::fmt::Result {
    let (cx, cy) = (config.width / 2.0, config.height / 2.0);
    let clip_url = format!("url(#{})", escape(&frame.clip_id));
    let wave_fill = if config.gradient {
        format!("url(#{})", escape(&frame.gradient_id))
    } else {
        escape(&config.wave_color)
    };

    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}">"#,
        num(config.width),
        num(config.height)
    )?;
    writeln!(out, r#"  <g transform="translate({},{})">"#, num(cx), num(cy))?;
    writeln!(out, "    <defs>")?;
    writeln!(out, r#"      <clipPath id="{}">"#, escape(&frame.clip_id))?;
    writeln!(
        out,
        r#"        <path d="{}" transform="translate({},0)"/>"#,
        frame.clip_path.to_svg(),
        num(frame.wave_translation)
    )?;
    writeln!(out, "      </clipPath>")?;
    writeln!(out, "    </defs>")?;

    write_text(out, "text", frame, config, &config.text_color)?;
    writeln!(out, r#"    <g clip-path="{clip_url}">"#)?;
    match frame.fill {
        FillShape::Circle { radius } => writeln!(
            out,
            r#"      <circle class="wave" r="{}" fill="{wave_fill}"/>"#,
            num(radius)
        )?,
        FillShape::Square { half_side } => writeln!(
            out,
            r#"      <rect class="wave" x="{}" y="{}" width="{}" height="{}" fill="{wave_fill}"/>"#,
            num(-half_side),
            num(-half_side),
            num(half_side * 2.0),
            num(half_side * 2.0)
        )?,
    }
    write_text(out, "waveText", frame, config, &config.wave_text_color)?;
    writeln!(out, "    </g>")?;

    write_outline(out, &frame.container_path, config)?;
    match frame.hit_region {
        HitRegion::Circle { radius } => writeln!(
            out,
            r#"    <circle r="{}" fill="{TRANSPARENT}" stroke="{TRANSPARENT}" pointer-events="all"/>"#,
            num(radius)
        )?,
        HitRegion::Square { half_side } => writeln!(
            out,
            r#"    <rect x="{}" y="{}" width="{}" height="{}" fill="{TRANSPARENT}" stroke="{TRANSPARENT}" pointer-events="all"/>"#,
            num(-half_side),
            num(-half_side),
            num(half_side * 2.0),
            num(half_side * 2.0)
        )?,
    }
    writeln!(out, "  </g>")?;

    write_gradient(out, &frame.gradient_id, config)?;
    writeln!(out, "</svg>")
}

fn write_text(
    out: &mut String,
    class: &str,
    frame: &Frame,
    config: &GaugeConfig,
    fill: &str,
) -> std::fmt::Result {
    let font_size = config.text_scale * config.radius() / 2.0;
    let value = frame
        .label
        .strip_suffix(config.unit.as_str())
        .unwrap_or(&frame.label);

    writeln!(
        out,
        r#"    <text class="{class}" text-anchor="middle" transform="translate({},{})" fill="{}">"#,
        num(config.text_offset_x),
        num(config.text_offset_y),
        escape(fill)
    )?;
    writeln!(
        out,
        r#"      <tspan><tspan font-size="{}px" dominant-baseline="middle">{}</tspan><tspan font-size="{}px" dominant-baseline="middle">{}</tspan></tspan>"#,
        num(font_size),
        escape(value),
        num(font_size * UNIT_FONT_RATIO),
        escape(&config.unit)
    )?;
    writeln!(out, "    </text>")
}

fn write_outline(out: &mut String, path: &Path, config: &GaugeConfig) -> std::fmt::Result {
    let class = match config.shape_type {
        ShapeType::Circle => "circle",
        ShapeType::Rectangle => "rectangle",
    };
    let fill_rule = match path.fill_rule() {
        FillRule::EvenOdd => r#" fill-rule="evenodd""#,
        FillRule::NonZero => "",
    };
    writeln!(
        out,
        r#"    <path class="{class}" d="{}" fill="{}"{fill_rule}/>"#,
        path.to_svg(),
        escape(&config.shape_color)
    )
}

fn write_gradient(out: &mut String, id: &str, config: &GaugeConfig) -> std::fmt::Result {
    writeln!(out, "  <defs>")?;
    writeln!(
        out,
        r#"    <linearGradient id="{}" x1="0%" x2="0%" y1="100%" y2="0%">"#,
        escape(id)
    )?;
    match resolve_stops(&config.gradient_stops, &config.wave_color) {
        ResolvedStops::Stops(stops) => {
            for stop in stops.iter() {
                writeln!(
                    out,
                    r#"      <stop offset="{}" stop-color="{}" stop-opacity="{}"/>"#,
                    escape(&stop.offset),
                    escape(&stop.stop_color),
                    num(stop.stop_opacity)
                )?;
            }
        }
        ResolvedStops::Raw(fragment) => writeln!(out, "      {fragment}")?,
    }
    writeln!(out, "    </linearGradient>")?;
    writeln!(out, "  </defs>")
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
