use rusttype::{point, Font, PositionedGlyph, Scale};

use crate::color::{resolve_stops, sample_stops, Color, ResolvedStops};
use crate::config::{
    GaugeConfig, DEFAULT_FILL_COLOR, DEFAULT_TEXT_COLOR, DEFAULT_WAVE_TEXT_COLOR,
};
use crate::error::GaugeError;
use crate::gauge::Frame;
use crate::path::{FillRule, Path, Point};
use crate::shape::{frame_path, ring_path, FillShape};

const BACKGROUND: Color = Color::new(0xff, 0xff, 0xff);
const SUBSAMPLES: usize = 4;
const FLATTEN_TOLERANCE: f64 = 0.5;
const UNIT_FONT_RATIO: f32 = 0.6;

// ============================================================================
// CORE DATA TYPES
// ============================================================================

/// RGBA8 frame buffer the gauge is painted into.
pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self, color: Color) {
        let (r, g, b) = color.as_tuple();
        for pixel in self.frame.chunks_exact_mut(4) {
            pixel.copy_from_slice(&[r, g, b, 0xff]);
        }
    }

    /// Source-over blend of `color` at `alpha` coverage.
    fn blend(&mut self, x: usize, y: usize, color: Color, alpha: f32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = (y * self.width + x) * 4;
        let Some(dst) = self.frame.get_mut(idx..idx + 4) else {
            return;
        };
        let a = (alpha * color.opacity as f32).clamp(0.0, 1.0);
        let mix = |src: u8, dst: u8| (f32::from(src) * a + f32::from(dst) * (1.0 - a)).round() as u8;
        dst[0] = mix(color.r, dst[0]);
        dst[1] = mix(color.g, dst[1]);
        dst[2] = mix(color.b, dst[2]);
        dst[3] = 0xff;
    }
}

/// Maps gauge coordinates (origin at the gauge centre) to pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub origin_x: f64,
    pub origin_y: f64,
    pub scale: f64,
}

impl Viewport {
    /// Centres a `gauge_width` x `gauge_height` gauge in the canvas, scaled to fit.
    pub fn fit(gauge_width: f64, gauge_height: f64, canvas_width: usize, canvas_height: usize) -> Self {
        let (cw, ch) = (canvas_width as f64, canvas_height as f64);
        let scale = if gauge_width > 0.0 && gauge_height > 0.0 {
            (cw / gauge_width).min(ch / gauge_height)
        } else {
            1.0
        };
        Self {
            origin_x: cw / 2.0,
            origin_y: ch / 2.0,
            scale,
        }
    }

    fn map(&self, p: Point) -> Point {
        Point::new(self.origin_x + p.x * self.scale, self.origin_y + p.y * self.scale)
    }

    /// Inverse of the gauge-to-pixel mapping.
    pub fn unmap(&self, x: f64, y: f64) -> Point {
        let scale = if self.scale > 0.0 { self.scale } else { 1.0 };
        Point::new((x - self.origin_x) / scale, (y - self.origin_y) / scale)
    }
}

/// Per-pixel coverage in [0, 1] of a filled path.
#[derive(Debug, Clone, PartialEq)]
pub struct Coverage {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Coverage {
    pub fn at(&self, x: usize, y: usize) -> f32 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.data[y * self.width + x]
    }
}

// ============================================================================
// RASTERIZATION
// ============================================================================

/// Scanline coverage of `path`, with `SUBSAMPLES` rows per pixel and exact
/// horizontal span coverage.
pub fn rasterize(path: &Path, viewport: &Viewport, width: usize, height: usize) -> Coverage {
    let mut coverage = Coverage {
        width,
        height,
        data: vec![0.0; width * height],
    };
    let polygons: Vec<Vec<Point>> = path
        .to_polygons(FLATTEN_TOLERANCE / viewport.scale.max(f64::EPSILON))
        .into_iter()
        .map(|polygon| polygon.into_iter().map(|p| viewport.map(p)).collect())
        .collect();
    if polygons.is_empty() {
        return coverage;
    }

    let weight = 1.0 / SUBSAMPLES as f32;
    let mut crossings: Vec<(f64, i32)> = Vec::new();
    for y in 0..height {
        for sub in 0..SUBSAMPLES {
            let sy = y as f64 + (sub as f64 + 0.5) / SUBSAMPLES as f64;
            crossings.clear();
            for polygon in &polygons {
                for (i, a) in polygon.iter().enumerate() {
                    let b = polygon[(i + 1) % polygon.len()];
                    if (a.y <= sy) != (b.y <= sy) {
                        let x = a.x + (sy - a.y) / (b.y - a.y) * (b.x - a.x);
                        crossings.push((x, if b.y > a.y { 1 } else { -1 }));
                    }
                }
            }
            crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut winding = 0;
            for pair in crossings.windows(2) {
                let (x0, dir) = pair[0];
                let x1 = pair[1].0;
                winding = match path.fill_rule() {
                    FillRule::EvenOdd => winding ^ 1,
                    FillRule::NonZero => winding + dir,
                };
                if winding != 0 {
                    add_span(&mut coverage, y, x0, x1, weight);
                }
            }
        }
    }
    coverage
}

fn add_span(coverage: &mut Coverage, y: usize, x0: f64, x1: f64, weight: f32) {
    let start = x0.max(0.0);
    let end = x1.min(coverage.width as f64);
    if end <= start {
        return;
    }
    let row = y * coverage.width;
    let first = start.floor() as usize;
    let last = (end.ceil() as usize).min(coverage.width);
    for x in first..last {
        let overlap = (end.min(x as f64 + 1.0) - start.max(x as f64)).max(0.0);
        let cell = &mut coverage.data[row + x];
        *cell = (*cell + overlap as f32 * weight).min(1.0);
    }
}

fn fill_shape_path(fill: FillShape) -> Path {
    match fill {
        FillShape::Circle { radius } => ring_path(radius, 0.0),
        FillShape::Square { half_side } => frame_path(half_side, 0.0),
    }
}

fn parse_or(css: &str, fallback: &str) -> Color {
    Color::parse(css).unwrap_or_else(|| {
        log::debug!("cannot parse color {css:?}, using {fallback}");
        Color::parse(fallback).unwrap_or(Color::new(0, 0, 0))
    })
}

// ============================================================================
// RENDERING
// ============================================================================

/// Paints a committed frame: label, clipped wave fill with its label, then the
/// container outline on top.
pub fn render_frame(canvas: &mut Canvas, frame: &Frame, config: &GaugeConfig, font: Option<&Font>) {
    let (width, height) = (canvas.width, canvas.height);
    let viewport = Viewport::fit(config.width, config.height, width, height);
    canvas.clear(BACKGROUND);

    let text_color = parse_or(&config.text_color, DEFAULT_TEXT_COLOR);
    let wave_text_color = parse_or(&config.wave_text_color, DEFAULT_WAVE_TEXT_COLOR);
    let wave_color = parse_or(&config.wave_color, DEFAULT_FILL_COLOR);
    let shape_color = parse_or(&config.shape_color, DEFAULT_FILL_COLOR);

    let label = Label::new(frame, config, &viewport);
    if let Some(font) = font {
        draw_label(canvas, font, &label, text_color, None);
    }

    let clip_path = frame.clip_path.translated(frame.wave_translation, 0.0);
    let clip = rasterize(&clip_path, &viewport, width, height);
    let fill = rasterize(&fill_shape_path(frame.fill), &viewport, width, height);

    let resolved = config
        .gradient
        .then(|| resolve_stops(&config.gradient_stops, &config.wave_color));
    let stops = resolved.as_ref().and_then(ResolvedStops::stops);
    if resolved.is_some() && stops.is_none() {
        log::debug!("raw gradient fragments only render to SVG, using a flat fill");
    }
    let (top, bottom) = {
        let (min, max) = frame.fill.extent();
        (viewport.map(Point::new(0.0, min)).y, viewport.map(Point::new(0.0, max)).y)
    };

    for y in 0..height {
        // Gradients run bottom (0%) to top (100%) across the fill's bounding box.
        let row_color = stops
            .and_then(|stops| {
                let t = if bottom > top { (bottom - (y as f64 + 0.5)) / (bottom - top) } else { 0.0 };
                sample_stops(stops, t.clamp(0.0, 1.0))
            })
            .unwrap_or(wave_color);
        for x in 0..width {
            let alpha = fill.at(x, y) * clip.at(x, y);
            if alpha > 0.0 {
                canvas.blend(x, y, row_color, alpha);
            }
        }
    }

    if let Some(font) = font {
        draw_label(canvas, font, &label, wave_text_color, Some(&clip));
    }

    let outline = rasterize(&frame.container_path, &viewport, width, height);
    for y in 0..height {
        for x in 0..width {
            let alpha = outline.at(x, y);
            if alpha > 0.0 {
                canvas.blend(x, y, shape_color, alpha);
            }
        }
    }
}

// ============================================================================
// TEXT
// ============================================================================

/// Parses a TrueType or OpenType font for the value label.
pub fn load_font(data: Vec<u8>) -> Result<Font<'static>, GaugeError> {
    Font::try_from_vec(data).ok_or(GaugeError::InvalidFont)
}

struct Label<'t> {
    value: String,
    unit: &'t str,
    font_size: f32,
    center: Point,
}

impl<'t> Label<'t> {
    fn new(frame: &Frame, config: &'t GaugeConfig, viewport: &Viewport) -> Self {
        let value_text = frame
            .label
            .strip_suffix(config.unit.as_str())
            .unwrap_or(&frame.label)
            .to_string();
        let font_size = (config.text_scale * config.radius() / 2.0 * viewport.scale) as f32;
        Self {
            value: value_text,
            unit: &config.unit,
            font_size,
            center: viewport.map(Point::new(config.text_offset_x, config.text_offset_y)),
        }
    }
}

fn draw_label(canvas: &mut Canvas, font: &Font, label: &Label, color: Color, clip: Option<&Coverage>) {
    if label.font_size <= 0.0 {
        return;
    }
    let value_scale = Scale::uniform(label.font_size);
    let unit_scale = Scale::uniform(label.font_size * UNIT_FONT_RATIO);
    let value_width = text_advance(&label.value, font, value_scale);
    let unit_width = text_advance(label.unit, font, unit_scale);
    let left = label.center.x as f32 - (value_width + unit_width) / 2.0;
    let middle = label.center.y as f32;

    draw_text(canvas, font, &label.value, value_scale, left, middle, color, clip);
    draw_text(canvas, font, label.unit, unit_scale, left + value_width, middle, color, clip);
}

fn text_advance(text: &str, font: &Font, scale: Scale) -> f32 {
    font.layout(text, scale, point(0.0, 0.0))
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
}

/// Draws `text` starting at `left`, vertically centred on `middle`.
#[allow(clippy::too_many_arguments)]
fn draw_text(
    canvas: &mut Canvas,
    font: &Font,
    text: &str,
    scale: Scale,
    left: f32,
    middle: f32,
    color: Color,
    clip: Option<&Coverage>,
) {
    let v_metrics = font.v_metrics(scale);
    let baseline = middle + (v_metrics.ascent + v_metrics.descent) / 2.0;
    let glyphs: Vec<PositionedGlyph> = font.layout(text, scale, point(left, baseline)).collect();

    for glyph in glyphs {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                let px = bb.min.x + gx as i32;
                let py = bb.min.y + gy as i32;
                if px < 0 || py < 0 {
                    return;
                }
                let (px, py) = (px as usize, py as usize);
                let mask = clip.map_or(1.0, |c| c.at(px, py));
                if v * mask > 0.0 {
                    canvas.blend(px, py, color, v * mask);
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{GradientStop, StopSpec};
    use crate::gauge::Gauge;
    use crate::id::DeterministicIds;

    fn render(config: GaugeConfig) -> (Vec<u8>, usize) {
        let config = GaugeConfig {
            rise_animation: false,
            ..config
        };
        let gauge = Gauge::with_id_provider(config.clone(), &DeterministicIds);
        let size = config.width as usize;
        let mut buffer = vec![0u8; size * size * 4];
        let mut canvas = Canvas::new(&mut buffer, size, size);
        render_frame(&mut canvas, &gauge.frame(), &config, None);
        (buffer, size)
    }

    fn pixel(buffer: &[u8], size: usize, x: usize, y: usize) -> [u8; 3] {
        let idx = (y * size + x) * 4;
        [buffer[idx], buffer[idx + 1], buffer[idx + 2]]
    }

    #[test]
    fn test_rasterize_square_coverage() {
        let path = frame_path(2.0, 0.0);
        let viewport = Viewport {
            origin_x: 4.0,
            origin_y: 4.0,
            scale: 1.0,
        };
        let coverage = rasterize(&path, &viewport, 8, 8);
        assert_eq!(coverage.at(4, 4), 1.0);
        assert_eq!(coverage.at(2, 2), 1.0);
        assert_eq!(coverage.at(1, 4), 0.0);
        assert_eq!(coverage.at(6, 4), 0.0);
    }

    #[test]
    fn test_even_odd_leaves_hole() {
        let path = frame_path(4.0, 2.0);
        let viewport = Viewport {
            origin_x: 5.0,
            origin_y: 5.0,
            scale: 1.0,
        };
        let coverage = rasterize(&path, &viewport, 10, 10);
        assert_eq!(coverage.at(5, 5), 0.0);
        assert_eq!(coverage.at(1, 5), 1.0);
    }

    #[test]
    fn test_gradient_stops_color_the_wave() {
        let red = GaugeConfig::builder()
            .width(100.0)
            .height(100.0)
            .value(50.0)
            .wave_amplitude(0.0)
            .gradient(true)
            .gradient_stops(StopSpec::Explicit(vec![GradientStop::new("0%", "rgb(255, 0, 0)", 1.0)]))
            .build();
        let (buffer, size) = render(red);
        assert_eq!(pixel(&buffer, size, 50, 70), [255, 0, 0]);

        let raw = GaugeConfig::builder()
            .width(100.0)
            .height(100.0)
            .value(50.0)
            .wave_amplitude(0.0)
            .gradient(true)
            .gradient_stops(StopSpec::RawFragment("<stop/>".to_string()))
            .wave_color("rgb(0, 0, 255)".to_string())
            .build();
        let (buffer, size) = render(raw);
        assert_eq!(pixel(&buffer, size, 50, 70), [0, 0, 255]);
    }

    #[test]
    fn test_half_full_gauge_paints_wave_below_centre() {
        let config = GaugeConfig::builder()
            .width(100.0)
            .height(100.0)
            .value(50.0)
            .wave_amplitude(0.0)
            .wave_color("rgb(0, 0, 255)".to_string())
            .build();
        let (buffer, size) = render(config);
        // Below the surface: wave color. Above it: background.
        assert_eq!(pixel(&buffer, size, 50, 70), [0, 0, 255]);
        assert_eq!(pixel(&buffer, size, 50, 30), [255, 255, 255]);
    }

    #[test]
    fn test_outline_uses_shape_color() {
        let config = GaugeConfig::builder()
            .width(100.0)
            .height(100.0)
            .shape_color("rgb(255, 0, 0)".to_string())
            .build();
        let (buffer, size) = render(config);
        // Ring spans radius 45..50 around the centre.
        assert_eq!(pixel(&buffer, size, 50, 2), [255, 0, 0]);
        assert_eq!(pixel(&buffer, size, 50, 50), [255, 255, 255]);
    }

    #[test]
    fn test_invalid_font_is_rejected() {
        assert!(matches!(load_font(vec![0, 1, 2, 3]), Err(GaugeError::InvalidFont)));
    }

    #[test]
    fn test_unmap_inverts_viewport() {
        let viewport = Viewport::fit(400.0, 400.0, 200, 200);
        assert_eq!(viewport.unmap(100.0, 100.0), Point::new(0.0, 0.0));
        assert_eq!(viewport.unmap(0.0, 50.0), Point::new(-200.0, -100.0));
    }

    #[test]
    fn test_viewport_fits_smaller_axis() {
        let viewport = Viewport::fit(400.0, 200.0, 200, 200);
        assert_eq!(viewport.scale, 0.5);
        assert_eq!((viewport.origin_x, viewport.origin_y), (100.0, 100.0));
    }
}
