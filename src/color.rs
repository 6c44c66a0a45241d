use std::borrow::Cow;

const DARKER: f64 = 0.7;
const BRIGHTER: f64 = 1.0 / DARKER;

/// Shade factor applied to the derived gradient's outer stops.
pub const GRADIENT_SHADE: f64 = 0.5;

/// Color representation for gauge elements
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub opacity: f64,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, opacity: 1.0 }
    }

    pub const fn with_opacity(self, opacity: f64) -> Self {
        Self { opacity, ..self }
    }

    pub const fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// Parses a CSS color: `rgb()`, `rgba()`, `#rgb`, `#rrggbb` or a basic
    /// named color. Returns `None` for anything else.
    pub fn parse(input: &str) -> Option<Self> {
        let text = input.trim().to_ascii_lowercase();

        if let Some(hex) = text.strip_prefix('#') {
            return parse_hex(hex);
        }
        if let Some(body) = text.strip_prefix("rgba(").and_then(|s| s.strip_suffix(')')) {
            let parts = split_args(body);
            if parts.len() != 4 {
                return None;
            }
            let alpha = parts[3].parse::<f64>().ok()?;
            return Some(parse_rgb_channels(&parts[..3])?.with_opacity(alpha.clamp(0.0, 1.0)));
        }
        if let Some(body) = text.strip_prefix("rgb(").and_then(|s| s.strip_suffix(')')) {
            let parts = split_args(body);
            if parts.len() != 3 {
                return None;
            }
            return parse_rgb_channels(&parts);
        }
        named(&text)
    }

    /// Multiplies every channel by `0.7^k`.
    pub fn darker(self, k: f64) -> Self {
        self.scale(DARKER.powf(k))
    }

    /// Multiplies every channel by `(1/0.7)^k`.
    pub fn brighter(self, k: f64) -> Self {
        self.scale(BRIGHTER.powf(k))
    }

    /// HSL lightness in [0, 1].
    pub fn lightness(self) -> f64 {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        (f64::from(max) + f64::from(min)) / 2.0 / 255.0
    }

    pub fn to_css(self) -> String {
        if self.opacity < 1.0 {
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.opacity)
        } else {
            format!("rgb({}, {}, {})", self.r, self.g, self.b)
        }
    }

    fn scale(self, k: f64) -> Self {
        let channel = |c: u8| (f64::from(c) * k).round().clamp(0.0, 255.0) as u8;
        Self {
            r: channel(self.r),
            g: channel(self.g),
            b: channel(self.b),
            opacity: self.opacity,
        }
    }
}

fn split_args(body: &str) -> Vec<&str> {
    body.split(',').map(str::trim).collect()
}

fn parse_rgb_channels(parts: &[&str]) -> Option<Color> {
    let mut channels = [0u8; 3];
    for (slot, part) in channels.iter_mut().zip(parts) {
        let value = match part.strip_suffix('%') {
            Some(percent) => percent.parse::<f64>().ok()? * 2.55,
            None => part.parse::<f64>().ok()?,
        };
        if !value.is_finite() {
            return None;
        }
        *slot = value.round().clamp(0.0, 255.0) as u8;
    }
    Some(Color::new(channels[0], channels[1], channels[2]))
}

fn parse_hex(hex: &str) -> Option<Color> {
    let digit = |i: usize| u8::from_str_radix(hex.get(i..=i)?, 16).ok();
    match hex.len() {
        3 => {
            let (r, g, b) = (digit(0)?, digit(1)?, digit(2)?);
            Some(Color::new(r * 17, g * 17, b * 17))
        }
        6 => {
            let pair = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
            Some(Color::new(pair(0)?, pair(2)?, pair(4)?))
        }
        _ => None,
    }
}

fn named(name: &str) -> Option<Color> {
    let color = match name {
        "black" => Color::new(0, 0, 0),
        "white" => Color::new(255, 255, 255),
        "red" => Color::new(255, 0, 0),
        "lime" => Color::new(0, 255, 0),
        "green" => Color::new(0, 128, 0),
        "blue" => Color::new(0, 0, 255),
        "yellow" => Color::new(255, 255, 0),
        "cyan" | "aqua" => Color::new(0, 255, 255),
        "magenta" | "fuchsia" => Color::new(255, 0, 255),
        "gray" | "grey" => Color::new(128, 128, 128),
        "silver" => Color::new(192, 192, 192),
        "maroon" => Color::new(128, 0, 0),
        "olive" => Color::new(128, 128, 0),
        "navy" => Color::new(0, 0, 128),
        "purple" => Color::new(128, 0, 128),
        "teal" => Color::new(0, 128, 128),
        "orange" => Color::new(255, 165, 0),
        "steelblue" => Color::new(70, 130, 180),
        "transparent" => Color::new(0, 0, 0).with_opacity(0.0),
        _ => return None,
    };
    Some(color)
}

// ============================================================================
// GRADIENT STOPS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct GradientStop {
    pub offset: String,
    pub stop_color: String,
    pub stop_opacity: f64,
}

impl GradientStop {
    pub fn new(offset: &str, stop_color: &str, stop_opacity: f64) -> Self {
        Self {
            offset: offset.to_string(),
            stop_color: stop_color.to_string(),
            stop_opacity,
        }
    }

    /// Offset as a fraction in [0, 1]; accepts `"50%"` or `"0.5"`.
    pub fn offset_fraction(&self) -> Option<f64> {
        let offset = self.offset.trim();
        let fraction = match offset.strip_suffix('%') {
            Some(percent) => percent.trim().parse::<f64>().ok()? / 100.0,
            None => offset.parse::<f64>().ok()?,
        };
        Some(fraction.clamp(0.0, 1.0))
    }
}

/// How the wave gradient gets its stops.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StopSpec {
    /// Derive three stops from the wave color.
    #[default]
    Derived,
    /// Use these stops as given.
    Explicit(Vec<GradientStop>),
    /// Pre-rendered `<stop>` markup, emitted verbatim by the SVG writer.
    RawFragment(String),
}

/// Stops ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedStops<'a> {
    Stops(Cow<'a, [GradientStop]>),
    Raw(&'a str),
}

impl ResolvedStops<'_> {
    pub fn stops(&self) -> Option<&[GradientStop]> {
        match self {
            Self::Stops(stops) => Some(stops),
            Self::Raw(_) => None,
        }
    }
}

/// Three stops around `fill_color`: darker at 0%, the color itself at 50% and
/// brighter at 100%. An unparsable color is used unchanged for every stop.
pub fn derive_stops(fill_color: &str) -> Vec<GradientStop> {
    let parsed = Color::parse(fill_color);
    if parsed.is_none() {
        log::debug!("cannot parse fill color {fill_color:?}, gradient stops use it unchanged");
    }
    let shade = |f: fn(Color, f64) -> Color| {
        parsed
            .map(|c| f(c, GRADIENT_SHADE).to_css())
            .unwrap_or_else(|| fill_color.to_string())
    };

    vec![
        GradientStop::new("0%", &shade(Color::darker), 1.0),
        GradientStop::new("50%", fill_color, 0.75),
        GradientStop::new("100%", &shade(Color::brighter), 0.5),
    ]
}

pub fn resolve_stops<'a>(spec: &'a StopSpec, fill_color: &str) -> ResolvedStops<'a> {
    match spec {
        StopSpec::Derived => ResolvedStops::Stops(Cow::Owned(derive_stops(fill_color))),
        StopSpec::Explicit(stops) => ResolvedStops::Stops(Cow::Borrowed(stops)),
        StopSpec::RawFragment(raw) => ResolvedStops::Raw(raw),
    }
}

/// Samples a stop list at `t` in [0, 1], interpolating color and opacity.
///
/// Stops whose color cannot be parsed are skipped.
pub fn sample_stops(stops: &[GradientStop], t: f64) -> Option<Color> {
    let mut parsed: Vec<(f64, Color)> = stops
        .iter()
        .filter_map(|stop| {
            let color = Color::parse(&stop.stop_color)?;
            let offset = stop.offset_fraction()?;
            Some((offset, color.with_opacity(color.opacity * stop.stop_opacity.clamp(0.0, 1.0))))
        })
        .collect();
    parsed.sort_by(|a, b| a.0.total_cmp(&b.0));

    let (first, last) = (parsed.first()?, parsed.last()?);
    if t <= first.0 {
        return Some(first.1);
    }
    if t >= last.0 {
        return Some(last.1);
    }
    let upper = parsed.iter().position(|(offset, _)| *offset >= t)?;
    let (o0, c0) = parsed[upper - 1];
    let (o1, c1) = parsed[upper];
    let f = if o1 > o0 { (t - o0) / (o1 - o0) } else { 0.0 };
    let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * f).round() as u8;
    Some(Color {
        r: mix(c0.r, c1.r),
        g: mix(c0.g, c1.g),
        b: mix(c0.b, c1.b),
        opacity: c0.opacity + (c1.opacity - c0.opacity) * f,
    })
}
