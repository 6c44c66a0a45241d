use bon::Builder;
use std::time::Duration;

use crate::color::StopSpec;

pub const DEFAULT_FILL_COLOR: &str = "rgb(23, 139, 202)";
pub const DEFAULT_TEXT_COLOR: &str = "rgb(0, 0, 0)";
pub const DEFAULT_WAVE_TEXT_COLOR: &str = "rgb(255, 255, 255)";

/// Lower bound of the gauge's value range.
pub const MIN_VALUE: f64 = 0.0;
/// Upper bound of the gauge's value range.
pub const MAX_VALUE: f64 = 100.0;
/// Highest wave frequency kept by `sanitized`; each wave costs 40 samples.
pub const MAX_WAVE_FREQUENCY: f64 = 1000.0;

/// Container outline variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapeType {
    #[default]
    Circle,
    Rectangle,
}

impl std::str::FromStr for ShapeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "circle" => Ok(Self::Circle),
            "rectangle" | "rect" | "square" => Ok(Self::Rectangle),
            other => Err(format!("unknown shape type {other:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Builder)]
pub struct GaugeConfig {
    /// Identifier namespacing the clip and gradient regions. Generated when absent.
    pub id: Option<String>,

    // Dimensions
    #[builder(default = 400.0)]
    pub width: f64,
    #[builder(default = 400.0)]
    pub height: f64,
    /// Fraction of the radius where the container's inner edge sits.
    #[builder(default = 0.9)]
    pub inner_radius: f64,
    #[builder(default = 1.0)]
    pub outer_radius: f64,
    /// Gap between the container and the wave, as a fraction of the radius.
    #[builder(default = 0.025)]
    pub margin: f64,
    #[builder(default)]
    pub shape_type: ShapeType,

    // Value and label
    #[builder(default = 0.0)]
    pub value: f64,
    #[builder(default = "%".to_string())]
    pub unit: String,
    /// Label height relative to half the radius.
    #[builder(default = 1.0)]
    pub text_scale: f64,
    #[builder(default = 0.0)]
    pub text_offset_x: f64,
    #[builder(default = 0.0)]
    pub text_offset_y: f64,

    // Rise animation
    #[builder(default = false)]
    pub rise_animation: bool,
    #[builder(default = Duration::from_millis(2000))]
    pub rise_animation_time: Duration,
    #[builder(default = "cubicInOut".to_string())]
    pub rise_animation_easing: String,

    // Wave animation
    #[builder(default = false)]
    pub wave_animation: bool,
    /// Time for one full wave width to scroll past.
    #[builder(default = Duration::from_millis(2000))]
    pub wave_animation_time: Duration,
    #[builder(default = "linear".to_string())]
    pub wave_animation_easing: String,
    /// Wave height, in value units, at a 50% fill.
    #[builder(default = 1.0)]
    pub wave_amplitude: f64,
    /// Full waves per width of the fill area.
    #[builder(default = 2.0)]
    pub wave_frequency: f64,

    // Colors
    #[builder(default = false)]
    pub gradient: bool,
    #[builder(default)]
    pub gradient_stops: StopSpec,
    #[builder(default = DEFAULT_FILL_COLOR.to_string())]
    pub shape_color: String,
    #[builder(default = DEFAULT_FILL_COLOR.to_string())]
    pub wave_color: String,
    #[builder(default = DEFAULT_TEXT_COLOR.to_string())]
    pub text_color: String,
    #[builder(default = DEFAULT_WAVE_TEXT_COLOR.to_string())]
    pub wave_text_color: String,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GaugeConfig {
    /// Radius of the whole gauge: half of the smaller dimension.
    pub fn radius(&self) -> f64 {
        (self.width.min(self.height) / 2.0).max(0.0)
    }

    /// Radius of the wave fill area inside the margin.
    pub fn fill_radius(&self) -> f64 {
        self.radius() * (self.inner_radius - self.margin).max(0.0)
    }

    /// Whether a change from `self` to `other` invalidates scales, samples or outlines.
    pub fn geometry_differs(&self, other: &Self) -> bool {
        self.width != other.width
            || self.height != other.height
            || self.inner_radius != other.inner_radius
            || self.outer_radius != other.outer_radius
            || self.margin != other.margin
            || self.wave_amplitude != other.wave_amplitude
            || self.wave_frequency != other.wave_frequency
            || self.shape_type != other.shape_type
    }

    /// Returns a copy with out-of-range fields pulled back into range.
    ///
    /// Geometry that cannot be drawn collapses to zero area instead of failing.
    pub fn sanitized(&self) -> Self {
        let mut config = self.clone();

        config.width = non_negative("width", config.width);
        config.height = non_negative("height", config.height);
        config.outer_radius = non_negative("outer_radius", config.outer_radius);
        config.inner_radius = non_negative("inner_radius", config.inner_radius);
        if config.inner_radius > config.outer_radius {
            log::warn!(
                "inner_radius {} exceeds outer_radius {}, clamping",
                config.inner_radius,
                config.outer_radius
            );
            config.inner_radius = config.outer_radius;
        }
        config.margin = non_negative("margin", config.margin);
        config.wave_amplitude = non_negative("wave_amplitude", config.wave_amplitude);
        config.wave_frequency = non_negative("wave_frequency", config.wave_frequency);
        if config.wave_frequency > MAX_WAVE_FREQUENCY {
            log::warn!(
                "wave_frequency {} exceeds {MAX_WAVE_FREQUENCY}, clamping",
                config.wave_frequency
            );
            config.wave_frequency = MAX_WAVE_FREQUENCY;
        }
        config.value = clamp_value(config.value);
        if !config.text_scale.is_finite() {
            config.text_scale = 1.0;
        }
        config
    }
}

/// Clamps a value into the gauge range; NaN reads as empty.
pub fn clamp_value(value: f64) -> f64 {
    if value.is_nan() {
        log::warn!("value is NaN, using {MIN_VALUE}");
        return MIN_VALUE;
    }
    value.clamp(MIN_VALUE, MAX_VALUE)
}

fn non_negative(field: &str, value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        log::warn!("{field} = {value} is not a non-negative number, using 0");
        0.0
    }
}
