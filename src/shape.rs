use std::f64::consts::{FRAC_PI_2, TAU};

use crate::config::{GaugeConfig, ShapeType};
use crate::path::{FillRule, Path, Point};

/// The shape painted with the wave color, clipped by the wave path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillShape {
    Circle { radius: f64 },
    /// Square centred at the origin, also used for rectangular gauges.
    Square { half_side: f64 },
}

/// Invisible full-size region that receives clicks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitRegion {
    Circle { radius: f64 },
    Square { half_side: f64 },
}

impl HitRegion {
    /// Whether a point relative to the gauge centre falls inside the region.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        match *self {
            Self::Circle { radius } => x * x + y * y <= radius * radius,
            Self::Square { half_side } => x.abs() <= half_side && y.abs() <= half_side,
        }
    }
}

impl FillShape {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        match *self {
            Self::Circle { radius } => x * x + y * y <= radius * radius,
            Self::Square { half_side } => x.abs() <= half_side && y.abs() <= half_side,
        }
    }

    /// Axis-aligned bounds as (min, max) along either axis.
    pub fn extent(&self) -> (f64, f64) {
        match *self {
            Self::Circle { radius } => (-radius, radius),
            Self::Square { half_side } => (-half_side, half_side),
        }
    }
}

/// Static outline and regions for one container shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub outline: Path,
    pub fill: FillShape,
    pub hit_region: HitRegion,
}

impl Container {
    pub fn build(config: &GaugeConfig) -> Self {
        let radius = config.radius();
        let fill_radius = config.fill_radius();
        let outer = (config.outer_radius * radius).max(0.0);
        let inner = (config.inner_radius * radius).clamp(0.0, outer);

        match config.shape_type {
            ShapeType::Circle => Self {
                outline: ring_path(outer, inner),
                fill: FillShape::Circle { radius: fill_radius },
                hit_region: HitRegion::Circle { radius },
            },
            ShapeType::Rectangle => Self {
                outline: frame_path(outer, inner),
                fill: FillShape::Square {
                    half_side: fill_radius,
                },
                hit_region: HitRegion::Square { half_side: radius },
            },
        }
    }
}

/// Annulus between `outer` and `inner`, each swept a full turn from 12 o'clock.
///
/// The outer circle runs clockwise and the inner one counter-clockwise.
pub fn ring_path(outer: f64, inner: f64) -> Path {
    let mut path = Path::new().with_fill_rule(FillRule::EvenOdd);
    if outer <= 0.0 {
        return path;
    }
    let center = Point::new(0.0, 0.0);
    let top = -FRAC_PI_2;

    path.move_to(0.0, -outer);
    path.arc(center, outer, top, top + TAU / 2.0);
    path.arc(center, outer, top + TAU / 2.0, top + TAU);
    if inner > 0.0 {
        path.move_to(0.0, -inner);
        path.arc(center, inner, top, top - TAU / 2.0);
        path.arc(center, inner, top - TAU / 2.0, top - TAU);
    }
    path.close();
    path
}

/// Two nested squares of half-side `outer` and `inner`; the inner one is a hole.
pub fn frame_path(outer: f64, inner: f64) -> Path {
    let mut path = Path::new().with_fill_rule(FillRule::EvenOdd);
    if outer <= 0.0 {
        return path;
    }

    // Outer clockwise.
    path.move_to(-outer, -outer);
    path.line_to(outer, -outer);
    path.line_to(outer, outer);
    path.line_to(-outer, outer);
    path.close();

    if inner > 0.0 {
        // Inner counter-clockwise.
        path.move_to(-inner, -inner);
        path.line_to(-inner, inner);
        path.line_to(inner, inner);
        path.line_to(inner, -inner);
        path.close();
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn config(shape_type: ShapeType) -> GaugeConfig {
        GaugeConfig::builder()
            .width(400.0)
            .height(400.0)
            .inner_radius(0.9)
            .outer_radius(1.0)
            .shape_type(shape_type)
            .build()
    }

    #[test]
    fn test_ring_area_matches_annulus() {
        let container = Container::build(&config(ShapeType::Circle));
        let expected = PI * (200.0_f64.powi(2) - 180.0_f64.powi(2));
        let area = container.outline.area(0.05);
        assert!((area - expected).abs() / expected < 1e-4, "{area} vs {expected}");
        assert_eq!(container.outline.fill_rule(), FillRule::EvenOdd);
    }

    #[test]
    fn test_frame_area_matches_square_frame() {
        let container = Container::build(&config(ShapeType::Rectangle));
        let expected = 400.0_f64.powi(2) - 360.0_f64.powi(2);
        assert!((container.outline.area(1.0) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_rectangle_fill_is_square() {
        let wide = GaugeConfig::builder()
            .width(600.0)
            .height(400.0)
            .shape_type(ShapeType::Rectangle)
            .build();
        let container = Container::build(&wide);
        assert_eq!(container.fill, FillShape::Square { half_side: wide.fill_radius() });
        assert_eq!(container.hit_region, HitRegion::Square { half_side: 200.0 });
    }

    #[test]
    fn test_hit_region_spans_full_radius() {
        let container = Container::build(&config(ShapeType::Circle));
        assert!(container.hit_region.contains(0.0, -199.0));
        assert!(!container.hit_region.contains(150.0, 150.0));
        assert!(container.fill.contains(0.0, 0.0));
    }

    #[test]
    fn test_zero_size_gives_empty_outline() {
        let empty = GaugeConfig::builder().width(0.0).build();
        assert!(Container::build(&empty).outline.is_empty());
    }
}
