use std::f64::consts::TAU;
use std::rc::Rc;

use crate::path::Path;
use crate::scale::GaugeScales;

/// Samples per full wave.
pub const SAMPLE_POINTS: usize = 40;

/// One sample along the wave.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavePoint {
    /// Horizontal phase across the whole fill width, in [0, 1].
    pub x: f64,
    /// Cumulative phase, in [0, wave_frequency].
    pub y: f64,
}

/// Builds the `SAMPLE_POINTS * frequency + 1` samples for a wave.
///
/// A non-positive or non-finite frequency yields no samples.
pub fn sample_points(frequency: f64) -> Rc<[WavePoint]> {
    let total = SAMPLE_POINTS as f64 * frequency;
    if !total.is_finite() || total <= 0.0 {
        return Rc::from(Vec::new());
    }
    let last = total.floor() as usize;
    (0..=last)
        .map(|i| WavePoint {
            x: i as f64 / total,
            y: i as f64 / SAMPLE_POINTS as f64,
        })
        .collect()
}

/// Height of the wave crest at a sample for fill value `value`.
pub fn wave_y(point: &WavePoint, value: f64, scales: &GaugeScales) -> f64 {
    // Two sine periods per unit of phase.
    let radians = TAU * (point.y * 2.0);
    scales
        .vertical
        .apply(scales.wave_height.apply(value) * radians.sin() + value)
}

/// Closed clip region between the wave crest and the flat `baseline`.
///
/// The crest runs left to right, then the baseline returns right to left.
pub fn clip_path(samples: &[WavePoint], value: f64, scales: &GaugeScales, baseline: f64) -> Path {
    let mut path = Path::new();
    let Some(first) = samples.first() else {
        return path;
    };

    path.move_to(scales.horizontal.apply(first.x), wave_y(first, value, scales));
    for point in &samples[1..] {
        path.line_to(scales.horizontal.apply(point.x), wave_y(point, value, scales));
    }
    for point in samples.iter().rev() {
        path.line_to(scales.horizontal.apply(point.x), baseline);
    }
    path.close();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sample_count_scales_with_frequency() {
        assert_eq!(sample_points(2.0).len(), 81);
        assert_eq!(sample_points(3.0).len(), 121);
        assert_eq!(sample_points(1.5).len(), 61);
        assert!(sample_points(0.0).is_empty());
        assert!(sample_points(-1.0).is_empty());
    }

    #[test]
    fn test_samples_span_phase_domain() {
        let samples = sample_points(2.0);
        assert_eq!(samples[0], WavePoint { x: 0.0, y: 0.0 });
        assert_eq!(samples[80], WavePoint { x: 1.0, y: 2.0 });
        assert_eq!(samples[40].x, 0.5);
    }

    #[test]
    fn test_flat_wave_when_empty_or_full() {
        let scales = GaugeScales::new(400.0, 400.0, 0.9, 0.025, 4.0);
        let samples = sample_points(2.0);
        for value in [0.0, 100.0] {
            let level = scales.vertical.apply(value);
            assert!(samples.iter().all(|p| (wave_y(p, value, &scales) - level).abs() < 1e-9));
        }
    }

    #[test]
    fn test_clip_path_is_deterministic() {
        let scales = GaugeScales::new(400.0, 300.0, 0.9, 0.025, 1.0);
        let samples = sample_points(3.0);
        let a = clip_path(&samples, 42.5, &scales, 150.0);
        let b = clip_path(&samples, 42.5, &scales, 150.0);
        assert_eq!(a, b);
        assert_eq!(a.to_svg(), b.to_svg());
        // move + 120 crest lines + 121 baseline lines + close
        assert_eq!(a.commands().len(), 1 + 120 + 121 + 1);
    }

    #[test]
    fn test_empty_samples_give_empty_path() {
        let scales = GaugeScales::new(400.0, 400.0, 0.9, 0.025, 1.0);
        assert!(clip_path(&[], 50.0, &scales, 200.0).is_empty());
    }
}
