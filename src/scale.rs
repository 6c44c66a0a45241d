/// Piecewise linear mapping from a domain to a range.
///
/// Values outside the domain extrapolate along the first or last segment.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearScale {
    domain: Vec<f64>,
    range: Vec<f64>,
}

impl LinearScale {
    /// Builds a scale from matching breakpoints. Extra points on the longer side
    /// are ignored, and fewer than two points yield a constant scale.
    pub fn new(domain: &[f64], range: &[f64]) -> Self {
        let n = domain.len().min(range.len());
        Self {
            domain: domain[..n].to_vec(),
            range: range[..n].to_vec(),
        }
    }

    pub fn apply(&self, x: f64) -> f64 {
        match self.domain.len() {
            0 => 0.0,
            1 => self.range[0],
            n => {
                // Segment index, clamped so the outer segments extrapolate.
                let upper = self.domain[1..n - 1].partition_point(|&d| d <= x) + 1;
                let i = upper - 1;
                let (d0, d1) = (self.domain[i], self.domain[i + 1]);
                let (r0, r1) = (self.range[i], self.range[i + 1]);
                if d1 == d0 {
                    return r0;
                }
                let t = (x - d0) / (d1 - d0);
                r0 + (r1 - r0) * t
            }
        }
    }
}

/// The coordinate scales shared by the wave generator and both animations.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeScales {
    /// Value (0..100) to wave amplitude, peaking at 50.
    pub wave_height: LinearScale,
    /// Wave phase (0..1) to horizontal position.
    pub horizontal: LinearScale,
    /// Value (0..100) to vertical position, inverted so larger values sit higher.
    pub vertical: LinearScale,
    /// Scroll fraction (0..1) to wave translation.
    pub scroll: LinearScale,
}

impl GaugeScales {
    pub fn new(width: f64, height: f64, inner_radius: f64, margin: f64, wave_amplitude: f64) -> Self {
        let span = (inner_radius - margin).max(0.0);
        let fill_width = width.max(0.0) * span;
        let fill_height = height.max(0.0) * span;

        Self {
            wave_height: LinearScale::new(&[0.0, 50.0, 100.0], &[0.0, wave_amplitude, 0.0]),
            horizontal: LinearScale::new(&[0.0, 1.0], &[-fill_width, fill_width]),
            vertical: LinearScale::new(&[0.0, 100.0], &[fill_height / 2.0, -fill_height / 2.0]),
            scroll: LinearScale::new(&[0.0, 1.0], &[-fill_width / 2.0, fill_width / 2.0]),
        }
    }
}

/// Maps elapsed time onto animation progress, clamped to [0, 1].
pub fn time_progress(elapsed_ms: f64, duration_ms: f64) -> f64 {
    if duration_ms <= 0.0 {
        return 1.0;
    }
    (elapsed_ms / duration_ms).clamp(0.0, 1.0)
}

pub fn lerp(start: f64, end: f64, t: f64) -> f64 {
    start + (end - start) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wave_height_peaks_at_midpoint() {
        let scales = GaugeScales::new(400.0, 400.0, 0.9, 0.025, 3.0);
        assert_eq!(scales.wave_height.apply(0.0), 0.0);
        assert_eq!(scales.wave_height.apply(100.0), 0.0);
        assert_eq!(scales.wave_height.apply(50.0), 3.0);
        assert_eq!(scales.wave_height.apply(25.0), 1.5);
        for v in 0..=100 {
            assert!(scales.wave_height.apply(f64::from(v)) >= 0.0);
        }
    }

    #[test]
    fn test_scales_extrapolate_outside_domain() {
        let scale = LinearScale::new(&[0.0, 1.0], &[-10.0, 10.0]);
        assert_eq!(scale.apply(2.0), 30.0);
        assert_eq!(scale.apply(-1.0), -30.0);

        let piecewise = LinearScale::new(&[0.0, 50.0, 100.0], &[0.0, 1.0, 0.0]);
        assert_eq!(piecewise.apply(150.0), -1.0);
        assert_eq!(piecewise.apply(-50.0), -1.0);
    }

    #[test]
    fn test_vertical_scale_is_inverted() {
        let scales = GaugeScales::new(400.0, 200.0, 0.9, 0.1, 1.0);
        // fill height = 200 * 0.8 = 160
        assert_eq!(scales.vertical.apply(0.0), 80.0);
        assert_eq!(scales.vertical.apply(100.0), -80.0);
        assert_eq!(scales.vertical.apply(50.0), 0.0);
        assert_eq!(scales.horizontal.apply(0.0), -320.0);
        assert_eq!(scales.horizontal.apply(1.0), 320.0);
        assert_eq!(scales.scroll.apply(1.0), 160.0);
    }

    #[test]
    fn test_degenerate_margin_collapses_to_zero() {
        let scales = GaugeScales::new(400.0, 400.0, 0.1, 0.5, 1.0);
        assert_eq!(scales.horizontal.apply(1.0), 0.0);
        assert_eq!(scales.vertical.apply(100.0), 0.0);
    }

    #[test]
    fn test_time_progress_clamps() {
        assert_eq!(time_progress(-5.0, 1000.0), 0.0);
        assert_eq!(time_progress(500.0, 1000.0), 0.5);
        assert_eq!(time_progress(5000.0, 1000.0), 1.0);
        assert_eq!(time_progress(0.0, 0.0), 1.0);
    }
}
