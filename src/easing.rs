use std::f64::consts::{FRAC_PI_2, PI, TAU};

const BACK_OVERSHOOT: f64 = 1.70158;
const ELASTIC_PERIOD: f64 = 0.3;
const POLY_EXPONENT: i32 = 3;

/// Easing curves mapping linear progress in [0, 1] onto eased progress.
///
/// The catalogue and formulas follow the d3-ease family so that names such as
/// `"cubicInOut"` or `"bounce"` behave as gauge users expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    PolyIn,
    PolyOut,
    PolyInOut,
    SinIn,
    SinOut,
    SinInOut,
    ExpIn,
    ExpOut,
    ExpInOut,
    CircleIn,
    CircleOut,
    CircleInOut,
    BounceIn,
    BounceOut,
    BounceInOut,
    BackIn,
    BackOut,
    BackInOut,
    ElasticIn,
    ElasticOut,
    ElasticInOut,
}

impl Easing {
    /// Looks up an easing by its short name (`"linear"`, `"cubicInOut"`, ...).
    ///
    /// The first letter is upper-cased and `ease` prefixed, so `"quadIn"` and
    /// `"QuadIn"` are equivalent. Returns `None` for unknown names.
    pub fn from_name(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        let first = chars.next()?;
        let canonical = format!("ease{}{}", first.to_uppercase(), chars.as_str());

        let easing = match canonical.as_str() {
            "easeLinear" => Self::Linear,
            "easeQuadIn" => Self::QuadIn,
            "easeQuadOut" => Self::QuadOut,
            "easeQuad" | "easeQuadInOut" => Self::QuadInOut,
            "easeCubicIn" => Self::CubicIn,
            "easeCubicOut" => Self::CubicOut,
            "easeCubic" | "easeCubicInOut" => Self::CubicInOut,
            "easePolyIn" => Self::PolyIn,
            "easePolyOut" => Self::PolyOut,
            "easePoly" | "easePolyInOut" => Self::PolyInOut,
            "easeSinIn" => Self::SinIn,
            "easeSinOut" => Self::SinOut,
            "easeSin" | "easeSinInOut" => Self::SinInOut,
            "easeExpIn" => Self::ExpIn,
            "easeExpOut" => Self::ExpOut,
            "easeExp" | "easeExpInOut" => Self::ExpInOut,
            "easeCircleIn" => Self::CircleIn,
            "easeCircleOut" => Self::CircleOut,
            "easeCircle" | "easeCircleInOut" => Self::CircleInOut,
            "easeBounceIn" => Self::BounceIn,
            "easeBounce" | "easeBounceOut" => Self::BounceOut,
            "easeBounceInOut" => Self::BounceInOut,
            "easeBackIn" => Self::BackIn,
            "easeBackOut" => Self::BackOut,
            "easeBack" | "easeBackInOut" => Self::BackInOut,
            "easeElasticIn" => Self::ElasticIn,
            "easeElastic" | "easeElasticOut" => Self::ElasticOut,
            "easeElasticInOut" => Self::ElasticInOut,
            _ => return None,
        };
        Some(easing)
    }

    /// Applies the curve to `t`. Inputs outside [0, 1] are not clamped.
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::QuadIn => t * t,
            Self::QuadOut => t * (2.0 - t),
            Self::QuadInOut => {
                let t = t * 2.0;
                if t <= 1.0 {
                    t * t / 2.0
                } else {
                    let t = t - 1.0;
                    (t * (2.0 - t) + 1.0) / 2.0
                }
            }
            Self::CubicIn => t * t * t,
            Self::CubicOut => {
                let t = t - 1.0;
                t * t * t + 1.0
            }
            Self::CubicInOut => {
                let t = t * 2.0;
                if t <= 1.0 {
                    t * t * t / 2.0
                } else {
                    let t = t - 2.0;
                    (t * t * t + 2.0) / 2.0
                }
            }
            Self::PolyIn => t.powi(POLY_EXPONENT),
            Self::PolyOut => 1.0 - (1.0 - t).powi(POLY_EXPONENT),
            Self::PolyInOut => {
                let t = t * 2.0;
                if t <= 1.0 {
                    t.powi(POLY_EXPONENT) / 2.0
                } else {
                    (2.0 - (2.0 - t).powi(POLY_EXPONENT)) / 2.0
                }
            }
            Self::SinIn => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - (t * FRAC_PI_2).cos()
                }
            }
            Self::SinOut => (t * FRAC_PI_2).sin(),
            Self::SinInOut => (1.0 - (PI * t).cos()) / 2.0,
            Self::ExpIn => tpmt(1.0 - t),
            Self::ExpOut => 1.0 - tpmt(t),
            Self::ExpInOut => {
                let t = t * 2.0;
                if t <= 1.0 {
                    tpmt(1.0 - t) / 2.0
                } else {
                    (2.0 - tpmt(t - 1.0)) / 2.0
                }
            }
            Self::CircleIn => 1.0 - (1.0 - t * t).sqrt(),
            Self::CircleOut => {
                let t = t - 1.0;
                (1.0 - t * t).sqrt()
            }
            Self::CircleInOut => {
                let t = t * 2.0;
                if t <= 1.0 {
                    (1.0 - (1.0 - t * t).sqrt()) / 2.0
                } else {
                    let t = t - 2.0;
                    ((1.0 - t * t).sqrt() + 1.0) / 2.0
                }
            }
            Self::BounceIn => 1.0 - bounce_out(1.0 - t),
            Self::BounceOut => bounce_out(t),
            Self::BounceInOut => {
                let t = t * 2.0;
                if t <= 1.0 {
                    (1.0 - bounce_out(1.0 - t)) / 2.0
                } else {
                    (bounce_out(t - 1.0) + 1.0) / 2.0
                }
            }
            Self::BackIn => t * t * (BACK_OVERSHOOT * (t - 1.0) + t),
            Self::BackOut => {
                let t = t - 1.0;
                t * t * ((t + 1.0) * BACK_OVERSHOOT + t) + 1.0
            }
            Self::BackInOut => {
                let s = BACK_OVERSHOOT;
                let t = t * 2.0;
                if t < 1.0 {
                    t * t * ((s + 1.0) * t - s) / 2.0
                } else {
                    let t = t - 2.0;
                    (t * t * ((s + 1.0) * t + s) + 2.0) / 2.0
                }
            }
            Self::ElasticIn => {
                let (s, p) = elastic_params();
                let t = t - 1.0;
                tpmt(-t) * ((s - t) / p).sin()
            }
            Self::ElasticOut => {
                let (s, p) = elastic_params();
                1.0 - tpmt(t) * ((t + s) / p).sin()
            }
            Self::ElasticInOut => {
                let (s, p) = elastic_params();
                let t = t * 2.0 - 1.0;
                if t < 0.0 {
                    tpmt(-t) * ((s - t) / p).sin() / 2.0
                } else {
                    (2.0 - tpmt(t) * ((s + t) / p).sin()) / 2.0
                }
            }
        }
    }
}

/// Resolves an easing by name, falling back silently when the name is unknown.
pub fn resolve(name: &str, fallback: Easing) -> Easing {
    Easing::from_name(name).unwrap_or_else(|| {
        log::debug!("unknown easing {name:?}, using {fallback:?}");
        fallback
    })
}

// 2^(-10t) rescaled so that tpmt(0) = 1 and tpmt(1) = 0.
fn tpmt(x: f64) -> f64 {
    (2.0_f64.powf(-10.0 * x) - 0.0009765625) * 1.0009775171065494
}

fn elastic_params() -> (f64, f64) {
    // Amplitude 1 gives asin(1) for the phase shift.
    let p = ELASTIC_PERIOD / TAU;
    (FRAC_PI_2 * p, p)
}

fn bounce_out(t: f64) -> f64 {
    const B1: f64 = 4.0 / 11.0;
    const B2: f64 = 6.0 / 11.0;
    const B3: f64 = 8.0 / 11.0;
    const B4: f64 = 3.0 / 4.0;
    const B5: f64 = 9.0 / 11.0;
    const B6: f64 = 10.0 / 11.0;
    const B7: f64 = 15.0 / 16.0;
    const B8: f64 = 21.0 / 22.0;
    const B9: f64 = 63.0 / 64.0;
    const B0: f64 = 1.0 / B1 / B1;

    if t < B1 {
        B0 * t * t
    } else if t < B3 {
        let t = t - B2;
        B0 * t * t + B4
    } else if t < B6 {
        let t = t - B5;
        B0 * t * t + B7
    } else {
        let t = t - B8;
        B0 * t * t + B9
    }
}
