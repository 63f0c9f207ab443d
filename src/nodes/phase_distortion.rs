// phase_distortion.rs
//
// Phase distortion warps the linear oscillator phase before the sine lookup.
// Every shape maps [0, 1) onto [0, 1] monotonically (modulo one wrap for
// Square) and reduces to the identity when the distort amount is zero.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum PdMode {
    #[default]
    Pulsar = 0,
    Saw = 1,
    Square = 2,
    SinePwm = 3,
}

impl PdMode {
    /// Decode the mode slot of a control payload. Unknown values fall back to Pulsar.
    pub fn from_payload(value: f32) -> Self {
        match value as i32 {
            1 => PdMode::Saw,
            2 => PdMode::Square,
            3 => PdMode::SinePwm,
            _ => PdMode::Pulsar,
        }
    }

    pub fn as_payload(self) -> f32 {
        self as u8 as f32
    }
}

/// Per-block constants derived from (mode, distort). Both oscillator
/// backends evaluate the same constants, so their per-sample math agrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PdShape {
    Pulsar {
        gain: f32,
    },
    Saw {
        knee: f32,
        upper_knee: f32,
        edge_slope: f32,
        mid_slope: f32,
    },
    Square {
        half_plateau: f32,
        rise_end: f32,
        plateau_end: f32,
        fall_end: f32,
        slope: f32,
    },
    SinePwm {
        mid: f32,
        rise_slope: f32,
        fall_slope: f32,
    },
}

// Knees never fully collapse so every slope stays finite.
const SAW_KNEE_RANGE: f32 = 0.99;
const SQUARE_MAX_PLATEAU: f32 = 0.9;
const PWM_MAX_SHIFT: f32 = 0.45;

impl PdShape {
    pub fn new(mode: PdMode, distort: f32) -> Self {
        let distort = if distort.is_nan() {
            0.0
        } else {
            distort.clamp(0.0, 1.0)
        };

        match mode {
            PdMode::Pulsar => PdShape::Pulsar {
                gain: 1.0 + 6.0 * distort * distort,
            },
            PdMode::Saw => {
                let knee = 0.25 * (1.0 - SAW_KNEE_RANGE * distort);
                PdShape::Saw {
                    knee,
                    upper_knee: 1.0 - knee,
                    edge_slope: 0.25 / knee,
                    mid_slope: 0.5 / (1.0 - 2.0 * knee),
                }
            }
            PdMode::Square => {
                // Total plateau time is split evenly between the peak and the trough.
                let plateau = SQUARE_MAX_PLATEAU * distort;
                let half_plateau = 0.25 * plateau;
                PdShape::Square {
                    half_plateau,
                    rise_end: 0.5 - half_plateau,
                    plateau_end: 0.5 + half_plateau,
                    fall_end: 1.0 - half_plateau,
                    slope: 0.5 / (0.5 - 2.0 * half_plateau),
                }
            }
            PdMode::SinePwm => {
                let mid = 0.5 + PWM_MAX_SHIFT * distort;
                PdShape::SinePwm {
                    mid,
                    rise_slope: 0.5 / mid,
                    fall_slope: 0.5 / (1.0 - mid),
                }
            }
        }
    }

    #[inline(always)]
    pub fn apply(&self, phase: f32) -> f32 {
        match *self {
            PdShape::Pulsar { gain } => (phase * gain).min(1.0),
            PdShape::Saw {
                knee,
                upper_knee,
                edge_slope,
                mid_slope,
            } => {
                if phase < knee {
                    phase * edge_slope
                } else if phase < upper_knee {
                    0.25 + (phase - knee) * mid_slope
                } else {
                    0.75 + (phase - upper_knee) * edge_slope
                }
            }
            PdShape::Square {
                half_plateau,
                rise_end,
                plateau_end,
                fall_end,
                slope,
            } => {
                // Work on the cosine phase so the plateaus sit on the peaks.
                let shifted = phase + 0.75;
                let cosine_phase = shifted - shifted.floor();
                let warped = if cosine_phase < half_plateau {
                    0.0
                } else if cosine_phase < rise_end {
                    (cosine_phase - half_plateau) * slope
                } else if cosine_phase < plateau_end {
                    0.5
                } else if cosine_phase < fall_end {
                    0.5 + (cosine_phase - plateau_end) * slope
                } else {
                    1.0
                };
                let unshifted = warped + 0.25;
                unshifted - unshifted.floor()
            }
            PdShape::SinePwm {
                mid,
                rise_slope,
                fall_slope,
            } => {
                if phase < mid {
                    phase * rise_slope
                } else {
                    0.5 + (phase - mid) * fall_slope
                }
            }
        }
    }
}

#[cfg(feature = "simd")]
mod vector {
    use super::PdShape;
    use std::simd::cmp::SimdPartialOrd;
    use std::simd::num::SimdFloat;
    use std::simd::{f32x8, StdFloat};

    impl PdShape {
        /// Lane-wise form of [`PdShape::apply`] with identical arithmetic.
        #[inline(always)]
        pub fn apply_simd(&self, phase: f32x8) -> f32x8 {
            let splat = f32x8::splat;
            match *self {
                PdShape::Pulsar { gain } => (phase * splat(gain)).simd_min(splat(1.0)),
                PdShape::Saw {
                    knee,
                    upper_knee,
                    edge_slope,
                    mid_slope,
                } => {
                    let rising = phase * splat(edge_slope);
                    let middle = splat(0.25) + (phase - splat(knee)) * splat(mid_slope);
                    let returning = splat(0.75) + (phase - splat(upper_knee)) * splat(edge_slope);
                    let upper = phase.simd_lt(splat(upper_knee)).select(middle, returning);
                    phase.simd_lt(splat(knee)).select(rising, upper)
                }
                PdShape::Square {
                    half_plateau,
                    rise_end,
                    plateau_end,
                    fall_end,
                    slope,
                } => {
                    let shifted = phase + splat(0.75);
                    let c = shifted - shifted.floor();
                    let rise = (c - splat(half_plateau)) * splat(slope);
                    let fall = splat(0.5) + (c - splat(plateau_end)) * splat(slope);
                    let mut warped = splat(1.0);
                    warped = c.simd_lt(splat(fall_end)).select(fall, warped);
                    warped = c.simd_lt(splat(plateau_end)).select(splat(0.5), warped);
                    warped = c.simd_lt(splat(rise_end)).select(rise, warped);
                    warped = c.simd_lt(splat(half_plateau)).select(splat(0.0), warped);
                    let unshifted = warped + splat(0.25);
                    unshifted - unshifted.floor()
                }
                PdShape::SinePwm {
                    mid,
                    rise_slope,
                    fall_slope,
                } => {
                    let rise = phase * splat(rise_slope);
                    let fall = splat(0.5) + (phase - splat(mid)) * splat(fall_slope);
                    phase.simd_lt(splat(mid)).select(rise, fall)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;
    const ALL_MODES: [PdMode; 4] = [PdMode::Pulsar, PdMode::Saw, PdMode::Square, PdMode::SinePwm];

    fn sweep() -> impl Iterator<Item = f32> {
        (0..4096).map(|i| i as f32 / 4096.0)
    }

    #[test]
    fn zero_distort_is_identity() {
        for mode in ALL_MODES {
            let shape = PdShape::new(mode, 0.0);
            for phase in sweep() {
                let warped = shape.apply(phase);
                let diff = (warped - phase).abs();
                // Square wraps through 1.0, so 0.0 and 1.0 are the same phase.
                assert!(
                    diff < EPSILON || (diff - 1.0).abs() < EPSILON,
                    "{:?} moved phase {} to {}",
                    mode,
                    phase,
                    warped
                );
            }
        }
    }

    #[test]
    fn output_stays_in_unit_range() {
        for mode in ALL_MODES {
            for distort in [0.0, 0.1, 0.5, 0.9, 1.0, 2.0, -1.0, f32::NAN] {
                let shape = PdShape::new(mode, distort);
                for phase in sweep() {
                    let warped = shape.apply(phase);
                    assert!(
                        (0.0..=1.0).contains(&warped),
                        "{:?}/{} gave {} for {}",
                        mode,
                        distort,
                        warped,
                        phase
                    );
                }
            }
        }
    }

    #[test]
    fn monotonic_shapes_never_decrease() {
        for mode in [PdMode::Pulsar, PdMode::Saw, PdMode::SinePwm] {
            for distort in [0.25, 0.75, 1.0] {
                let shape = PdShape::new(mode, distort);
                let mut previous = shape.apply(0.0);
                for phase in sweep().skip(1) {
                    let current = shape.apply(phase);
                    assert!(current >= previous - EPSILON, "{:?} at {}", mode, phase);
                    previous = current;
                }
            }
        }
    }

    #[test]
    fn pulsar_compresses_front_of_cycle() {
        let shape = PdShape::new(PdMode::Pulsar, 1.0);
        assert!((shape.apply(0.1) - 0.7).abs() < EPSILON);
        assert_eq!(shape.apply(0.5), 1.0);
    }

    #[test]
    fn saw_hits_quarter_points_at_knees() {
        let shape = PdShape::new(PdMode::Saw, 0.8);
        if let PdShape::Saw {
            knee, upper_knee, ..
        } = shape
        {
            assert!((shape.apply(knee) - 0.25).abs() < EPSILON);
            assert!((shape.apply(upper_knee) - 0.75).abs() < EPSILON);
            assert!(knee < 0.25);
        } else {
            panic!("expected saw shape");
        }
    }

    #[test]
    fn square_holds_plateau_at_peaks() {
        let shape = PdShape::new(PdMode::Square, 1.0);
        // Around the sine peak (phase 0.25) the warped phase is pinned at 0.25.
        for phase in [0.1f32, 0.2, 0.25, 0.3, 0.4] {
            assert!((shape.apply(phase) - 0.25).abs() < EPSILON, "phase {}", phase);
        }
        for phase in [0.6f32, 0.7, 0.75, 0.8, 0.9] {
            assert!((shape.apply(phase) - 0.75).abs() < EPSILON, "phase {}", phase);
        }
    }

    #[test]
    fn sine_pwm_moves_midpoint_outward() {
        let narrow = PdShape::new(PdMode::SinePwm, 0.0);
        let wide = PdShape::new(PdMode::SinePwm, 1.0);
        assert!((narrow.apply(0.5) - 0.5).abs() < EPSILON);
        assert!(wide.apply(0.5) < 0.5);
        assert!((wide.apply(0.95) - 0.5).abs() < EPSILON);
    }

    #[test]
    fn payload_mode_decoding() {
        for mode in ALL_MODES {
            assert_eq!(PdMode::from_payload(mode.as_payload()), mode);
        }
        assert_eq!(PdMode::from_payload(17.0), PdMode::Pulsar);
        assert_eq!(PdMode::from_payload(f32::NAN), PdMode::Pulsar);
    }
}
