// sine_table.rs
use once_cell::sync::Lazy;

pub const SINE_TABLE_SIZE: usize = 2048;
const TABLE_MASK: usize = SINE_TABLE_SIZE - 1;

/// One cycle of sin(2πt), t ∈ [0, 1), sampled without the endpoint.
pub static SINE_TABLE: Lazy<Box<[f32; SINE_TABLE_SIZE]>> = Lazy::new(|| {
    let mut table = Box::new([0.0f32; SINE_TABLE_SIZE]);
    for (i, value) in table.iter_mut().enumerate() {
        let t = i as f64 / SINE_TABLE_SIZE as f64;
        *value = (2.0 * std::f64::consts::PI * t).sin() as f32;
    }
    table
});

/// Build the table now instead of on the first lookup, which may be on the
/// audio thread.
pub fn prepare() {
    Lazy::force(&SINE_TABLE);
}

/// Split a phase in [0, 1] into the two neighbouring table indices and the
/// blend factor. A phase of exactly 1.0 lands on index 0.
#[inline(always)]
pub fn table_position(phase: f32) -> (usize, usize, f32) {
    let position = phase * SINE_TABLE_SIZE as f32;
    let whole = position as usize;
    let frac = position - whole as f32;
    let index = whole & TABLE_MASK;
    (index, (index + 1) & TABLE_MASK, frac)
}

/// Linear interpolation between adjacent table entries.
#[inline(always)]
pub fn lookup(phase: f32) -> f32 {
    let table = &**SINE_TABLE;
    let (index, next, frac) = table_position(phase);
    table[index] * (1.0 - frac) + table[next] * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    #[test]
    fn table_matches_sine_at_entries() {
        for i in (0..SINE_TABLE_SIZE).step_by(97) {
            let phase = i as f32 / SINE_TABLE_SIZE as f32;
            let expected = (2.0 * std::f32::consts::PI * phase).sin();
            assert!((lookup(phase) - expected).abs() < EPSILON);
        }
    }

    #[test]
    fn interpolates_between_entries() {
        for phase in [0.1234f32, 0.377, 0.5001, 0.9999] {
            let expected = (2.0 * std::f32::consts::PI * phase).sin();
            assert!(
                (lookup(phase) - expected).abs() < EPSILON,
                "phase {} gave {} expected {}",
                phase,
                lookup(phase),
                expected
            );
        }
    }

    #[test]
    fn indices_stay_inside_table() {
        for phase in [0.0f32, 0.49999, 0.9999999, 1.0] {
            let (index, next, frac) = table_position(phase);
            assert!(index < SINE_TABLE_SIZE);
            assert!(next < SINE_TABLE_SIZE);
            assert!((0.0..1.0).contains(&frac));
        }
        assert_eq!(table_position(1.0).0, 0);
        assert!(lookup(1.0).abs() < EPSILON);
    }
}
