/// Interleave two channels into `output` as `L R L R ...`, replacing its contents.
pub fn interleave_stereo(left: &[f32], right: &[f32], output: &mut Vec<f32>) {
    debug_assert_eq!(left.len(), right.len());
    output.clear();
    output.reserve(left.len() * 2);
    for (&l, &r) in left.iter().zip(right) {
        output.push(l);
        output.push(r);
    }
}

/// Split an interleaved stereo buffer back into its channels.
pub fn deinterleave_stereo(interleaved: &[f32]) -> (Vec<f32>, Vec<f32>) {
    interleaved
        .chunks_exact(2)
        .map(|frame| (frame[0], frame[1]))
        .unzip()
}

pub fn peak(buffer: &[f32]) -> f32 {
    buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}

pub fn rms(buffer: &[f32]) -> f32 {
    if buffer.is_empty() {
        return 0.0;
    }
    let sum: f64 = buffer.iter().map(|&x| (x as f64) * (x as f64)).sum();
    (sum / buffer.len() as f64).sqrt() as f32
}
