//! Peak-envelope reduction for a single sample sequence.
//!
//! Each fixed-size chunk of samples collapses into the largest absolute
//! amplitude it contains, giving one drawable column per chunk.

/// Number of chunks needed to cover `len` samples. The final chunk may be
/// shorter than `chunk_size`.
pub fn chunk_count(len: usize, chunk_size: usize) -> usize {
    len.div_ceil(chunk_size.max(1))
}

/// Reduces `samples` to one peak magnitude per chunk.
///
/// The result has `ceil(samples.len() / chunk_size)` entries and is empty for
/// empty input. A `chunk_size` of zero is treated as one.
pub fn reduce(samples: &[f32], chunk_size: usize) -> Vec<f32> {
    samples
        .chunks(chunk_size.max(1))
        .map(chunk_peak)
        .collect()
}

fn chunk_peak(chunk: &[f32]) -> f32 {
    chunk
        .iter()
        .copied()
        .map(f32::abs)
        .fold(0.0_f32, f32::max)
}
