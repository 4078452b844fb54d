//! Sample-wise difference of two recordings, reduced to per-chunk peaks.
//!
//! Besides the signed peaks, every comparison yields one [`ColorPolicy`]
//! derived from the two input lengths. When the lengths differ, that policy
//! paints every segment of the view in a single dominant colour regardless of
//! its sign, so the view doubles as a "which recording is longer" indicator.

use serde::{Deserialize, Serialize};

use crate::{config::ColorConfig, peaks::chunk_count, Color};

/// Length-derived colouring decision for a whole difference view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorPolicy {
    /// The first recording has fewer samples than the second.
    File1Shorter,
    /// The first recording has more samples than the second.
    File1Longer,
    EqualLength,
}

impl ColorPolicy {
    pub fn from_lengths(first: usize, second: usize) -> Self {
        use std::cmp::Ordering;

        match first.cmp(&second) {
            Ordering::Less => Self::File1Shorter,
            Ordering::Greater => Self::File1Longer,
            Ordering::Equal => Self::EqualLength,
        }
    }

    /// Stroke colour for a segment of the given polarity.
    ///
    /// Unequal lengths override the polarity entirely: both halves of every
    /// chunk take the dominant colour of the policy.
    pub fn segment_color(self, polarity: Polarity, colors: &ColorConfig) -> Color {
        match (self, polarity) {
            (Self::File1Shorter, _) => colors.positive,
            (Self::File1Longer, _) => colors.negative,
            (Self::EqualLength, Polarity::Positive) => colors.equal_length_positive,
            (Self::EqualLength, Polarity::Negative) => colors.equal_length_negative,
        }
    }
}

/// Which side of the centreline a difference segment extends to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

/// Per-chunk signed peaks of `first - second` plus the colour policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifferencePeaks {
    /// Largest positive difference per chunk, `>= 0`.
    pub positive: Vec<f32>,
    /// Most negative difference per chunk, `<= 0`.
    pub negative: Vec<f32>,
    pub policy: ColorPolicy,
}

impl DifferencePeaks {
    pub fn len(&self) -> usize {
        self.positive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positive.is_empty()
    }
}

/// Compares two sample sequences chunk by chunk.
///
/// The shorter sequence is zero-padded to the length of the longer one, so
/// mismatched lengths never fail. A `chunk_size` of zero is treated as one.
pub fn diff(first: &[f32], second: &[f32], chunk_size: usize) -> DifferencePeaks {
    let chunk_size = chunk_size.max(1);
    let len = first.len().max(second.len());
    let chunks = chunk_count(len, chunk_size);

    let mut positive = Vec::with_capacity(chunks);
    let mut negative = Vec::with_capacity(chunks);

    for chunk in 0..chunks {
        let start = chunk * chunk_size;
        let end = (start + chunk_size).min(len);

        let mut max_positive = 0.0_f32;
        let mut min_negative = 0.0_f32;
        for index in start..end {
            let delta = padded(first, index) - padded(second, index);
            max_positive = max_positive.max(delta);
            min_negative = min_negative.min(delta);
        }

        positive.push(max_positive);
        negative.push(min_negative);
    }

    DifferencePeaks {
        positive,
        negative,
        policy: ColorPolicy::from_lengths(first.len(), second.len()),
    }
}

fn padded(samples: &[f32], index: usize) -> f32 {
    samples.get(index).copied().unwrap_or(0.0)
}
