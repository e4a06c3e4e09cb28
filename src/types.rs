use serde::Serialize;

use crate::config::BOUNDARY_PHONEME;

/// Borrowed mono waveform handed to [`crate::Aligner::align`].
#[derive(Debug, Clone, Copy)]
pub struct Waveform<'a> {
    pub samples: &'a [f32],
    pub sample_rate_hz: u32,
}

impl<'a> Waveform<'a> {
    pub fn new(samples: &'a [f32], sample_rate_hz: u32) -> Self {
        Self {
            samples,
            sample_rate_hz,
        }
    }

    pub fn mono_16k(samples: &'a [f32]) -> Self {
        Self::new(samples, crate::config::AlignerConfig::DEFAULT_SAMPLE_RATE_HZ)
    }
}

/// Normalized phoneme list plus the transition token id of every adjacent pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhonemeSequence {
    pub phonemes: Vec<String>,
    /// `transition_ids[i]` is the vocabulary column of `phonemes[i] -> phonemes[i + 1]`.
    pub transition_ids: Vec<usize>,
}

impl PhonemeSequence {
    pub fn len(&self) -> usize {
        self.phonemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phonemes.is_empty()
    }

    /// `pau` at either end of the sequence; exempt from the minimum duration.
    pub fn is_boundary(&self, index: usize) -> bool {
        let last = self.phonemes.len().saturating_sub(1);
        (index == 0 || index == last) && self.phonemes[index] == BOUNDARY_PHONEME
    }
}

/// Frame range `[start_frame, end_frame)` assigned to one phoneme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub start_frame: usize,
    pub end_frame: usize,
    pub phoneme: String,
}

impl Segment {
    pub fn num_frames(&self) -> usize {
        self.end_frame - self.start_frame
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentPath {
    pub segments: Vec<Segment>,
    pub num_frames: usize,
    /// Sum of the per-frame evidence terms along the chosen path.
    pub log_score: f32,
}

/// One line of the label output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhonemeAlignment {
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub phoneme: String,
}
