use crate::error::AlignmentError;

/// Per-frame model output: `T x V` transition log-probs and `T` blank log-probs.
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceMatrix {
    num_frames: usize,
    vocab_size: usize,
    transition_logprobs: Vec<f32>,
    blank_logprobs: Vec<f32>,
}

/// Borrowed view of one evidence row.
#[derive(Debug, Clone, Copy)]
pub struct FrameEvidence<'a> {
    pub transition_logprobs: &'a [f32],
    pub blank_logprob: f32,
}

impl EvidenceMatrix {
    pub fn new(
        num_frames: usize,
        vocab_size: usize,
        transition_logprobs: Vec<f32>,
        blank_logprobs: Vec<f32>,
    ) -> Result<Self, AlignmentError> {
        if num_frames == 0 || vocab_size == 0 {
            return Err(AlignmentError::inference(
                "evidence shape",
                format!("empty evidence: {num_frames} frames x {vocab_size} transitions"),
            ));
        }
        let expected = num_frames.checked_mul(vocab_size).ok_or_else(|| {
            AlignmentError::inference("evidence shape", "transition matrix is too large")
        })?;
        if transition_logprobs.len() != expected {
            return Err(AlignmentError::inference(
                "evidence shape",
                format!(
                    "transition shape/data mismatch: shape implies {expected} values, got {}",
                    transition_logprobs.len()
                ),
            ));
        }
        if blank_logprobs.len() != num_frames {
            return Err(AlignmentError::inference(
                "evidence shape",
                format!(
                    "blank length {} does not match {num_frames} frames",
                    blank_logprobs.len()
                ),
            ));
        }
        if transition_logprobs
            .iter()
            .chain(blank_logprobs.iter())
            .any(|x| x.is_nan())
        {
            return Err(AlignmentError::inference("evidence values", "model emitted NaN"));
        }
        Ok(Self {
            num_frames,
            vocab_size,
            transition_logprobs,
            blank_logprobs,
        })
    }

    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    pub fn frame(&self, f: usize) -> FrameEvidence<'_> {
        let start = f * self.vocab_size;
        FrameEvidence {
            transition_logprobs: &self.transition_logprobs[start..start + self.vocab_size],
            blank_logprob: self.blank_logprobs[f],
        }
    }

    #[inline]
    pub fn transition(&self, f: usize, token_id: usize) -> f32 {
        self.transition_logprobs[f * self.vocab_size + token_id]
    }

    #[inline]
    pub fn blank(&self, f: usize) -> f32 {
        self.blank_logprobs[f]
    }

    /// Drops trailing rows beyond `num_frames`.
    pub fn truncate(&mut self, num_frames: usize) {
        if num_frames < self.num_frames && num_frames > 0 {
            self.num_frames = num_frames;
            self.transition_logprobs.truncate(num_frames * self.vocab_size);
            self.blank_logprobs.truncate(num_frames);
        }
    }
}
