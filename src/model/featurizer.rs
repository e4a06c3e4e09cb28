use crate::config::SAMPLES_PER_FRAME;
use crate::error::AlignmentError;
use crate::types::Waveform;

/// Waveform cut into 10 ms frames. The trailing partial frame is zero-padded,
/// so `samples().len() == num_frames() * SAMPLES_PER_FRAME`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSequence {
    samples: Vec<f32>,
    num_frames: usize,
}

impl FrameSequence {
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    pub fn frame(&self, index: usize) -> &[f32] {
        let start = index * SAMPLES_PER_FRAME;
        &self.samples[start..start + SAMPLES_PER_FRAME]
    }

    /// Contiguous padded samples, the layout the model input expects.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

#[derive(Debug, Clone)]
pub struct FrameFeaturizer {
    sample_rate_hz: u32,
}

impl FrameFeaturizer {
    pub fn new(sample_rate_hz: u32) -> Self {
        Self { sample_rate_hz }
    }

    pub fn featurize(&self, waveform: &Waveform<'_>) -> Result<FrameSequence, AlignmentError> {
        if waveform.sample_rate_hz != self.sample_rate_hz {
            return Err(AlignmentError::invalid_input(format!(
                "waveform sample rate must be {} Hz, got {} Hz",
                self.sample_rate_hz, waveform.sample_rate_hz
            )));
        }
        if waveform.samples.is_empty() {
            return Err(AlignmentError::invalid_input("waveform is empty"));
        }
        if let Some(pos) = waveform.samples.iter().position(|x| !x.is_finite()) {
            return Err(AlignmentError::invalid_input(format!(
                "waveform sample {pos} is not finite"
            )));
        }

        let num_frames = waveform.samples.len().div_ceil(SAMPLES_PER_FRAME);
        let mut samples = Vec::with_capacity(num_frames * SAMPLES_PER_FRAME);
        samples.extend_from_slice(waveform.samples);
        samples.resize(num_frames * SAMPLES_PER_FRAME, 0.0);

        Ok(FrameSequence {
            samples,
            num_frames,
        })
    }
}
