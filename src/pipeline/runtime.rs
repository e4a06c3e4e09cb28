use crate::config::{AlignerConfig, FRAME_STRIDE_SECONDS};
use crate::error::AlignmentError;
use crate::model::featurizer::FrameFeaturizer;
use crate::pipeline::builder::AlignerBuilder;
use crate::pipeline::traits::{PhonemeTokenizer, SequenceDecoder, TransitionScorer};
use crate::types::{AlignmentPath, PhonemeAlignment, Waveform};

/// Forced phoneme aligner.
///
/// Owns the loaded model for its whole lifetime. The model is released by
/// [`Aligner::release`] or, failing that, when the aligner is dropped.
/// Calls on one aligner share the model; the ONNX scorer runs one inference
/// at a time.
pub struct Aligner {
    featurizer: FrameFeaturizer,
    scorer: Box<dyn TransitionScorer>,
    tokenizer: Box<dyn PhonemeTokenizer>,
    decoder: Box<dyn SequenceDecoder>,
}

pub(crate) struct AlignerParts {
    pub featurizer: FrameFeaturizer,
    pub scorer: Box<dyn TransitionScorer>,
    pub tokenizer: Box<dyn PhonemeTokenizer>,
    pub decoder: Box<dyn SequenceDecoder>,
}

impl Aligner {
    /// Loads the model at `model_path` with the vocabulary next to it.
    pub fn new(model_path: impl Into<String>) -> Result<Self, AlignmentError> {
        AlignerBuilder::new(AlignerConfig::new(model_path)).build()
    }

    pub(crate) fn from_parts(parts: AlignerParts) -> Self {
        Self {
            featurizer: parts.featurizer,
            scorer: parts.scorer,
            tokenizer: parts.tokenizer,
            decoder: parts.decoder,
        }
    }

    /// Aligns `phonemes` (space separated) against `waveform` and returns one
    /// record per normalized phoneme, in seconds.
    pub fn align(
        &self,
        waveform: &Waveform<'_>,
        phonemes: &str,
        min_aligned_timeframe: i64,
    ) -> Result<Vec<PhonemeAlignment>, AlignmentError> {
        let path = self.align_frames(waveform, phonemes, min_aligned_timeframe)?;
        Ok(path_to_seconds(&path))
    }

    /// Same as [`Aligner::align`] but keeps frame indices.
    pub fn align_frames(
        &self,
        waveform: &Waveform<'_>,
        phonemes: &str,
        min_aligned_timeframe: i64,
    ) -> Result<AlignmentPath, AlignmentError> {
        if self.scorer.is_released() {
            return Err(AlignmentError::UsedAfterRelease);
        }
        let min_aligned_timeframe = usize::try_from(min_aligned_timeframe)
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| {
                AlignmentError::invalid_input(format!(
                    "min_aligned_timeframe must be a positive integer, got {min_aligned_timeframe}"
                ))
            })?;

        let sequence = self.tokenizer.tokenize(phonemes)?;
        let frames = self.featurizer.featurize(waveform)?;
        let mut evidence = self.scorer.score(&frames)?;

        if evidence.num_frames() != frames.num_frames() {
            tracing::debug!(
                model_frames = evidence.num_frames(),
                audio_frames = frames.num_frames(),
                "model frame count differs from audio frame count"
            );
            evidence.truncate(frames.num_frames());
        }

        tracing::debug!(
            frames = evidence.num_frames(),
            phonemes = sequence.len(),
            min_aligned_timeframe,
            "decoding alignment"
        );
        self.decoder
            .decode(&evidence, &sequence, min_aligned_timeframe)
    }

    /// Frees the model. Later calls to `align` fail with
    /// [`AlignmentError::UsedAfterRelease`]; releasing again does nothing.
    pub fn release(&self) {
        self.scorer.release();
    }

    pub fn is_released(&self) -> bool {
        self.scorer.is_released()
    }

    pub fn scorer_label(&self) -> String {
        self.scorer.label()
    }
}

impl Drop for Aligner {
    fn drop(&mut self) {
        self.scorer.release();
    }
}

pub fn frame_to_seconds(frame: usize) -> f64 {
    frame as f64 * FRAME_STRIDE_SECONDS
}

pub fn path_to_seconds(path: &AlignmentPath) -> Vec<PhonemeAlignment> {
    path.segments
        .iter()
        .map(|segment| PhonemeAlignment {
            start_seconds: frame_to_seconds(segment.start_frame),
            end_seconds: frame_to_seconds(segment.end_frame),
            phoneme: segment.phoneme.clone(),
        })
        .collect()
}
