use crate::error::AlignmentError;
use crate::model::evidence::EvidenceMatrix;
use crate::model::featurizer::FrameSequence;
use crate::types::{AlignmentPath, PhonemeSequence};

pub trait PhonemeTokenizer: Send + Sync {
    fn tokenize(&self, phonemes: &str) -> Result<PhonemeSequence, AlignmentError>;
}

/// Model that turns frames into per-frame evidence.
///
/// Implementations own the loaded model. After [`TransitionScorer::release`]
/// every call to [`TransitionScorer::score`] fails with
/// [`AlignmentError::UsedAfterRelease`]; releasing twice is a no-op.
pub trait TransitionScorer: Send + Sync {
    fn score(&self, frames: &FrameSequence) -> Result<EvidenceMatrix, AlignmentError>;

    fn release(&self);

    fn is_released(&self) -> bool;

    fn label(&self) -> String {
        "custom".to_string()
    }
}

pub trait SequenceDecoder: Send + Sync {
    fn decode(
        &self,
        evidence: &EvidenceMatrix,
        sequence: &PhonemeSequence,
        min_aligned_timeframe: usize,
    ) -> Result<AlignmentPath, AlignmentError>;
}
