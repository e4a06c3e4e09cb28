use crate::alignment::tokenization::build_phoneme_sequence;
use crate::alignment::viterbi::decode_min_duration;
use crate::error::AlignmentError;
use crate::model::evidence::EvidenceMatrix;
use crate::model::vocab::TransitionVocab;
use crate::pipeline::traits::{PhonemeTokenizer, SequenceDecoder};
use crate::types::{AlignmentPath, PhonemeSequence};

pub struct TransitionTokenizer {
    vocab: TransitionVocab,
    normalize: bool,
}

impl TransitionTokenizer {
    pub fn new(vocab: TransitionVocab, normalize: bool) -> Self {
        Self { vocab, normalize }
    }
}

impl PhonemeTokenizer for TransitionTokenizer {
    fn tokenize(&self, phonemes: &str) -> Result<PhonemeSequence, AlignmentError> {
        build_phoneme_sequence(phonemes, &self.vocab, self.normalize)
    }
}

pub struct ViterbiSequenceDecoder;

impl SequenceDecoder for ViterbiSequenceDecoder {
    fn decode(
        &self,
        evidence: &EvidenceMatrix,
        sequence: &PhonemeSequence,
        min_aligned_timeframe: usize,
    ) -> Result<AlignmentPath, AlignmentError> {
        decode_min_duration(evidence, sequence, min_aligned_timeframe)
    }
}
