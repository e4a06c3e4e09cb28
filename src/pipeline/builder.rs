use crate::config::AlignerConfig;
use crate::error::AlignmentError;
use crate::model::featurizer::FrameFeaturizer;
use crate::model::vocab::TransitionVocab;
use crate::pipeline::defaults::{TransitionTokenizer, ViterbiSequenceDecoder};
use crate::pipeline::model_runtime::load_onnx_scorer;
use crate::pipeline::runtime::{Aligner, AlignerParts};
use crate::pipeline::traits::{PhonemeTokenizer, SequenceDecoder, TransitionScorer};

pub struct AlignerBuilder {
    config: AlignerConfig,
    scorer: Option<Box<dyn TransitionScorer>>,
    vocab: Option<TransitionVocab>,
    tokenizer: Option<Box<dyn PhonemeTokenizer>>,
    decoder: Option<Box<dyn SequenceDecoder>>,
}

impl AlignerBuilder {
    pub fn new(config: AlignerConfig) -> Self {
        Self {
            config,
            scorer: None,
            vocab: None,
            tokenizer: None,
            decoder: None,
        }
    }

    pub fn with_scorer(mut self, scorer: Box<dyn TransitionScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn with_vocab(mut self, vocab: TransitionVocab) -> Self {
        self.vocab = Some(vocab);
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: Box<dyn PhonemeTokenizer>) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    pub fn with_decoder(mut self, decoder: Box<dyn SequenceDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Loads the model first; if anything after it fails the scorer is
    /// dropped, which releases it.
    pub fn build(self) -> Result<Aligner, AlignmentError> {
        let expected_sample_rate_hz = if self.config.expected_sample_rate_hz == 0 {
            AlignerConfig::DEFAULT_SAMPLE_RATE_HZ
        } else {
            self.config.expected_sample_rate_hz
        };

        let scorer = match self.scorer {
            Some(scorer) => scorer,
            None => load_onnx_scorer(&self.config.model_path)?,
        };

        let tokenizer = match self.tokenizer {
            Some(tokenizer) => tokenizer,
            None => {
                let vocab = match self.vocab {
                    Some(vocab) => vocab,
                    None => TransitionVocab::load(&self.config.resolved_vocab_path())?,
                };
                Box::new(TransitionTokenizer::new(vocab, self.config.normalize_phonemes))
            }
        };

        Ok(Aligner::from_parts(AlignerParts {
            featurizer: FrameFeaturizer::new(expected_sample_rate_hz),
            scorer,
            tokenizer,
            decoder: self
                .decoder
                .unwrap_or_else(|| Box::new(ViterbiSequenceDecoder)),
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use crate::model::evidence::EvidenceMatrix;
    use crate::model::featurizer::FrameSequence;

    use super::*;

    struct MockScorer {
        released: Arc<AtomicBool>,
    }

    impl TransitionScorer for MockScorer {
        fn score(&self, frames: &FrameSequence) -> Result<EvidenceMatrix, AlignmentError> {
            if self.is_released() {
                return Err(AlignmentError::UsedAfterRelease);
            }
            let t = frames.num_frames();
            EvidenceMatrix::new(t, 2, vec![-1.0; t * 2], vec![-0.5; t])
        }

        fn release(&self) {
            self.released.store(true, Ordering::SeqCst);
        }

        fn is_released(&self) -> bool {
            self.released.load(Ordering::SeqCst)
        }
    }

    impl Drop for MockScorer {
        fn drop(&mut self) {
            self.release();
        }
    }

    #[test]
    fn build_with_injected_scorer_and_vocab() {
        let released = Arc::new(AtomicBool::new(false));
        let aligner = AlignerBuilder::new(AlignerConfig::default())
            .with_scorer(Box::new(MockScorer {
                released: released.clone(),
            }))
            .with_vocab(TransitionVocab::from_tokens(["pau->a", "a->pau"]))
            .build()
            .expect("build should succeed");
        assert_eq!(aligner.scorer_label(), "custom");
        assert!(!released.load(Ordering::SeqCst));
    }

    #[test]
    fn build_fails_on_missing_model() {
        let result = AlignerBuilder::new(AlignerConfig::new("/nonexistent/model.onnx"))
            .with_vocab(TransitionVocab::from_tokens(["pau->a"]))
            .build();
        assert!(matches!(result, Err(AlignmentError::ModelLoad { .. })));
    }

    #[test]
    fn scorer_is_released_when_vocab_fails_to_load() {
        let released = Arc::new(AtomicBool::new(false));
        let config = AlignerConfig {
            vocab_path: Some("/nonexistent/phoneme_transitions.txt".to_string()),
            ..AlignerConfig::default()
        };
        let result = AlignerBuilder::new(config)
            .with_scorer(Box::new(MockScorer {
                released: released.clone(),
            }))
            .build();
        assert!(matches!(result, Err(AlignmentError::ModelLoad { .. })));
        assert!(released.load(Ordering::SeqCst));
    }
}
