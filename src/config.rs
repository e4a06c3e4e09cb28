use std::path::{Path, PathBuf};

/// Symbol that may absorb leading/trailing silence.
pub const BOUNDARY_PHONEME: &str = "pau";
pub const FRAME_STRIDE_MS: u32 = 10;
pub const SAMPLES_PER_FRAME: usize = 160;
pub const FRAME_STRIDE_SECONDS: f64 = 0.01;
pub const DEFAULT_VOCAB_FILE: &str = "phoneme_transitions.txt";

#[derive(Debug, Clone)]
pub struct AlignerConfig {
    pub model_path: String,
    /// Transition vocabulary; `phoneme_transitions.txt` next to the model when unset.
    pub vocab_path: Option<String>,
    pub expected_sample_rate_hz: u32,
    /// Insert edge `pau`, devoice `i`/`u` and collapse repeats before decoding.
    pub normalize_phonemes: bool,
}

impl AlignerConfig {
    pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 16_000;

    pub fn new(model_path: impl Into<String>) -> Self {
        Self {
            model_path: model_path.into(),
            ..Self::default()
        }
    }

    pub fn resolved_vocab_path(&self) -> PathBuf {
        match &self.vocab_path {
            Some(path) => PathBuf::from(path),
            None => Path::new(&self.model_path)
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(DEFAULT_VOCAB_FILE),
        }
    }
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            model_path: String::new(),
            vocab_path: None,
            expected_sample_rate_hz: Self::DEFAULT_SAMPLE_RATE_HZ,
            normalize_phonemes: true,
        }
    }
}
