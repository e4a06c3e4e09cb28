use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlignmentError {
    #[error("failed to load model from {path}: {message}")]
    ModelLoad { path: String, message: String },
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
    #[error("phoneme sequence is empty")]
    EmptyPhonemeSequence,
    #[error("inference failed during {context}: {message}")]
    Inference {
        context: &'static str,
        message: String,
    },
    #[error(
        "audio too short for alignment: {required_frames} frames required at \
         min_aligned_timeframe={min_aligned_timeframe}, {available_frames} available{}",
        feasible_hint(.max_feasible_min)
    )]
    InfeasibleAlignment {
        required_frames: usize,
        available_frames: usize,
        min_aligned_timeframe: usize,
        max_feasible_min: Option<usize>,
    },
    #[error("transition scorer used after release")]
    UsedAfterRelease,
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("WAV error while {context}: {source}")]
    Wav {
        context: &'static str,
        #[source]
        source: hound::Error,
    },
    #[error("JSON error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

fn feasible_hint(max_feasible_min: &Option<usize>) -> String {
    match max_feasible_min {
        Some(n) => format!(" (largest feasible min_aligned_timeframe is {n})"),
        None => String::new(),
    }
}

impl AlignmentError {
    pub(crate) fn model_load(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::ModelLoad {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub(crate) fn inference(context: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Inference {
            context,
            message: err.to_string(),
        }
    }

    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn wav(context: &'static str, source: hound::Error) -> Self {
        Self::Wav { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    /// Stable name of the failure kind, used in CLI diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ModelLoad { .. } => "ModelLoadError",
            Self::InvalidArgument { .. } => "InvalidArgumentError",
            Self::EmptyPhonemeSequence => "EmptyPhonemeSequenceError",
            Self::Inference { .. } => "InferenceError",
            Self::InfeasibleAlignment { .. } => "InfeasibleAlignmentError",
            Self::UsedAfterRelease => "UsedAfterReleaseError",
            Self::Io { .. } | Self::Wav { .. } | Self::Json { .. } => "IoError",
        }
    }
}
