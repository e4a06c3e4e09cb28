//! Forced phoneme alignment.
//!
//! Given a mono 16 kHz waveform and its phoneme transcription, [`Aligner`]
//! finds the start and end time of every phoneme. A phoneme-transition model
//! scores every 10 ms frame and a duration-constrained Viterbi search picks
//! the best monotonic segmentation.
//!
//! ```no_run
//! use domino_rs::{labels, Aligner, Waveform};
//!
//! let aligner = Aligner::new("onnx_model/phoneme_transition_model.onnx")?;
//! let samples = domino_rs::audio::read_wav_mono_16k("dowaNgo.wav".as_ref())?;
//! let result = aligner.align(&Waveform::mono_16k(&samples), "d o w a N g o", 3)?;
//! print!("{}", labels::format_lab(&result));
//! aligner.release();
//! # Ok::<(), domino_rs::AlignmentError>(())
//! ```

pub mod alignment;
pub mod audio;
pub mod config;
pub mod error;
pub mod labels;
pub mod model;
pub mod pipeline;
pub mod types;

pub use config::AlignerConfig;
pub use error::AlignmentError;
pub use model::evidence::EvidenceMatrix;
pub use model::featurizer::{FrameFeaturizer, FrameSequence};
pub use model::vocab::TransitionVocab;
pub use pipeline::builder::AlignerBuilder;
pub use pipeline::runtime::Aligner;
pub use pipeline::traits::{PhonemeTokenizer, SequenceDecoder, TransitionScorer};
pub use types::{AlignmentPath, PhonemeAlignment, PhonemeSequence, Segment, Waveform};
