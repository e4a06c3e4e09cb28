use std::path::Path;
#[cfg(feature = "onnx")]
use std::sync::Mutex;

use crate::error::AlignmentError;
#[cfg(feature = "onnx")]
use crate::model::evidence::EvidenceMatrix;
#[cfg(feature = "onnx")]
use crate::model::featurizer::FrameSequence;
use crate::pipeline::traits::TransitionScorer;

#[cfg(feature = "onnx")]
const INPUT_WAVEFORM: &str = "input_waveform";
#[cfg(feature = "onnx")]
const OUTPUT_TRANSITIONS: &str = "transition_logprobs";
#[cfg(feature = "onnx")]
const OUTPUT_BLANK: &str = "blank_logprobs";

pub(crate) fn load_onnx_scorer(
    model_path: &str,
) -> Result<Box<dyn TransitionScorer>, AlignmentError> {
    let path = Path::new(model_path);
    if !path.is_file() {
        return Err(AlignmentError::model_load(model_path, "model file not found"));
    }

    #[cfg(feature = "onnx")]
    {
        Ok(Box::new(OnnxTransitionScorer::load(path)?))
    }

    #[cfg(not(feature = "onnx"))]
    {
        Err(AlignmentError::model_load(
            model_path,
            "ONNX runtime support is disabled; enable the `onnx` cargo feature",
        ))
    }
}

/// Phoneme-transition model served by ONNX Runtime.
///
/// The session sits behind a mutex, so at most one inference runs per loaded
/// model; `None` marks a released model.
#[cfg(feature = "onnx")]
pub struct OnnxTransitionScorer {
    session: Mutex<Option<ort::session::Session>>,
    model_path: String,
}

#[cfg(feature = "onnx")]
impl OnnxTransitionScorer {
    pub fn load(path: &Path) -> Result<Self, AlignmentError> {
        let model_path = path.display().to_string();
        let session = ort::session::Session::builder()
            .map_err(|e| AlignmentError::model_load(&model_path, e))?
            .commit_from_file(path)
            .map_err(|e| AlignmentError::model_load(&model_path, e))?;

        tracing::info!(
            inputs = session.inputs().len(),
            outputs = session.outputs().len(),
            model_path = %model_path,
            "phoneme transition ONNX model loaded"
        );

        Ok(Self {
            session: Mutex::new(Some(session)),
            model_path,
        })
    }

    fn run_forward(&self, samples: &[f32]) -> Result<EvidenceMatrix, AlignmentError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|_| AlignmentError::inference("onnx session lock", "session mutex poisoned"))?;
        let session = guard.as_mut().ok_or(AlignmentError::UsedAfterRelease)?;

        let input = ort::value::TensorRef::from_array_view(([1usize, samples.len()], samples))
            .map_err(|e| AlignmentError::inference("onnx input tensor", e))?;
        let outputs = session
            .run(ort::inputs![INPUT_WAVEFORM => input])
            .map_err(|e| AlignmentError::inference("onnx forward pass", e))?;

        let transitions = outputs.get(OUTPUT_TRANSITIONS).ok_or_else(|| {
            AlignmentError::inference("onnx forward pass", "model produced no transition_logprobs")
        })?;
        let (shape, transition_logprobs) = transitions
            .try_extract_tensor::<f32>()
            .map_err(|e| AlignmentError::inference("onnx extract transition_logprobs", e))?;
        let dims: Vec<i64> = shape.iter().copied().collect();
        let (num_frames, vocab_size) =
            parse_transition_shape(&dims, transition_logprobs.len())?;

        let blank = outputs.get(OUTPUT_BLANK).ok_or_else(|| {
            AlignmentError::inference("onnx forward pass", "model produced no blank_logprobs")
        })?;
        let (shape, blank_logprobs) = blank
            .try_extract_tensor::<f32>()
            .map_err(|e| AlignmentError::inference("onnx extract blank_logprobs", e))?;
        let dims: Vec<i64> = shape.iter().copied().collect();
        parse_blank_shape(&dims, blank_logprobs.len(), num_frames)?;

        EvidenceMatrix::new(
            num_frames,
            vocab_size,
            transition_logprobs.to_vec(),
            blank_logprobs.to_vec(),
        )
    }
}

#[cfg(feature = "onnx")]
impl TransitionScorer for OnnxTransitionScorer {
    fn score(&self, frames: &FrameSequence) -> Result<EvidenceMatrix, AlignmentError> {
        self.run_forward(frames.samples())
    }

    fn release(&self) {
        let released = match self.session.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if released.is_some() {
            tracing::debug!(model_path = %self.model_path, "phoneme transition model released");
        }
    }

    fn is_released(&self) -> bool {
        match self.session.lock() {
            Ok(guard) => guard.is_none(),
            Err(poisoned) => poisoned.into_inner().is_none(),
        }
    }

    fn label(&self) -> String {
        "onnx-cpu".to_string()
    }
}

#[cfg(feature = "onnx")]
impl Drop for OnnxTransitionScorer {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(feature = "onnx")]
fn parse_transition_shape(
    dims: &[i64],
    data_len: usize,
) -> Result<(usize, usize), AlignmentError> {
    let (num_frames, vocab_size) = match dims {
        [batch, t, v] => {
            let batch = non_negative_dim(*batch, "batch")?;
            if batch != 1 {
                return Err(AlignmentError::inference(
                    "onnx output shape",
                    format!("transition_logprobs batch size must be 1, got {batch}"),
                ));
            }
            (positive_dim(*t, "time")?, positive_dim(*v, "vocab")?)
        }
        [t, v] => (positive_dim(*t, "time")?, positive_dim(*v, "vocab")?),
        _ => {
            return Err(AlignmentError::inference(
                "onnx output shape",
                format!(
                    "unsupported transition_logprobs rank {}; expected [1, T, V] or [T, V]",
                    dims.len()
                ),
            ));
        }
    };

    let expected_len = num_frames.checked_mul(vocab_size).ok_or_else(|| {
        AlignmentError::inference("onnx output shape", "transition_logprobs shape is too large")
    })?;
    if expected_len != data_len {
        return Err(AlignmentError::inference(
            "onnx output shape",
            format!(
                "transition_logprobs shape/data mismatch: shape implies {expected_len} values, got {data_len}"
            ),
        ));
    }
    Ok((num_frames, vocab_size))
}

#[cfg(feature = "onnx")]
fn parse_blank_shape(
    dims: &[i64],
    data_len: usize,
    num_frames: usize,
) -> Result<(), AlignmentError> {
    let t = match dims {
        [batch, t] if *batch == 1 => positive_dim(*t, "time")?,
        [t] => positive_dim(*t, "time")?,
        _ => {
            return Err(AlignmentError::inference(
                "onnx output shape",
                format!("unsupported blank_logprobs shape {dims:?}; expected [1, T] or [T]"),
            ));
        }
    };
    if t != num_frames || data_len != num_frames {
        return Err(AlignmentError::inference(
            "onnx output shape",
            format!("blank_logprobs has {data_len} frames, transition_logprobs has {num_frames}"),
        ));
    }
    Ok(())
}

#[cfg(feature = "onnx")]
fn non_negative_dim(value: i64, name: &'static str) -> Result<usize, AlignmentError> {
    if value < 0 {
        return Err(AlignmentError::inference(
            "onnx output shape",
            format!("ONNX output {name} dimension must be >= 0, got {value}"),
        ));
    }
    Ok(value as usize)
}

#[cfg(feature = "onnx")]
fn positive_dim(value: i64, name: &'static str) -> Result<usize, AlignmentError> {
    if value <= 0 {
        return Err(AlignmentError::inference(
            "onnx output shape",
            format!("ONNX output {name} dimension must be > 0, got {value}"),
        ));
    }
    Ok(value as usize)
}
