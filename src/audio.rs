use std::path::Path;

use hound::{SampleFormat, WavReader};

use crate::config::AlignerConfig;
use crate::error::AlignmentError;

/// Reads a mono 16 kHz WAV file into f32 samples.
///
/// Integer PCM up to 32 bits is scaled to `[-1, 1)`; 32-bit float is taken
/// as is. Other layouts are rejected rather than converted.
pub fn read_wav_mono_16k(path: &Path) -> Result<Vec<f32>, AlignmentError> {
    let reader = WavReader::open(path).map_err(|e| AlignmentError::wav("open wav", e))?;
    let spec = reader.spec();

    if spec.channels != 1 {
        return Err(AlignmentError::invalid_input(format!(
            "{}: expected mono audio, got {} channels",
            path.display(),
            spec.channels
        )));
    }
    if spec.sample_rate != AlignerConfig::DEFAULT_SAMPLE_RATE_HZ {
        return Err(AlignmentError::invalid_input(format!(
            "{}: expected {} Hz audio, got {} Hz",
            path.display(),
            AlignerConfig::DEFAULT_SAMPLE_RATE_HZ,
            spec.sample_rate
        )));
    }

    let samples = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, bits @ 8..=32) => {
            let scale = (1u64 << (bits - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()
        }
        (SampleFormat::Float, 32) => reader.into_samples::<f32>().collect::<Result<Vec<_>, _>>(),
        (format, bits) => {
            return Err(AlignmentError::invalid_input(format!(
                "{}: unsupported sample format {format:?} with {bits} bits",
                path.display()
            )));
        }
    }
    .map_err(|e| AlignmentError::wav("read wav samples", e))?;

    tracing::debug!(path = %path.display(), samples = samples.len(), "wav loaded");
    Ok(samples)
}
