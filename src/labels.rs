use std::fmt::Write as _;
use std::path::Path;

use crate::error::AlignmentError;
use crate::types::PhonemeAlignment;

/// `start\tend\tphoneme` per line, seconds with three decimals.
pub fn format_lab(alignment: &[PhonemeAlignment]) -> String {
    let mut out = String::new();
    for record in alignment {
        let _ = writeln!(
            out,
            "{:.3}\t{:.3}\t{}",
            record.start_seconds, record.end_seconds, record.phoneme
        );
    }
    out
}

pub fn write_lab_file(alignment: &[PhonemeAlignment], path: &Path) -> Result<(), AlignmentError> {
    std::fs::write(path, format_lab(alignment)).map_err(|e| AlignmentError::io("write lab file", e))?;
    tracing::debug!(path = %path.display(), segments = alignment.len(), "lab file written");
    Ok(())
}

pub fn write_json_file(alignment: &[PhonemeAlignment], path: &Path) -> Result<(), AlignmentError> {
    let data = serde_json::to_string_pretty(alignment)
        .map_err(|e| AlignmentError::json("serialize alignment", e))?;
    std::fs::write(path, data).map_err(|e| AlignmentError::io("write json file", e))?;
    tracing::debug!(path = %path.display(), segments = alignment.len(), "json file written");
    Ok(())
}

/// Reads a whitespace separated transcription, e.g. a `.txt` next to a `.wav`.
pub fn read_phoneme_file(path: &Path) -> Result<String, AlignmentError> {
    let text = std::fs::read_to_string(path).map_err(|e| AlignmentError::io("read phoneme file", e))?;
    Ok(text.split_whitespace().collect::<Vec<_>>().join(" "))
}
