use crate::config::BOUNDARY_PHONEME;
use crate::error::AlignmentError;
use crate::model::vocab::TransitionVocab;
use crate::types::PhonemeSequence;

/// Consonants after which a vowel may lose its voicing.
const DEVOICING_CONTEXT: [&str; 12] = [
    "k", "ky", "ch", "ts", "sh", "s", "hy", "h", "f", "py", "p", "t",
];

pub fn build_phoneme_sequence(
    phonemes: &str,
    vocab: &TransitionVocab,
    normalize: bool,
) -> Result<PhonemeSequence, AlignmentError> {
    let mut symbols: Vec<String> = phonemes.split_whitespace().map(str::to_string).collect();
    if symbols.is_empty() {
        return Err(AlignmentError::EmptyPhonemeSequence);
    }

    if normalize {
        insert_boundary_pauses(&mut symbols);
        devoice_i_and_u(&mut symbols);
        unique_consecutive(&mut symbols);
    }

    let transition_ids = symbols
        .windows(2)
        .map(|pair| {
            vocab.transition_id(&pair[0], &pair[1]).ok_or_else(|| {
                AlignmentError::invalid_input(format!(
                    "unknown phoneme transition '{}->{}'",
                    pair[0], pair[1]
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PhonemeSequence {
        phonemes: symbols,
        transition_ids,
    })
}

pub fn insert_boundary_pauses(phonemes: &mut Vec<String>) {
    if phonemes.first().map(String::as_str) != Some(BOUNDARY_PHONEME) {
        phonemes.insert(0, BOUNDARY_PHONEME.to_string());
    }
    if phonemes.last().map(String::as_str) != Some(BOUNDARY_PHONEME) {
        phonemes.push(BOUNDARY_PHONEME.to_string());
    }
}

/// `i`/`u` between a voiceless consonant and a voiceless consonant or pause
/// becomes `I`/`U`. Edge positions are never rewritten.
pub fn devoice_i_and_u(phonemes: &mut [String]) {
    if phonemes.len() < 3 {
        return;
    }
    for i in 1..phonemes.len() - 1 {
        let devoiced = match phonemes[i].as_str() {
            "i" => "I",
            "u" => "U",
            _ => continue,
        };
        let prev = phonemes[i - 1].as_str();
        let next = phonemes[i + 1].as_str();
        if DEVOICING_CONTEXT.contains(&prev)
            && (DEVOICING_CONTEXT.contains(&next) || next == BOUNDARY_PHONEME)
        {
            phonemes[i] = devoiced.to_string();
        }
    }
}

pub fn unique_consecutive(phonemes: &mut Vec<String>) {
    phonemes.dedup();
}
