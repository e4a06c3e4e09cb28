use std::collections::HashMap;
use std::path::Path;

use crate::error::AlignmentError;

/// Separator between the two phonemes of a transition token, as in `pau->d`.
pub const TRANSITION_SEPARATOR: &str = "->";

/// Column index of every phoneme transition token in the model output.
#[derive(Debug, Clone, Default)]
pub struct TransitionVocab {
    token_to_id: HashMap<String, usize>,
    id_to_token: Vec<String>,
}

impl TransitionVocab {
    pub fn load(path: &Path) -> Result<Self, AlignmentError> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            AlignmentError::model_load(path.display().to_string(), format!("read vocabulary: {e}"))
        })?;
        // Line `i` is output column `i`; a blank line keeps its column but
        // matches no transition.
        let vocab = Self::from_tokens(data.lines().map(str::trim));
        if vocab.token_to_id.is_empty() {
            return Err(AlignmentError::model_load(
                path.display().to_string(),
                "transition vocabulary is empty",
            ));
        }
        tracing::debug!(path = %path.display(), tokens = vocab.len(), "transition vocabulary loaded");
        Ok(vocab)
    }

    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocab = Self::default();
        for token in tokens {
            let token = token.into();
            if !token.is_empty() {
                vocab.token_to_id.insert(token.clone(), vocab.id_to_token.len());
            }
            vocab.id_to_token.push(token);
        }
        vocab
    }

    pub fn len(&self) -> usize {
        self.id_to_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_token.is_empty()
    }

    pub fn transition_id(&self, prev: &str, next: &str) -> Option<usize> {
        self.token_to_id
            .get(&format!("{prev}{TRANSITION_SEPARATOR}{next}"))
            .copied()
    }

    pub fn token(&self, id: usize) -> Option<&str> {
        self.id_to_token.get(id).map(String::as_str)
    }
}
