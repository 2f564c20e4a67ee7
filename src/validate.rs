use std::collections::HashSet;

use crate::session::Guess;
use crate::words::WORD_LENGTH;

/// Why a submitted guess was refused. The messages are shown to the player verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GuessError {
    #[error("Please enter a word")]
    EmptyInput,
    #[error("Word must be exactly 5 letters")]
    WrongLength,
    #[error("Word must contain only letters")]
    InvalidCharacters,
    #[error("Hmm, that's not a word I recognize. Try another!")]
    UnknownWord,
    #[error("You already tried that one!")]
    DuplicateGuess,
}

/// Membership test for accepted guesses.
pub trait Dictionary {
    fn contains(&self, word: &str) -> bool;
}

impl Dictionary for HashSet<String> {
    fn contains(&self, word: &str) -> bool {
        HashSet::contains(self, word)
    }
}

/// A base dictionary plus words admitted at runtime by the remote lookup.
pub struct Widened<'a, D: ?Sized> {
    pub base: &'a D,
    pub admitted: &'a HashSet<String>,
}

impl<D: Dictionary + ?Sized> Dictionary for Widened<'_, D> {
    fn contains(&self, word: &str) -> bool {
        self.base.contains(word) || self.admitted.contains(word)
    }
}

pub fn normalize(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Structural rules only: empty, length, alphabet. Returns the normalized word.
pub fn check_shape(raw: &str) -> Result<String, GuessError> {
    if raw.trim().is_empty() {
        return Err(GuessError::EmptyInput);
    }

    let word = normalize(raw);

    if word.chars().count() != WORD_LENGTH {
        return Err(GuessError::WrongLength);
    }

    if !word.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(GuessError::InvalidCharacters);
    }

    Ok(word)
}

/// Check a raw submission against all guess rules, first failure wins.
///
/// On success returns the normalized (trimmed, uppercase) word.
pub fn validate<D: Dictionary + ?Sized>(
    raw: &str,
    previous: &[Guess],
    dictionary: &D,
) -> Result<String, GuessError> {
    let word = check_shape(raw)?;

    if !dictionary.contains(&word) {
        return Err(GuessError::UnknownWord);
    }

    if previous.iter().any(|g| g.word().eq_ignore_ascii_case(&word)) {
        return Err(GuessError::DuplicateGuess);
    }

    Ok(word)
}
