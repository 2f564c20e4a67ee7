use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use serde_json::from_str;
use std::collections::HashSet;

use crate::validate::Dictionary;

static LANG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/lang");

pub const WORD_LENGTH: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum WordListError {
    #[error("word list file not found: {0}")]
    NotFound(String),
    #[error("word list file is not valid UTF-8: {0}")]
    Encoding(String),
    #[error("unable to deserialize word list: {0}")]
    Json(#[from] serde_json::Error),
    #[error("word list has no daily words")]
    EmptyDaily,
    #[error("word list entry {0:?} is not a 5-letter word")]
    BadEntry(String),
}

#[derive(Deserialize)]
struct WordFile {
    name: String,
    daily: Vec<String>,
    #[serde(default)]
    extra: Vec<String>,
}

/// The fixed local word lists.
///
/// `daily` is both the pool of daily answers and the zen fallback pool. Its
/// contents and order are frozen: the daily word for a date is an index into
/// this list, so any edit changes the answer for past and future dates on
/// every device. Append-only changes are breaking too.
///
/// `valid` is the authoritative dictionary for guesses and always contains
/// every daily word.
#[derive(Debug, Clone)]
pub struct WordList {
    name: String,
    daily: Vec<String>,
    valid: HashSet<String>,
}

impl WordList {
    /// The embedded English list shipped with the game.
    pub fn english() -> Self {
        Self::load("words.json").expect("embedded word list is valid")
    }

    pub fn load(file_name: &str) -> Result<Self, WordListError> {
        let file = LANG_DIR
            .get_file(file_name)
            .ok_or_else(|| WordListError::NotFound(file_name.to_string()))?;

        let file_as_str = file
            .contents_utf8()
            .ok_or_else(|| WordListError::Encoding(file_name.to_string()))?;

        let parsed: WordFile = from_str(file_as_str)?;
        Self::build(parsed.name, parsed.daily, parsed.extra)
    }

    /// Build a list from in-memory words. Entries are uppercased.
    pub fn from_words<I, J, S, T>(daily: I, extra: J) -> Result<Self, WordListError>
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self::build(
            "custom".to_string(),
            daily.into_iter().map(Into::into).collect(),
            extra.into_iter().map(Into::into).collect(),
        )
    }

    fn build(name: String, daily: Vec<String>, extra: Vec<String>) -> Result<Self, WordListError> {
        let daily = daily
            .into_iter()
            .map(|w| checked_entry(&w))
            .collect::<Result<Vec<_>, _>>()?;
        if daily.is_empty() {
            return Err(WordListError::EmptyDaily);
        }

        let mut valid: HashSet<String> = daily.iter().cloned().collect();
        for w in extra {
            valid.insert(checked_entry(&w)?);
        }

        Ok(Self { name, daily, valid })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn daily_words(&self) -> &[String] {
        &self.daily
    }

    /// Pick a daily-list word uniformly at random.
    pub fn random_daily<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        // build() rejects empty daily lists
        self.daily
            .choose(rng)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

impl Dictionary for WordList {
    fn contains(&self, word: &str) -> bool {
        self.valid.contains(word)
    }
}

fn checked_entry(word: &str) -> Result<String, WordListError> {
    let upper = word.trim().to_ascii_uppercase();
    if upper.len() == WORD_LENGTH && upper.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(upper)
    } else {
        Err(WordListError::BadEntry(word.to_string()))
    }
}
