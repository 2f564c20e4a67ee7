use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::score::{is_exact_match, score};
use crate::validate::{validate, Dictionary, GuessError};

pub const MAX_GUESSES: usize = 10;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    Daily,
    Zen,
}

/// One scored submission. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guess {
    word: String,
    matches: u8,
}

impl Guess {
    pub fn new(word: impl Into<String>, matches: u8) -> Self {
        Self {
            word: word.into(),
            matches,
        }
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn matches(&self) -> u8 {
        self.matches
    }
}

/// Player annotation for a scratchpad letter. Cycles in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Mark {
    #[default]
    Neutral,
    Present,
    AbsentGuess,
    Excluded,
}

impl Mark {
    pub fn next(self) -> Self {
        match self {
            Mark::Neutral => Mark::Present,
            Mark::Present => Mark::AbsentGuess,
            Mark::AbsentGuess => Mark::Excluded,
            Mark::Excluded => Mark::Neutral,
        }
    }
}

impl From<Mark> for u8 {
    fn from(mark: Mark) -> u8 {
        match mark {
            Mark::Neutral => 0,
            Mark::Present => 1,
            Mark::AbsentGuess => 2,
            Mark::Excluded => 3,
        }
    }
}

impl TryFrom<u8> for Mark {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Mark::Neutral),
            1 => Ok(Mark::Present),
            2 => Ok(Mark::AbsentGuess),
            3 => Ok(Mark::Excluded),
            other => Err(format!("unknown scratchpad mark {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    AwaitingWord,
    InProgress,
    Over(Outcome),
}

/// Why a submission did not reach the board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// The target word is still being resolved; not a validation failure.
    #[error("Fetching a word, please try again in a moment.")]
    NotReady,
    /// The session is over; only a reset starts a new one.
    #[error("This game is over. Start a new one to keep playing.")]
    GameOver,
    #[error(transparent)]
    Invalid(#[from] GuessError),
}

/// Completion notice handed to the stats tracker, exactly once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub mode: Mode,
    pub won: bool,
    pub guess_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub session: GameSession,
    pub guess: Guess,
    pub completed: Option<Completion>,
}

/// One puzzle attempt. Transitions return a new value; the old one is untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    mode: Mode,
    target_word: Option<String>,
    guesses: Vec<Guess>,
    #[serde(rename = "isGameOver")]
    is_over: bool,
    is_won: bool,
    date_string: String,
    #[serde(default)]
    scratchpad: BTreeMap<char, Mark>,
    #[serde(default)]
    game_start_time: i64,
    #[serde(skip)]
    fetching_word: bool,
}

impl GameSession {
    pub fn new(mode: Mode, date_string: impl Into<String>, started_at_ms: i64) -> Self {
        Self {
            mode,
            target_word: None,
            guesses: Vec::new(),
            is_over: false,
            is_won: false,
            date_string: date_string.into(),
            scratchpad: BTreeMap::new(),
            game_start_time: started_at_ms,
            fetching_word: false,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn target_word(&self) -> Option<&str> {
        self.target_word.as_deref()
    }

    pub fn guesses(&self) -> &[Guess] {
        &self.guesses
    }

    pub fn is_over(&self) -> bool {
        self.is_over
    }

    pub fn is_won(&self) -> bool {
        self.is_won
    }

    pub fn date_string(&self) -> &str {
        &self.date_string
    }

    pub fn game_start_time(&self) -> i64 {
        self.game_start_time
    }

    pub fn is_fetching_word(&self) -> bool {
        self.fetching_word && self.target_word.is_none()
    }

    pub fn guesses_left(&self) -> usize {
        MAX_GUESSES.saturating_sub(self.guesses.len())
    }

    pub fn mark(&self, letter: char) -> Mark {
        self.scratchpad
            .get(&letter.to_ascii_uppercase())
            .copied()
            .unwrap_or_default()
    }

    pub fn scratchpad(&self) -> &BTreeMap<char, Mark> {
        &self.scratchpad
    }

    pub fn phase(&self) -> Phase {
        if self.is_over {
            Phase::Over(if self.is_won {
                Outcome::Won
            } else {
                Outcome::Lost
            })
        } else if self.target_word.is_some() {
            Phase::InProgress
        } else if self.is_fetching_word() {
            Phase::AwaitingWord
        } else {
            Phase::Uninitialized
        }
    }

    /// Mark the session as waiting on an asynchronous word fetch.
    pub fn awaiting_word(&self) -> Self {
        let mut next = self.clone();
        next.fetching_word = next.target_word.is_none();
        next
    }

    /// Install the target word. A session that already has one is returned unchanged.
    pub fn resolve(&self, word: &str) -> Self {
        let mut next = self.clone();
        if next.target_word.is_some() {
            debug!("ignoring word for an already resolved {} session", self.mode);
            return next;
        }
        next.target_word = Some(word.to_uppercase());
        next.fetching_word = false;
        next
    }

    /// Validate, score and append a guess.
    pub fn submit<D: Dictionary + ?Sized>(
        &self,
        raw: &str,
        dictionary: &D,
    ) -> Result<Submission, SubmitError> {
        if self.is_over {
            return Err(SubmitError::GameOver);
        }
        let target = self.target_word.as_deref().ok_or(SubmitError::NotReady)?;

        let word = validate(raw, &self.guesses, dictionary)?;
        let guess = Guess::new(word, score(raw.trim(), target));

        let mut next = self.clone();
        next.guesses.push(guess.clone());
        next.refresh_outcome();

        let completed = next.is_over.then_some(Completion {
            mode: next.mode,
            won: next.is_won,
            guess_count: next.guesses.len(),
        });

        debug!(
            "{} guess {}/{} scored {}",
            self.mode,
            next.guesses.len(),
            MAX_GUESSES,
            guess.matches
        );

        Ok(Submission {
            session: next,
            guess,
            completed,
        })
    }

    /// Advance a letter's scratchpad mark. Always allowed, even after the game ends.
    pub fn cycle(&self, letter: char) -> Self {
        let mut next = self.clone();
        let letter = letter.to_ascii_uppercase();
        if letter.is_ascii_uppercase() {
            let mark = next.scratchpad.entry(letter).or_default();
            *mark = mark.next();
        }
        next
    }

    /// Recompute the cached termination flags from the guess list.
    pub(crate) fn refresh_outcome(&mut self) {
        self.is_won = match (self.guesses.last(), self.target_word.as_deref()) {
            (Some(last), Some(target)) => is_exact_match(last.word(), target),
            _ => false,
        };
        self.is_over = self.is_won || self.guesses.len() >= MAX_GUESSES;
    }

    pub(crate) fn set_fetching_word(&mut self, fetching: bool) {
        self.fetching_word = fetching;
    }
}
