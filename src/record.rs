//! Versioned loading of persisted records.
//!
//! Records written before versioning have no `schemaVersion` and count as
//! version 0. Loading runs the migration chain up to `SCHEMA_VERSION`, then
//! deserializes and checks the shape. Anything newer than we understand, or
//! anything that fails the checks, is rejected so the caller can start fresh.

use serde_json::{json, Map, Value};
use std::collections::HashSet;

use crate::calendar::parse_date;
use crate::score::{is_exact_match, score};
use crate::session::{GameSession, Mode, MAX_GUESSES};
use crate::stats::Stats;
use crate::words::WORD_LENGTH;

pub const SCHEMA_VERSION: u64 = 1;
const VERSION_FIELD: &str = "schemaVersion";

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("record schema version {0} is newer than supported version {SCHEMA_VERSION}")]
    UnsupportedVersion(u64),
    #[error("record does not match the expected shape: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("record is inconsistent: {0}")]
    Invalid(String),
}

fn version_of(map: &Map<String, Value>) -> u64 {
    map.get(VERSION_FIELD).and_then(Value::as_u64).unwrap_or(0)
}

fn into_object(value: Value) -> Result<Map<String, Value>, RecordError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(RecordError::NotAnObject),
    }
}

/// Wrap a serializable record with the current schema version.
pub fn versioned(value: Value) -> Value {
    match value {
        Value::Object(mut map) => {
            map.insert(VERSION_FIELD.to_string(), json!(SCHEMA_VERSION));
            Value::Object(map)
        }
        other => other,
    }
}

fn migrate_session(mut map: Map<String, Value>) -> Result<Map<String, Value>, RecordError> {
    let version = version_of(&map);
    if version > SCHEMA_VERSION {
        return Err(RecordError::UnsupportedVersion(version));
    }
    if version < 1 {
        map.entry("scratchpad").or_insert_with(|| json!({}));
        map.entry("gameStartTime").or_insert_with(|| json!(0));
        map.insert(VERSION_FIELD.to_string(), json!(1));
    }
    Ok(map)
}

fn migrate_stats(mut map: Map<String, Value>) -> Result<Map<String, Value>, RecordError> {
    let version = version_of(&map);
    if version > SCHEMA_VERSION {
        return Err(RecordError::UnsupportedVersion(version));
    }
    if version < 1 {
        for mode in [Mode::Daily, Mode::Zen] {
            let defaults = serde_json::to_value(Stats::default().record(mode))?;
            let entry = map
                .entry(mode.to_string())
                .or_insert_with(|| defaults.clone());
            // fill fields added after the record was written
            if let (Value::Object(record), Value::Object(defaults)) = (entry, defaults) {
                for (field, default) in defaults {
                    record.entry(field).or_insert(default);
                }
            }
        }
        map.insert(VERSION_FIELD.to_string(), json!(1));
    }
    Ok(map)
}

fn is_game_word(word: &str) -> bool {
    word.len() == WORD_LENGTH && word.bytes().all(|b| b.is_ascii_uppercase())
}

/// Decode a persisted session for `mode`, migrating older shapes.
pub fn session_from_value(value: Value, mode: Mode) -> Result<GameSession, RecordError> {
    let map = migrate_session(into_object(value)?)?;
    let mut session: GameSession = serde_json::from_value(Value::Object(map))?;

    if session.mode() != mode {
        return Err(RecordError::Invalid(format!(
            "expected a {mode} session, found {}",
            session.mode()
        )));
    }
    if parse_date(session.date_string()).is_none() {
        return Err(RecordError::Invalid(format!(
            "bad date {:?}",
            session.date_string()
        )));
    }
    if session.guesses().len() > MAX_GUESSES {
        return Err(RecordError::Invalid(format!(
            "{} guesses exceed the limit of {MAX_GUESSES}",
            session.guesses().len()
        )));
    }
    if let Some(target) = session.target_word() {
        if !is_game_word(target) {
            return Err(RecordError::Invalid(format!("bad target word {target:?}")));
        }
    } else if !session.guesses().is_empty() {
        return Err(RecordError::Invalid("guesses without a target word".into()));
    }
    if let Some(g) = session
        .guesses()
        .iter()
        .find(|g| !is_game_word(g.word()) || usize::from(g.matches()) > WORD_LENGTH)
    {
        return Err(RecordError::Invalid(format!("bad guess {:?}", g.word())));
    }
    if let Some(target) = session.target_word() {
        check_guesses(&session, target)?;
    }

    let (stored_over, stored_won) = (session.is_over(), session.is_won());
    session.refresh_outcome();
    // a stale cache may lag behind the guesses, but a finished game never reopens
    if (stored_over && !session.is_over()) || (stored_won && !session.is_won()) {
        return Err(RecordError::Invalid(
            "stored as finished but the guesses say otherwise".into(),
        ));
    }
    session.set_fetching_word(false);
    Ok(session)
}

/// Guess history must be replayable against the target: unique words, scores
/// that match, and no guesses after the winning one.
fn check_guesses(session: &GameSession, target: &str) -> Result<(), RecordError> {
    let guesses = session.guesses();
    let mut seen = HashSet::with_capacity(guesses.len());

    for (i, guess) in guesses.iter().enumerate() {
        if !seen.insert(guess.word().to_ascii_uppercase()) {
            return Err(RecordError::Invalid(format!(
                "repeated guess {:?}",
                guess.word()
            )));
        }
        if guess.matches() != score(guess.word(), target) {
            return Err(RecordError::Invalid(format!(
                "guess {:?} stored with {} matches",
                guess.word(),
                guess.matches()
            )));
        }
        if i + 1 < guesses.len() && is_exact_match(guess.word(), target) {
            return Err(RecordError::Invalid(format!(
                "guesses continue after winning with {:?}",
                guess.word()
            )));
        }
    }
    Ok(())
}

pub fn stats_from_value(value: Value) -> Result<Stats, RecordError> {
    let map = migrate_stats(into_object(value)?)?;
    Ok(serde_json::from_value(Value::Object(map))?)
}
