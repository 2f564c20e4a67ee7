// Daily mode driven through the public API: determinism, rollover,
// persistence across restarts and resilience to a broken store.

use chrono::NaiveDate;
use jotto::calendar::FixedClock;
use jotto::service::OfflineService;
use jotto::storage::{
    FileStore, MemoryStore, PersistenceGateway, SqliteStore, StorageError, DAILY_GAME_KEY,
    STATS_KEY,
};
use jotto::word_source::WordSource;
use jotto::words::WordList;
use jotto::{Game, GuessError, Mode, Phase, SubmitError};
use serde_json::json;
use std::rc::Rc;
use std::sync::Arc;
use tempfile::tempdir;

fn source() -> WordSource<OfflineService> {
    WordSource::new(Arc::new(WordList::english()), Arc::new(OfflineService))
}

fn clock(y: i32, m: u32, d: u32) -> FixedClock {
    FixedClock::new(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn daily(store: Rc<dyn PersistenceGateway>, clock: &FixedClock) -> Game<OfflineService> {
    Game::new(Mode::Daily, source(), store, Rc::new(clock.clone()))
}

struct BrokenStore;

impl PersistenceGateway for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(std::io::Error::other("disk on fire").into())
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(std::io::Error::other("disk on fire").into())
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(std::io::Error::other("disk on fire").into())
    }
}

#[test]
fn daily_word_is_the_same_for_every_player() {
    let clock = clock(2024, 1, 1);
    let a = daily(Rc::new(MemoryStore::new()), &clock);
    let b = daily(Rc::new(MemoryStore::new()), &clock);
    assert_eq!(a.session().target_word(), Some("BADGE"));
    assert_eq!(a.session().target_word(), b.session().target_word());
}

#[test]
fn full_daily_game_updates_stats_and_blocks_replay() {
    let clock = clock(2024, 1, 1);
    let store = Rc::new(MemoryStore::new());
    let mut game = daily(store.clone(), &clock);

    let first = game.submit_guess("  trace ").unwrap();
    assert_eq!(first.guess.word(), "TRACE");
    assert_eq!(first.guess.matches(), 2);
    assert!(!first.is_over);

    assert_eq!(
        game.submit_guess("TRACE"),
        Err(SubmitError::Invalid(GuessError::DuplicateGuess))
    );

    let last = game.submit_guess("Badge").unwrap();
    assert!(last.is_won);
    assert!(game.has_played_today());
    assert_eq!(
        game.share_text(),
        "Cozy Jotto Jan 1, 2024\nSolved in 2/10 ☕\n\n🟢🟢⚪⚪⚪\n🟢🟢🟢🟢🟢"
    );

    // a restart on the same day restores the finished game
    let again = daily(store.clone(), &clock);
    assert_eq!(again.phase(), Phase::Over(jotto::session::Outcome::Won));
    assert_eq!(again.stats().record(Mode::Daily).games_won, 1);
    assert!(!again.can_play());
}

#[test]
fn yesterdays_session_is_replaced_on_load() {
    let store = Rc::new(MemoryStore::new());
    let yesterday = clock(2024, 1, 1);
    let mut game = daily(store.clone(), &yesterday);
    game.submit_guess("crane").unwrap();
    game.submit_guess("badge").unwrap();

    let today = clock(2024, 1, 2);
    let game = daily(store.clone(), &today);
    assert_eq!(game.session().date_string(), "2024-01-02");
    assert!(game.session().guesses().is_empty());
    assert_eq!(game.session().target_word(), Some("BACON"));
    assert!(game.can_play());
    assert!(!game.has_played_today());

    // stats from yesterday survive the rollover
    let daily_stats = game.stats().record(Mode::Daily);
    assert_eq!(daily_stats.games_played, 1);
    assert_eq!(daily_stats.current_streak, 1);
}

#[test]
fn streak_continues_across_consecutive_days() {
    let store = Rc::new(MemoryStore::new());
    let clock = clock(2024, 1, 1);
    let mut game = daily(store, &clock);
    game.submit_guess("badge").unwrap();

    clock.advance_days(1);
    assert!(game.activate());
    game.submit_guess("bacon").unwrap();

    let record = game.stats().record(Mode::Daily);
    assert_eq!(record.current_streak, 2);
    assert_eq!(record.max_streak, 2);
    assert_eq!(record.wins_in(1), 2);
}

#[test]
fn legacy_unversioned_session_is_migrated() {
    let store = Rc::new(MemoryStore::new());
    let legacy = json!({
        "mode": "daily",
        "targetWord": "BADGE",
        "guesses": [{"word": "CRANE", "matches": 2}],
        "isGameOver": false,
        "isWon": false,
        "dateString": "2024-01-01"
    });
    store.set(DAILY_GAME_KEY, &legacy.to_string()).unwrap();

    let game = daily(store.clone(), &clock(2024, 1, 1));
    assert_eq!(game.session().guesses().len(), 1);
    assert!(game.session().scratchpad().is_empty());

    let saved: serde_json::Value =
        serde_json::from_str(&store.get(DAILY_GAME_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(saved["schemaVersion"], 1);
}

#[test]
fn corrupt_records_start_fresh() {
    let store = Rc::new(MemoryStore::new());
    store.set(DAILY_GAME_KEY, "{\"mode\": 7").unwrap();
    store
        .set(STATS_KEY, &json!({"schemaVersion": 99}).to_string())
        .unwrap();

    let game = daily(store, &clock(2024, 1, 1));
    assert_eq!(game.phase(), Phase::InProgress);
    assert!(game.session().guesses().is_empty());
    assert_eq!(game.stats().record(Mode::Daily).games_played, 0);
}

#[test]
fn game_survives_a_broken_store() {
    let clock = clock(2024, 1, 1);
    let mut game = daily(Rc::new(BrokenStore), &clock);
    assert_eq!(game.phase(), Phase::InProgress);

    let outcome = game.submit_guess("badge").unwrap();
    assert!(outcome.is_won);
    assert_eq!(game.stats().record(Mode::Daily).games_won, 1);
}

#[test]
fn file_store_keeps_game_between_runs() {
    let dir = tempdir().unwrap();
    let clock = clock(2024, 1, 1);
    {
        let mut game = daily(Rc::new(FileStore::with_dir(dir.path())), &clock);
        game.submit_guess("crane").unwrap();
        game.cycle_scratchpad('c');
    }
    assert!(dir.path().join(format!("{DAILY_GAME_KEY}.json")).exists());

    let game = daily(Rc::new(FileStore::with_dir(dir.path())), &clock);
    assert_eq!(game.session().guesses().len(), 1);
    assert_eq!(game.session().mark('C'), jotto::session::Mark::Present);
}

#[test]
fn sqlite_store_keeps_game_between_runs() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("jotto.db");
    let clock = clock(2024, 1, 1);
    {
        let mut game = daily(Rc::new(SqliteStore::open(&path).unwrap()), &clock);
        game.submit_guess("crane").unwrap();
        game.submit_guess("badge").unwrap();
    }

    let game = daily(Rc::new(SqliteStore::open(&path).unwrap()), &clock);
    assert!(game.has_played_today());
    assert_eq!(game.stats().win_percentage(Mode::Daily), 100);
}

#[test]
fn tampered_finished_session_does_not_reopen() {
    let store = Rc::new(MemoryStore::new());
    let tampered = json!({
        "schemaVersion": 1,
        "mode": "daily",
        "targetWord": "BADGE",
        "guesses": [
            {"word": "BADGE", "matches": 5},
            {"word": "CRANE", "matches": 0},
            {"word": "CRANE", "matches": 5}
        ],
        "isGameOver": true,
        "isWon": false,
        "dateString": "2024-01-01"
    });
    store.set(DAILY_GAME_KEY, &tampered.to_string()).unwrap();

    let mut game = daily(store, &clock(2024, 1, 1));
    assert!(game.session().guesses().is_empty());
    assert_eq!(game.phase(), Phase::InProgress);

    let outcome = game.submit_guess("bacon").unwrap();
    assert_eq!(outcome.guess.matches(), 2);
    assert_eq!(game.session().guesses().len(), 1);
}
