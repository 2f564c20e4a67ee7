// Zen mode with a scripted word service: fetch races, fallbacks and
// dictionary widening.

use chrono::NaiveDate;
use jotto::calendar::FixedClock;
use jotto::service::{ServiceError, WordService};
use jotto::storage::{MemoryStore, PersistenceGateway, ZEN_GAME_KEY};
use jotto::word_source::WordSource;
use jotto::words::WordList;
use jotto::{Game, GuessError, Mode, Phase, SubmitError};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

/// Serves a fixed candidate list and knows a fixed set of extra words.
struct ScriptedService {
    candidates: Vec<String>,
    known: Vec<String>,
    online: bool,
}

impl ScriptedService {
    fn new(candidates: &[&str], known: &[&str]) -> Self {
        Self {
            candidates: candidates.iter().map(|s| s.to_string()).collect(),
            known: known.iter().map(|s| s.to_string()).collect(),
            online: true,
        }
    }

    fn offline() -> Self {
        Self {
            online: false,
            ..Self::new(&[], &[])
        }
    }
}

impl WordService for ScriptedService {
    async fn lookup(&self, word: &str) -> Result<bool, ServiceError> {
        if !self.online {
            return Err(ServiceError::Status(503));
        }
        Ok(self.known.iter().any(|k| k.eq_ignore_ascii_case(word)))
    }

    async fn random_candidates(
        &self,
        _pattern: &str,
        _max: usize,
    ) -> Result<Vec<String>, ServiceError> {
        if !self.online {
            return Err(ServiceError::Status(503));
        }
        Ok(self.candidates.clone())
    }
}

fn zen(service: ScriptedService, store: Rc<MemoryStore>) -> Game<ScriptedService> {
    let clock = FixedClock::new(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
    let source = WordSource::new(Arc::new(WordList::english()), Arc::new(service));
    Game::new(Mode::Zen, source, store, Rc::new(clock))
}

#[tokio::test]
async fn zen_game_uses_fetched_word() {
    let store = Rc::new(MemoryStore::new());
    let mut game = zen(ScriptedService::new(&["crane"], &[]), store.clone());
    assert_eq!(game.phase(), Phase::Uninitialized);

    assert!(game.ensure_zen_word().await);
    assert_eq!(game.session().target_word(), Some("CRANE"));

    let outcome = game.submit_guess("trace").unwrap();
    assert_eq!(outcome.guess.matches(), 4);
    let outcome = game.submit_guess("crane").unwrap();
    assert!(outcome.is_won);
    assert_eq!(
        game.share_text(),
        "Cozy Jotto Zen Mode\nSolved in 2/10 ☕\n\n🟢🟢🟢🟢⚪\n🟢🟢🟢🟢🟢"
    );

    let zen_stats = game.stats().record(Mode::Zen);
    assert_eq!(zen_stats.games_won, 1);
    assert_eq!(zen_stats.current_streak, 0);

    assert!(game.play_again());
    assert_eq!(game.phase(), Phase::Uninitialized);
    assert!(store.get(ZEN_GAME_KEY).unwrap().is_some());
}

#[tokio::test]
async fn unusable_candidates_fall_back_to_local_list() {
    let store = Rc::new(MemoryStore::new());
    let mut game = zen(ScriptedService::new(&["geese", "llama", "abc"], &[]), store);
    assert!(game.ensure_zen_word().await);

    let target = game.session().target_word().unwrap().to_string();
    assert!(game
        .word_source()
        .words()
        .daily_words()
        .contains(&target));
}

#[tokio::test]
async fn fetch_finishing_after_mode_switch_is_discarded() {
    let store = Rc::new(MemoryStore::new());
    let mut game = zen(ScriptedService::new(&["crane"], &[]), store);

    let fetch = game.begin_zen_fetch().unwrap();
    assert_eq!(game.phase(), Phase::AwaitingWord);
    assert_eq!(game.submit_guess("trace"), Err(SubmitError::NotReady));

    game.switch_mode(Mode::Daily);
    let late = fetch.run().await;
    assert!(!game.apply_zen_word(late));
    assert_eq!(game.mode(), Mode::Daily);

    // switching back resumes the unfinished zen session, still waiting
    game.switch_mode(Mode::Zen);
    assert_eq!(game.phase(), Phase::AwaitingWord);
    assert!(game.ensure_zen_word().await);
    assert_eq!(game.session().target_word(), Some("CRANE"));
}

#[tokio::test]
async fn newer_fetch_wins_over_older() {
    let store = Rc::new(MemoryStore::new());
    let mut game = zen(ScriptedService::new(&["crane"], &[]), store);

    let first = game.begin_zen_fetch().unwrap();
    assert!(game.play_again());
    let second = game.begin_zen_fetch().unwrap();
    assert!(second.generation() > first.generation());

    let first = first.run().await;
    let second = second.run().await;
    assert!(!game.apply_zen_word(first));
    assert!(game.apply_zen_word(second));
}

#[tokio::test]
async fn remote_dictionary_admits_words_when_widened() {
    let store = Rc::new(MemoryStore::new());
    let mut game = zen(ScriptedService::new(&["crane"], &["QUERN"]), store)
        .with_widened_dictionary(true);
    game.ensure_zen_word().await;

    assert_eq!(
        game.submit_guess("quern"),
        Err(SubmitError::Invalid(GuessError::UnknownWord))
    );
    let outcome = game.submit_guess_checked("quern").await.unwrap();
    assert_eq!(outcome.guess.matches(), 3);

    // still unknown to both dictionaries
    assert_eq!(
        game.submit_guess_checked("xqzvw").await,
        Err(SubmitError::Invalid(GuessError::UnknownWord))
    );
    // shape errors never reach the service
    assert_eq!(
        game.submit_guess_checked("qu3rn").await,
        Err(SubmitError::Invalid(GuessError::InvalidCharacters))
    );
}

#[tokio::test]
async fn widening_is_off_by_default_and_tolerates_outages() {
    let store = Rc::new(MemoryStore::new());
    let mut game = zen(ScriptedService::new(&["crane"], &["QUERN"]), store);
    game.ensure_zen_word().await;
    assert_eq!(
        game.submit_guess_checked("quern").await,
        Err(SubmitError::Invalid(GuessError::UnknownWord))
    );

    let store = Rc::new(MemoryStore::new());
    let mut offline = zen(ScriptedService::offline(), store).with_widened_dictionary(true);
    assert!(offline.ensure_zen_word().await);
    assert_eq!(
        offline.submit_guess_checked("quern").await,
        Err(SubmitError::Invalid(GuessError::UnknownWord))
    );
}

#[tokio::test]
async fn observers_see_word_resolution() {
    let store = Rc::new(MemoryStore::new());
    let mut game = zen(ScriptedService::new(&["crane"], &[]), store);
    let resolved = Rc::new(Cell::new(0));
    let seen = resolved.clone();
    game.subscribe(move |event| {
        if matches!(event, jotto::events::GameEvent::WordResolved { .. }) {
            seen.set(seen.get() + 1);
        }
    });

    game.ensure_zen_word().await;
    assert_eq!(resolved.get(), 1);
}
