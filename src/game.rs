use log::{debug, info, warn};
use std::collections::HashSet;
use std::rc::Rc;

use crate::calendar::{date_string, Clock};
use crate::events::{GameEvent, Observers};
use crate::record::{session_from_value, versioned};
use crate::service::{Membership, WordService};
use crate::session::{GameSession, Guess, Mode, Phase, SubmitError};
use crate::share::share_text;
use crate::stats::StatsTracker;
use crate::storage::{load_value, save_json, PersistenceGateway, DAILY_GAME_KEY, ZEN_GAME_KEY};
use crate::validate::{check_shape, GuessError, Widened};
use crate::word_source::WordSource;

impl Mode {
    pub fn storage_key(self) -> &'static str {
        match self {
            Mode::Daily => DAILY_GAME_KEY,
            Mode::Zen => ZEN_GAME_KEY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessOutcome {
    pub guess: Guess,
    pub is_over: bool,
    pub is_won: bool,
}

/// A pending zen word fetch, tagged with the generation it was started in.
pub struct ZenFetch<W> {
    generation: u64,
    source: WordSource<W>,
}

impl<W: WordService> ZenFetch<W> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub async fn run(self) -> ZenWord {
        let word = self.source.resolve_zen().await;
        ZenWord {
            generation: self.generation,
            word,
        }
    }
}

/// Result of a zen fetch, applied with [`Game::apply_zen_word`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZenWord {
    generation: u64,
    word: String,
}

impl ZenWord {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn word(&self) -> &str {
        &self.word
    }
}

/// The single active game: current mode and session, stats, and persistence.
///
/// Every mutation that should survive a reload is written through the store
/// before the matching event is published.
pub struct Game<W> {
    mode: Mode,
    session: GameSession,
    source: WordSource<W>,
    store: Rc<dyn PersistenceGateway>,
    clock: Rc<dyn Clock>,
    stats: StatsTracker,
    widen_dictionary: bool,
    admitted: HashSet<String>,
    generation: u64,
    observers: Observers,
}

impl<W: WordService> Game<W> {
    pub fn new(
        mode: Mode,
        source: WordSource<W>,
        store: Rc<dyn PersistenceGateway>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let stats = StatsTracker::load(Rc::clone(&store), Rc::clone(&clock));
        let mut game = Self {
            mode,
            session: GameSession::new(mode, date_string(clock.today()), clock.now_millis()),
            source,
            store,
            clock,
            stats,
            widen_dictionary: false,
            admitted: HashSet::new(),
            generation: 0,
            observers: Observers::default(),
        };
        game.session = game.load_session(mode);
        game.save_session();
        game
    }

    /// Let the remote dictionary admit words missing from the local list.
    pub fn with_widened_dictionary(mut self, widen: bool) -> Self {
        self.widen_dictionary = widen;
        self
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&GameEvent) + 'static,
    {
        self.observers.subscribe(listener);
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    pub fn stats(&self) -> &StatsTracker {
        &self.stats
    }

    pub fn word_source(&self) -> &WordSource<W> {
        &self.source
    }

    pub fn today(&self) -> String {
        date_string(self.clock.today())
    }

    /// Re-check the daily session against today's date. Returns true if it was replaced.
    pub fn activate(&mut self) -> bool {
        if self.mode != Mode::Daily || self.session.date_string() == self.today() {
            return false;
        }
        info!(
            "daily session from {} expired, starting {}",
            self.session.date_string(),
            self.today()
        );
        let fresh = self.fresh_session(Mode::Daily);
        self.replace_session(fresh);
        true
    }

    /// Switch to `mode`, restoring whatever was saved for it.
    pub fn switch_mode(&mut self, mode: Mode) {
        self.generation += 1;
        self.mode = mode;
        self.session = self.load_session(mode);
        self.save_session();
        self.observers.emit(GameEvent::SessionReplaced {
            mode,
            date_string: self.session.date_string().to_string(),
        });
    }

    /// Zen "play again": discard the current session and start a new one.
    ///
    /// Daily sessions are only ever replaced by the day rolling over, so this
    /// is refused in daily mode.
    pub fn play_again(&mut self) -> bool {
        if self.mode != Mode::Zen {
            return false;
        }
        let fresh = self.fresh_session(Mode::Zen);
        self.replace_session(fresh);
        true
    }

    /// Daily only: today's puzzle is finished.
    pub fn has_played_today(&self) -> bool {
        self.mode == Mode::Daily
            && self.session.date_string() == self.today()
            && self.session.is_over()
    }

    /// Daily: today's puzzle is still open. Zen: always.
    pub fn can_play(&self) -> bool {
        match self.mode {
            Mode::Daily => self.session.date_string() == self.today() && !self.session.is_over(),
            Mode::Zen => true,
        }
    }

    /// Start fetching a zen target if the current session still needs one.
    ///
    /// Any later mode switch, play again or new fetch invalidates the returned handle.
    pub fn begin_zen_fetch(&mut self) -> Option<ZenFetch<W>> {
        if self.mode != Mode::Zen || self.session.target_word().is_some() {
            return None;
        }
        self.generation += 1;
        self.session = self.session.awaiting_word();
        debug!("zen fetch started, generation {}", self.generation);
        Some(ZenFetch {
            generation: self.generation,
            source: self.source.clone(),
        })
    }

    /// Install a fetched zen word. Stale results are dropped; returns whether it applied.
    pub fn apply_zen_word(&mut self, fetched: ZenWord) -> bool {
        if fetched.generation != self.generation
            || self.mode != Mode::Zen
            || self.session.target_word().is_some()
        {
            debug!(
                "discarding stale zen word from generation {} (current {})",
                fetched.generation, self.generation
            );
            return false;
        }
        let word = match check_shape(&fetched.word) {
            Ok(word) => word,
            Err(e) => {
                warn!("ignoring malformed zen word {:?}: {e}", fetched.word);
                return false;
            }
        };
        self.session = self.session.resolve(&word);
        self.save_session();
        self.observers
            .emit(GameEvent::WordResolved { mode: Mode::Zen });
        true
    }

    /// Fetch and apply a zen word in one step, if one is needed.
    pub async fn ensure_zen_word(&mut self) -> bool {
        match self.begin_zen_fetch() {
            Some(fetch) => {
                let fetched = fetch.run().await;
                self.apply_zen_word(fetched)
            }
            None => false,
        }
    }

    /// Validate against the local dictionary, score and record a guess.
    pub fn submit_guess(&mut self, raw: &str) -> Result<GuessOutcome, SubmitError> {
        let dictionary = Widened {
            base: self.source.words(),
            admitted: &self.admitted,
        };
        let submission = self.session.submit(raw, &dictionary)?;

        self.session = submission.session;
        self.save_session();

        let outcome = GuessOutcome {
            guess: submission.guess.clone(),
            is_over: self.session.is_over(),
            is_won: self.session.is_won(),
        };

        self.observers.emit(GameEvent::GuessScored {
            guess: submission.guess,
            guesses_left: self.session.guesses_left(),
        });

        if let Some(done) = submission.completed {
            self.stats
                .record_completion(done.mode, done.won, done.guess_count);
            self.observers.emit(GameEvent::GameOver {
                mode: done.mode,
                won: done.won,
                guess_count: done.guess_count,
            });
            self.observers
                .emit(GameEvent::StatsUpdated { mode: done.mode });
        }

        Ok(outcome)
    }

    /// Like [`Game::submit_guess`], but when widening is enabled a word missing
    /// from the local list may be admitted by the remote dictionary.
    pub async fn submit_guess_checked(&mut self, raw: &str) -> Result<GuessOutcome, SubmitError> {
        match self.submit_guess(raw) {
            Err(SubmitError::Invalid(GuessError::UnknownWord)) if self.widen_dictionary => {
                let word = check_shape(raw)?;
                match self.source.lookup(&word).await {
                    Membership::Known => {
                        debug!("{word} admitted by remote dictionary");
                        self.admitted.insert(word);
                        self.submit_guess(raw)
                    }
                    Membership::NotFound | Membership::Unavailable => {
                        Err(GuessError::UnknownWord.into())
                    }
                }
            }
            other => other,
        }
    }

    pub fn cycle_scratchpad(&mut self, letter: char) {
        self.session = self.session.cycle(letter);
        self.save_session();
        self.observers.emit(GameEvent::ScratchpadChanged {
            letter: letter.to_ascii_uppercase(),
            mark: self.session.mark(letter),
        });
    }

    pub fn win_percentage(&self, mode: Mode) -> u32 {
        self.stats.win_percentage(mode)
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
        for mode in [Mode::Daily, Mode::Zen] {
            self.observers.emit(GameEvent::StatsUpdated { mode });
        }
    }

    pub fn share_text(&self) -> String {
        share_text(
            self.session.guesses(),
            self.session.is_won(),
            self.session.date_string(),
            self.session.mode(),
        )
    }

    fn fresh_session(&self, mode: Mode) -> GameSession {
        let today = self.today();
        let session = GameSession::new(mode, today.clone(), self.clock.now_millis());
        match mode {
            Mode::Daily => session.resolve(&self.source.resolve_daily(&today)),
            Mode::Zen => session,
        }
    }

    fn load_session(&self, mode: Mode) -> GameSession {
        let Some(value) = load_value(self.store.as_ref(), mode.storage_key()) else {
            return self.fresh_session(mode);
        };

        match session_from_value(value, mode) {
            Ok(saved) if mode == Mode::Daily && saved.date_string() != self.today() => {
                info!(
                    "daily session from {} expired, starting {}",
                    saved.date_string(),
                    self.today()
                );
                self.fresh_session(mode)
            }
            Ok(saved) if saved.target_word().is_none() => match mode {
                Mode::Daily => saved.resolve(&self.source.resolve_daily(saved.date_string())),
                Mode::Zen => saved.awaiting_word(),
            },
            Ok(saved) => saved,
            Err(e) => {
                warn!("discarding stored {mode} session: {e}");
                self.fresh_session(mode)
            }
        }
    }

    fn replace_session(&mut self, session: GameSession) {
        self.generation += 1;
        self.session = session;
        self.save_session();
        self.observers.emit(GameEvent::SessionReplaced {
            mode: self.mode,
            date_string: self.session.date_string().to_string(),
        });
    }

    fn save_session(&self) {
        match serde_json::to_value(&self.session) {
            Ok(value) => {
                save_json(self.store.as_ref(), self.mode.storage_key(), &versioned(value));
            }
            Err(e) => warn!("error serializing {} session: {e}", self.mode),
        }
    }
}
