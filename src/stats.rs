use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::calendar::{date_string, is_today, is_yesterday, Clock};
use crate::record::{stats_from_value, versioned};
use crate::session::{Mode, MAX_GUESSES};
use crate::storage::{load_value, save_json, PersistenceGateway, STATS_KEY};
use crate::util::{percentage, running_mean};

/// Aggregate outcomes for one mode. Streak fields are only maintained for daily.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRecord {
    pub games_played: u32,
    pub games_won: u32,
    pub guess_distribution: BTreeMap<u32, u32>,
    #[serde(default)]
    pub average_guesses: f64,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub max_streak: u32,
    #[serde(default)]
    pub last_played_date: Option<String>,
    #[serde(default)]
    pub last_won_date: Option<String>,
}

impl Default for StatsRecord {
    fn default() -> Self {
        Self {
            games_played: 0,
            games_won: 0,
            guess_distribution: (1..=MAX_GUESSES as u32).map(|n| (n, 0)).collect(),
            average_guesses: 0.0,
            current_streak: 0,
            max_streak: 0,
            last_played_date: None,
            last_won_date: None,
        }
    }
}

impl StatsRecord {
    pub fn win_percentage(&self) -> u32 {
        percentage(self.games_won, self.games_played)
    }

    /// Number of wins that took exactly `guess_count` guesses.
    pub fn wins_in(&self, guess_count: u32) -> u32 {
        self.guess_distribution
            .get(&guess_count)
            .copied()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Stats {
    pub daily: StatsRecord,
    pub zen: StatsRecord,
}

impl Stats {
    pub fn record(&self, mode: Mode) -> &StatsRecord {
        match mode {
            Mode::Daily => &self.daily,
            Mode::Zen => &self.zen,
        }
    }

    fn record_mut(&mut self, mode: Mode) -> &mut StatsRecord {
        match mode {
            Mode::Daily => &mut self.daily,
            Mode::Zen => &mut self.zen,
        }
    }
}

/// Maintains and persists per-mode stats from completion notices.
pub struct StatsTracker {
    store: Rc<dyn PersistenceGateway>,
    clock: Rc<dyn Clock>,
    stats: Stats,
}

impl StatsTracker {
    /// Load persisted stats, starting from zero if absent or unreadable.
    pub fn load(store: Rc<dyn PersistenceGateway>, clock: Rc<dyn Clock>) -> Self {
        let stats = match load_value(store.as_ref(), STATS_KEY).map(stats_from_value) {
            Some(Ok(stats)) => stats,
            Some(Err(e)) => {
                log::warn!("discarding stored stats: {e}");
                Stats::default()
            }
            None => Stats::default(),
        };

        Self {
            store,
            clock,
            stats,
        }
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn record(&self, mode: Mode) -> &StatsRecord {
        self.stats.record(mode)
    }

    /// Fold one finished game into the stats for `mode` and persist.
    pub fn record_completion(&mut self, mode: Mode, won: bool, guess_count: usize) {
        let today = self.clock.today();
        let today_str = date_string(today);
        let record = self.stats.record_mut(mode);

        record.games_played += 1;

        if won {
            record.games_won += 1;
            *record
                .guess_distribution
                .entry(guess_count as u32)
                .or_insert(0) += 1;
            record.average_guesses =
                running_mean(record.average_guesses, guess_count as f64, record.games_won);
        }

        if mode == Mode::Daily {
            if won {
                match record.last_won_date.as_deref() {
                    Some(last) if is_yesterday(last, today) => record.current_streak += 1,
                    // duplicate notification for a day already counted
                    Some(last) if is_today(last, today) => {}
                    _ => record.current_streak = 1,
                }
                record.max_streak = record.max_streak.max(record.current_streak);
                record.last_won_date = Some(today_str.clone());
            } else {
                record.current_streak = 0;
            }
            record.last_played_date = Some(today_str);
        }

        info!(
            "{mode} game recorded: won={won} guesses={guess_count} played={} streak={}",
            record.games_played, record.current_streak
        );
        self.persist();
    }

    /// Rounded win rate in percent; 0 before any game is played.
    pub fn win_percentage(&self, mode: Mode) -> u32 {
        self.record(mode).win_percentage()
    }

    pub fn reset(&mut self) {
        self.stats = Stats::default();
        debug!("stats reset");
        self.persist();
    }

    fn persist(&self) {
        match serde_json::to_value(&self.stats) {
            Ok(value) => {
                save_json(self.store.as_ref(), STATS_KEY, &versioned(value));
            }
            Err(e) => log::warn!("error serializing stats: {e}"),
        }
    }
}
