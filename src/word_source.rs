use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::calendar::date_hash;
use crate::score::distinct_letters;
use crate::service::{Membership, ServiceError, WordService};
use crate::words::{WordList, WORD_LENGTH};

pub const ZEN_PATTERN: &str = "?????";
pub const ZEN_MAX_CANDIDATES: usize = 1000;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolves target words: daily from the date, zen from the word service
/// with a local fallback.
pub struct WordSource<W> {
    words: Arc<WordList>,
    service: Arc<W>,
    fetch_timeout: Duration,
    lookups: Arc<Mutex<HashMap<String, bool>>>,
}

impl<W> Clone for WordSource<W> {
    fn clone(&self) -> Self {
        Self {
            words: Arc::clone(&self.words),
            service: Arc::clone(&self.service),
            fetch_timeout: self.fetch_timeout,
            lookups: Arc::clone(&self.lookups),
        }
    }
}

impl<W: WordService> WordSource<W> {
    pub fn new(words: Arc<WordList>, service: Arc<W>) -> Self {
        Self {
            words,
            service,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            lookups: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn words(&self) -> &WordList {
        &self.words
    }

    /// The daily word for `date_string`. Pure and offline; never cached.
    pub fn resolve_daily(&self, date_string: &str) -> String {
        let daily = self.words.daily_words();
        let index = date_hash(date_string) as usize % daily.len();
        daily[index].clone()
    }

    pub fn random_local(&self) -> String {
        self.words.random_daily(&mut rand::thread_rng()).to_string()
    }

    /// A random zen word. Never fails: any service problem falls back to the local list.
    pub async fn resolve_zen(&self) -> String {
        match self.fetch_zen_candidates().await {
            Ok(candidates) => match pick_candidate(&candidates, &mut rand::thread_rng()) {
                Some(word) => {
                    debug!("zen word fetched from service ({} candidates)", candidates.len());
                    return word;
                }
                None => warn!("word service returned no usable zen words, using local list"),
            },
            Err(e) => warn!("failed to fetch zen word, using local list: {e}"),
        }
        self.random_local()
    }

    async fn fetch_zen_candidates(&self) -> Result<Vec<String>, ServiceError> {
        tokio::time::timeout(
            self.fetch_timeout,
            self.service.random_candidates(ZEN_PATTERN, ZEN_MAX_CANDIDATES),
        )
        .await
        .map_err(|_| ServiceError::Timeout)?
    }

    /// Remote dictionary check, cached per process. Failures are not cached.
    pub async fn lookup(&self, word: &str) -> Membership {
        let key = word.to_uppercase();
        if let Some(known) = self.cached_lookup(&key) {
            return membership(known);
        }

        let result = tokio::time::timeout(self.fetch_timeout, self.service.lookup(&key))
            .await
            .map_err(|_| ServiceError::Timeout)
            .and_then(|r| r);

        match result {
            Ok(known) => {
                if let Ok(mut cache) = self.lookups.lock() {
                    cache.insert(key, known);
                }
                membership(known)
            }
            Err(e) => {
                warn!("dictionary lookup failed, falling back to local list: {e}");
                Membership::Unavailable
            }
        }
    }

    fn cached_lookup(&self, key: &str) -> Option<bool> {
        self.lookups.lock().ok()?.get(key).copied()
    }
}

fn membership(known: bool) -> Membership {
    if known {
        Membership::Known
    } else {
        Membership::NotFound
    }
}

/// Uniform pick among candidates made of five distinct ASCII letters.
pub fn pick_candidate<R: Rng + ?Sized>(candidates: &[String], rng: &mut R) -> Option<String> {
    let usable: Vec<String> = candidates
        .iter()
        .map(|w| w.trim().to_ascii_uppercase())
        .filter(|w| {
            w.len() == WORD_LENGTH
                && w.bytes().all(|b| b.is_ascii_uppercase())
                && distinct_letters(w) == WORD_LENGTH
        })
        .collect();
    usable.choose(rng).cloned()
}
