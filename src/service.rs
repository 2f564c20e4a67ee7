//! Remote word service seam: dictionary lookups and random word candidates.
//!
//! The game never depends on the service being reachable. Every caller has a
//! local fallback, and failures are only logged.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

/// Client-side budget for outgoing requests.
pub const MAX_REQUESTS_PER_WINDOW: usize = 10;
pub const RATE_WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("word service unavailable: {0}")]
    Unavailable(String),
    #[error("word service returned status {0}")]
    Status(u16),
    #[error("word service request timed out")]
    Timeout,
}

/// Outcome of a remote dictionary check. Only `Known` carries weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Known,
    NotFound,
    Unavailable,
}

#[allow(async_fn_in_trait)]
pub trait WordService {
    /// Whether the service recognizes `word` (uppercase, 5 letters).
    async fn lookup(&self, word: &str) -> Result<bool, ServiceError>;

    /// Words matching `pattern` (`?` = any letter), at most `max` of them.
    async fn random_candidates(
        &self,
        pattern: &str,
        max: usize,
    ) -> Result<Vec<String>, ServiceError>;
}

/// Service used when no network collaborator is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineService;

impl WordService for OfflineService {
    async fn lookup(&self, _word: &str) -> Result<bool, ServiceError> {
        Err(ServiceError::Unavailable("offline".into()))
    }

    async fn random_candidates(
        &self,
        _pattern: &str,
        _max: usize,
    ) -> Result<Vec<String>, ServiceError> {
        Err(ServiceError::Unavailable("offline".into()))
    }
}

/// Rolling-window limiter: at most `max_requests` acquisitions per `window`.
/// Callers over budget sleep until the oldest stamp leaves the window.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    stamps: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1),
            window,
            stamps: Mutex::new(VecDeque::with_capacity(max_requests)),
        }
    }

    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut stamps = self.stamps.lock().await;
                let now = Instant::now();
                while stamps
                    .front()
                    .is_some_and(|t| now.duration_since(*t) >= self.window)
                {
                    stamps.pop_front();
                }

                if stamps.len() < self.max_requests {
                    stamps.push_back(now);
                    return;
                }

                match stamps.front() {
                    Some(oldest) => self.window.saturating_sub(now.duration_since(*oldest)),
                    None => Duration::ZERO,
                }
            };

            log::debug!("word service rate limit reached, waiting {wait:?}");
            sleep(wait).await;
        }
    }

    /// Requests admitted within the current window.
    #[cfg(test)]
    pub async fn in_flight(&self) -> usize {
        let stamps = self.stamps.lock().await;
        let now = Instant::now();
        stamps
            .iter()
            .filter(|t| now.duration_since(**t) < self.window)
            .count()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(MAX_REQUESTS_PER_WINDOW, RATE_WINDOW)
    }
}

/// Wraps a service so every request first passes the rate limiter.
#[derive(Debug)]
pub struct RateLimited<S> {
    inner: S,
    limiter: RateLimiter,
}

impl<S: WordService> RateLimited<S> {
    pub fn new(inner: S) -> Self {
        Self::with_limiter(inner, RateLimiter::default())
    }

    pub fn with_limiter(inner: S, limiter: RateLimiter) -> Self {
        Self { inner, limiter }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: WordService> WordService for RateLimited<S> {
    async fn lookup(&self, word: &str) -> Result<bool, ServiceError> {
        self.limiter.acquire().await;
        self.inner.lookup(word).await
    }

    async fn random_candidates(
        &self,
        pattern: &str,
        max: usize,
    ) -> Result<Vec<String>, ServiceError> {
        self.limiter.acquire().await;
        self.inner.random_candidates(pattern, max).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingService {
        calls: AtomicUsize,
    }

    impl WordService for CountingService {
        async fn lookup(&self, _word: &str) -> Result<bool, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }

        async fn random_candidates(
            &self,
            _pattern: &str,
            _max: usize,
        ) -> Result<Vec<String>, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec!["CRANE".into()])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_limiter_admits_burst_up_to_limit() {
        let limiter = RateLimiter::default();
        let start = Instant::now();
        for _ in 0..MAX_REQUESTS_PER_WINDOW {
            limiter.acquire().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(limiter.in_flight().await, MAX_REQUESTS_PER_WINDOW);
    }

    #[tokio::test(start_paused = true)]
    async fn test_limiter_suspends_eleventh_request() {
        let limiter = RateLimiter::default();
        let start = Instant::now();
        for _ in 0..=MAX_REQUESTS_PER_WINDOW {
            limiter.acquire().await;
        }
        assert!(start.elapsed() >= RATE_WINDOW);
    }

    #[tokio::test(start_paused = true)]
    async fn test_limiter_window_rolls() {
        let limiter = RateLimiter::new(2, Duration::from_millis(100));
        limiter.acquire().await;
        tokio::time::advance(Duration::from_millis(60)).await;
        limiter.acquire().await;

        // first stamp expires at t=100, the third request waits for it
        let before = Instant::now();
        limiter.acquire().await;
        assert!(before.elapsed() >= Duration::from_millis(40));
        assert!(before.elapsed() < Duration::from_millis(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_service_delegates() {
        let service = RateLimited::with_limiter(
            CountingService::default(),
            RateLimiter::new(3, Duration::from_secs(1)),
        );
        let start = Instant::now();
        for _ in 0..6 {
            assert!(service.lookup("CRANE").await.unwrap());
        }
        assert_eq!(service.inner().calls.load(Ordering::SeqCst), 6);
        assert!(start.elapsed() >= Duration::from_secs(1));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_offline_service_fails() {
        assert!(OfflineService.lookup("CRANE").await.is_err());
        assert!(OfflineService.random_candidates("?????", 10).await.is_err());
    }
}
