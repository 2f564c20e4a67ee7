use chrono::{Duration, NaiveDate, Utc};
use std::cell::Cell;
use std::rc::Rc;

/// Day key used in persisted records and for the daily puzzle, always UTC.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of "today" for day rollover and streaks.
pub trait Clock {
    fn today(&self) -> NaiveDate;
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }

    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Manually driven clock. Clones share the same date.
#[derive(Debug, Clone)]
pub struct FixedClock {
    date: Rc<Cell<NaiveDate>>,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: Rc::new(Cell::new(date)),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        self.date.set(date);
    }

    pub fn advance_days(&self, days: i64) {
        self.date.set(self.date.get() + Duration::days(days));
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.date.get()
    }

    fn now_millis(&self) -> i64 {
        self.date
            .get()
            .and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis())
            .unwrap_or_default()
    }
}

pub fn date_string(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(date_string: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_string, DATE_FORMAT).ok()
}

pub fn is_today(date_string: &str, today: NaiveDate) -> bool {
    parse_date(date_string) == Some(today)
}

pub fn is_yesterday(date_string: &str, today: NaiveDate) -> bool {
    parse_date(date_string) == today.pred_opt()
}

/// "2024-01-01" -> "Jan 1, 2024". Unparseable input is returned as is.
pub fn format_for_display(date_string: &str) -> String {
    match parse_date(date_string) {
        Some(date) => date.format("%b %-d, %Y").to_string(),
        None => date_string.to_string(),
    }
}

/// Stable 32-bit string hash: `h = h * 31 + unit` over UTF-16 code units with
/// two's-complement wrap, then the absolute value.
///
/// The daily word for a date is `daily[date_hash(date) % daily.len()]`. This
/// function is frozen: changing it reshuffles every daily puzzle ever shipped.
pub fn date_hash(s: &str) -> u32 {
    s.encode_utf16()
        .fold(0i32, |hash, unit| {
            hash.wrapping_shl(5)
                .wrapping_sub(hash)
                .wrapping_add(i32::from(unit))
        })
        .unsigned_abs()
}
