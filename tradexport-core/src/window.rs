//! Chunk window — an optional half-open `[since, before)` range in epoch days.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

/// Days since 1970-01-01; the time of day is not representable.
pub fn epoch_day(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce()) - UNIX_EPOCH_DAYS_FROM_CE
}

/// Time range a trade import is restricted to. Either bound may be absent,
/// meaning unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkWindow {
    /// Inclusive lower bound, epoch days.
    pub since: Option<i64>,
    /// Exclusive upper bound, epoch days.
    pub before: Option<i64>,
}

impl ChunkWindow {
    pub const UNBOUNDED: ChunkWindow = ChunkWindow {
        since: None,
        before: None,
    };

    pub fn new(since: Option<i64>, before: Option<i64>) -> Self {
        Self { since, before }
    }

    pub fn from_dates(since: Option<NaiveDate>, before: Option<NaiveDate>) -> Self {
        Self {
            since: since.map(epoch_day),
            before: before.map(epoch_day),
        }
    }

    /// A window whose upper bound does not lie after its lower bound selects nothing.
    pub fn is_empty(&self) -> bool {
        matches!((self.since, self.before), (Some(s), Some(b)) if b <= s)
    }

    /// Resolve to a concrete `[start, end)` millisecond range.
    ///
    /// A missing `before` means `now`, a missing `since` means `lookback_days`
    /// before the resolved end. `before` is clamped to `now`. Returns `None`
    /// when nothing can match.
    pub fn millis_range(&self, now: DateTime<Utc>, lookback_days: i64) -> Option<(i64, i64)> {
        if self.is_empty() {
            return None;
        }
        let now_ms = now.timestamp_millis();
        let end = self
            .before
            .map(|d| d.saturating_mul(MILLIS_PER_DAY).min(now_ms))
            .unwrap_or(now_ms);
        let start = self
            .since
            .map(|d| d.saturating_mul(MILLIS_PER_DAY))
            .unwrap_or_else(|| end.saturating_sub(lookback_days.saturating_mul(MILLIS_PER_DAY)));
        (start < end).then_some((start, end))
    }
}

/// Split `[start, end)` into consecutive half-open spans no longer than `max_span`.
pub fn split_span(start: i64, end: i64, max_span: i64) -> Vec<(i64, i64)> {
    let mut spans = Vec::new();
    if max_span <= 0 {
        return spans;
    }
    let mut lo = start;
    while lo < end {
        let hi = lo.saturating_add(max_span).min(end);
        spans.push((lo, hi));
        lo = hi;
    }
    spans
}
