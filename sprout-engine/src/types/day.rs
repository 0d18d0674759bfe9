//! Calendar-day arithmetic over raw epoch milliseconds.
//!
//! Streak accounting compares *epoch days*: the timestamp divided by the
//! length of a day, with no timezone normalization. This matches the
//! persisted history produced by earlier releases, so it must not be
//! localized — two completions land on the same "day" exactly when their
//! UTC epoch-day index matches, even if the device's local calendar
//! disagrees around a DST transition. See the `local_evening_edge` test.
//!
//! The midnight *cutoff* used for repetition budgets is a different
//! concern: it is a wall-clock boundary in the device's timezone, so it
//! takes an explicit [`UtcOffset`].

use time::{OffsetDateTime, UtcOffset};

pub const MILLIS_PER_SECOND: i64 = 1_000;
pub const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
pub const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
pub const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

/// Epoch-day index of a millisecond timestamp.
///
/// Euclidean division keeps pre-1970 timestamps on the correct side of
/// each day boundary.
pub fn epoch_day(ts_ms: i64) -> i64 {
    ts_ms.div_euclid(MILLIS_PER_DAY)
}

/// Whole epoch days from `earlier_ms` to `later_ms`. Negative when the
/// timestamps are out of order.
pub fn days_between(earlier_ms: i64, later_ms: i64) -> i64 {
    epoch_day(later_ms) - epoch_day(earlier_ms)
}

/// 00:00:00.000 of the calendar day following `ts_ms`, in the timezone
/// given by `offset`, as epoch milliseconds.
///
/// Returns `ts_ms` itself when the timestamp is outside the representable
/// datetime range, which collapses any dependent budget to zero.
pub fn next_local_midnight(ts_ms: i64, offset: UtcOffset) -> i64 {
    let Ok(utc) = OffsetDateTime::from_unix_timestamp_nanos(i128::from(ts_ms) * 1_000_000) else {
        return ts_ms;
    };
    let local = utc.to_offset(offset);
    let Some(next_day) = local.date().next_day() else {
        return ts_ms;
    };
    let midnight = next_day.midnight().assume_offset(offset);
    (midnight.unix_timestamp_nanos() / 1_000_000) as i64
}
