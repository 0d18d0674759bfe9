//! Repetition budget for repeating alarms.
//!
//! Repeats stop at midnight: a nag reminder may only repeat as many
//! times as fit between its start time and the next local midnight.
//! Integer division truncates, so an interval that exactly divides the
//! remaining time yields exactly that many repetitions, never one more.

use time::UtcOffset;

use super::day::next_local_midnight;

/// Number of whole `interval_ms` steps between `start_ms` and the next
/// local midnight after it.
///
/// Zero for a non-positive interval or when the midnight boundary is not
/// strictly ahead of `start_ms`.
pub fn repetitions_until_midnight(start_ms: i64, interval_ms: i64, offset: UtcOffset) -> u32 {
    if interval_ms <= 0 {
        return 0;
    }
    let diff = next_local_midnight(start_ms, offset) - start_ms;
    if diff <= 0 {
        return 0;
    }
    // diff is under a day and interval_ms is at least 1, so this fits.
    (diff / interval_ms) as u32
}
