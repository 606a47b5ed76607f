//! Time source for expiration checks and access timestamps.
//!
//! All time is read in one fixed civil offset (no timezone database). The
//! engine compares instants, so the offset only affects how timestamps are
//! rendered in statistics.

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Offset used when nothing else is configured: UTC+05:30.
pub const DEFAULT_OFFSET_MINUTES: i32 = 330;

/// Supplies the current time.
pub trait Clock: Send + Sync {
    /// Current time in the clock's civil offset.
    fn now(&self) -> DateTime<FixedOffset>;

    fn offset(&self) -> FixedOffset {
        *self.now().offset()
    }

    /// Current instant, for storage and comparisons.
    fn now_utc(&self) -> DateTime<Utc> {
        self.now().with_timezone(&Utc)
    }
}

/// Builds a fixed offset from a minute count east of UTC.
///
/// Returns `None` when the offset is a day or more away from UTC.
pub fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
}

/// Wall clock reading the system time.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    fn offset(&self) -> FixedOffset {
        self.offset
    }
}

/// Clock that only moves when told to.
///
/// Lets tests step across expiry windows deterministically. Millisecond
/// resolution.
#[derive(Debug)]
pub struct ManualClock {
    offset: FixedOffset,
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            offset,
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.millis.store(at.timestamp_millis(), Ordering::SeqCst);
    }

    pub fn advance(&self, by: TimeDelta) {
        self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<FixedOffset> {
        let millis = self.millis.load(Ordering::SeqCst);
        DateTime::from_timestamp_millis(millis)
            .unwrap_or_default()
            .with_timezone(&self.offset)
    }

    fn offset(&self) -> FixedOffset {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_offset_from_minutes() {
        let ist = offset_from_minutes(DEFAULT_OFFSET_MINUTES).unwrap();
        assert_eq!(ist.local_minus_utc(), 19_800);

        assert_eq!(offset_from_minutes(-300).unwrap().local_minus_utc(), -18_000);
        assert!(offset_from_minutes(24 * 60).is_none());
        assert!(offset_from_minutes(i32::MAX).is_none());
    }

    #[test]
    fn test_system_clock_uses_configured_offset() {
        let offset = offset_from_minutes(DEFAULT_OFFSET_MINUTES).unwrap();
        let clock = SystemClock::new(offset);

        assert_eq!(*clock.now().offset(), offset);
        assert_eq!(clock.offset(), offset);
    }

    #[test]
    fn test_manual_clock_advances() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let clock = ManualClock::new(start, FixedOffset::east_opt(0).unwrap());

        assert_eq!(clock.now_utc(), start);

        clock.advance(TimeDelta::minutes(31));
        assert_eq!(clock.now_utc(), start + TimeDelta::minutes(31));

        clock.set(start);
        assert_eq!(clock.now_utc(), start);
    }

    #[test]
    fn test_manual_clock_renders_in_offset() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let clock = ManualClock::new(start, offset_from_minutes(330).unwrap());

        assert_eq!(
            clock.now().format("%Y-%m-%d %H:%M:%S").to_string(),
            "2024-03-01 17:30:00"
        );
    }
}
