use time::OffsetDateTime;

/// Wall-clock source used to stamp decoded records.
pub trait Clock {
    fn now(&self) -> OffsetDateTime;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> OffsetDateTime {
        (**self).now()
    }
}

/// Current UTC time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Always returns the same instant; used for deterministic replays and tests.
///
/// # Examples
/// ```
/// use mdptap_core::{Clock, FixedClock};
/// use time::OffsetDateTime;
///
/// let clock = FixedClock::new(OffsetDateTime::UNIX_EPOCH);
/// assert_eq!(clock.now(), OffsetDateTime::UNIX_EPOCH);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    at: OffsetDateTime,
}

impl FixedClock {
    pub fn new(at: OffsetDateTime) -> Self {
        Self { at }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.at
    }
}
