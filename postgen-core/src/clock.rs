//! Source of the evaluation instant.

use chrono::{Local, NaiveDateTime};

/// Supplies "now" for staleness checks and the rendered footer.
///
/// Instants are naive local wall-clock times, matching the form timestamps.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Reads the local system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}
