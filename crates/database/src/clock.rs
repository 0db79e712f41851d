//! Source of "now" for date validation and the retention cutoff.

use chrono::{Local, NaiveDateTime};

/// Supplies the current wall-clock instant.
///
/// Appointments are booked in shop-local time, so the clock hands out
/// naive local timestamps.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> NaiveDateTime;
}

/// The system's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at a given instant.
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

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}
