//! Time source abstraction
//!
//! Every lifecycle decision is a pure function of current time plus entity
//! fields, so the services take the clock as a dependency instead of calling
//! `Utc::now()` inline. Tests substitute a manually-driven clock.

use chrono::{DateTime, Utc};

/// Source of the current time
pub trait Clock: Send + Sync {
    /// The current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
