//! # Raffle Desk Testing
//!
//! Testing utilities for reducers built on `raffle-desk-core`:
//!
//! - [`ReducerTest`]: Given-When-Then harness for a single reducer step
//! - [`assertions`]: helpers for inspecting returned effects
//! - [`mocks`]: deterministic environment pieces such as [`FixedClock`]

use chrono::{DateTime, Utc};
use raffle_desk_core::environment::Clock;


pub use reducer_test::{ReducerTest, assertions};

/// Deterministic environment implementations
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// # Example
    ///
    /// ```
    /// use raffle_desk_testing::mocks::FixedClock;
    /// use raffle_desk_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Fixed clock pinned to 2025-01-01 00:00:00 UTC
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::days(20_089))
    }
}

pub use mocks::{FixedClock, test_clock};
