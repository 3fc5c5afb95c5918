//! Fixed clock returning a pinned instant.

use chrono::{DateTime, TimeZone, Utc};

use crate::ports::clock::Clock;

/// Clock pinned to a single instant, for deterministic timestamps.
#[derive(Debug, Clone)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    /// Creates a clock pinned to the given instant.
    #[must_use]
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::at(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).single().unwrap_or_else(Utc::now))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_pinned_instant() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let clock = FixedClock::at(instant);
        assert_eq!(clock.now(), instant);
        assert_eq!(clock.now(), instant);
    }
}
