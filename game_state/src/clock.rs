//! Simulated system clock - the in-fiction time shown on the desktop.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// The in-fiction clock of the simulated machine.
///
/// This clock has nothing to do with wall time: it starts at the moment the
/// player first powers the laptop on and is advanced explicitly by the session
/// loop (one minute per tick on the desktop).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemClock {
    /// Whether the machine has finished its boot sequence.
    pub booted: bool,
    pub time: NaiveDateTime,
}

impl SystemClock {
    /// The moment the story begins: the laptop is powered on for the first time.
    pub fn story_start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 11, 3)
            .expect("valid story date")
            .and_hms_opt(14, 37, 0)
            .expect("valid story time")
    }

    /// Create a clock at the story start, not yet booted.
    pub fn new() -> Self {
        Self {
            booted: false,
            time: Self::story_start(),
        }
    }

    /// Mark the boot sequence as finished.
    pub fn boot(&mut self) {
        self.booted = true;
    }

    /// Advance the clock by whole minutes.
    pub fn advance_minutes(&mut self, minutes: u32) {
        self.advance(Duration::minutes(i64::from(minutes)));
    }

    /// Advance the clock by an arbitrary duration.
    pub fn advance(&mut self, duration: Duration) {
        self.time += duration;
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}
