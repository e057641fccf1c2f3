//! Tunables shared by the journal holders.

use std::time::Duration;

/// Idle delay before a daily entry edit is committed.
pub const DAILY_AUTOSAVE_DELAY: Duration = Duration::from_millis(800);
/// Idle delay before a quarterly review edit is committed.
pub const QUARTERLY_AUTOSAVE_DELAY: Duration = Duration::from_millis(1000);

/// Debounce delays per holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveConfig {
    pub daily_delay: Duration,
    pub quarterly_delay: Duration,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            daily_delay: DAILY_AUTOSAVE_DELAY,
            quarterly_delay: QUARTERLY_AUTOSAVE_DELAY,
        }
    }
}
