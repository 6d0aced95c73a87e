//! Round clock: countdown timer and simulated day counter.
//!
//! The clock is the single source of truth for a round's temporal state. It
//! counts `time_remaining` down from the round length and tracks which
//! simulated day the warehouse is on.
//!
//! All arithmetic is checked or saturating; advancing an expired clock is an
//! error rather than a silent wrap.

use crate::rules::ROUND_SECONDS;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// The timer already reached zero.
    #[error("round clock already expired")]
    Expired,

    /// Invalid clock parameters (e.g. a zero-length round).
    #[error("invalid clock configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the parameters.
        reason: String,
    },
}

/// Outcome of a single [`RoundClock::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockTick {
    /// Time is left on the clock.
    Running {
        /// Seconds left after this tick.
        remaining: u32,
    },
    /// This tick took the timer to zero.
    Expired,
}

/// Countdown timer for one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundClock {
    /// Total ticks in the round.
    round_length: u32,

    /// Ticks left before the round ends.
    time_remaining: u32,

    /// Current simulated day, starting at 1.
    day: u32,
}

impl RoundClock {
    /// Create a clock for a round of `round_length` ticks.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `round_length` is 0.
    pub fn new(round_length: u32) -> Result<Self, ClockError> {
        Self::from_parts(round_length, round_length, 1)
    }

    /// The standard 30-second round.
    pub const fn standard() -> Self {
        Self {
            round_length: ROUND_SECONDS,
            time_remaining: ROUND_SECONDS,
            day: 1,
        }
    }

    /// Create a clock from explicit parameters (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `round_length` or `day` is 0,
    /// or if `time_remaining` exceeds `round_length`.
    pub fn from_parts(round_length: u32, time_remaining: u32, day: u32) -> Result<Self, ClockError> {
        if round_length == 0 {
            return Err(ClockError::InvalidConfig {
                reason: "round_length must be at least 1".to_owned(),
            });
        }
        if time_remaining > round_length {
            return Err(ClockError::InvalidConfig {
                reason: format!(
                    "time_remaining {time_remaining} exceeds round_length {round_length}"
                ),
            });
        }
        if day == 0 {
            return Err(ClockError::InvalidConfig {
                reason: "day starts at 1".to_owned(),
            });
        }
        Ok(Self {
            round_length,
            time_remaining,
            day,
        })
    }

    /// Count the timer down by one tick.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Expired`] if the timer is already at zero.
    pub fn advance(&mut self) -> Result<ClockTick, ClockError> {
        self.time_remaining = self
            .time_remaining
            .checked_sub(1)
            .ok_or(ClockError::Expired)?;
        if self.time_remaining == 0 {
            Ok(ClockTick::Expired)
        } else {
            Ok(ClockTick::Running {
                remaining: self.time_remaining,
            })
        }
    }

    /// Move on to the next simulated day. Returns the new day number.
    pub const fn next_day(&mut self) -> u32 {
        self.day = self.day.saturating_add(1);
        self.day
    }

    /// Ticks left in the round.
    pub const fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    /// Current simulated day.
    pub const fn day(&self) -> u32 {
        self.day
    }

    /// Total ticks in the round.
    pub const fn round_length(&self) -> u32 {
        self.round_length
    }

    /// Ticks already elapsed.
    pub const fn elapsed(&self) -> u32 {
        self.round_length.saturating_sub(self.time_remaining)
    }

    /// Whether the timer has reached zero.
    pub const fn is_expired(&self) -> bool {
        self.time_remaining == 0
    }
}

impl Default for RoundClock {
    fn default() -> Self {
        Self::standard()
    }
}
