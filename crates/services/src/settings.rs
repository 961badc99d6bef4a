use std::time::Duration;

use crate::error::SettingsError;

/// Delays driving the card interaction timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingSettings {
    flip_delay: Duration,
    countdown_seconds: u32,
    countdown_tick: Duration,
    auto_close_delay: Duration,
}

impl Default for TimingSettings {
    /// 650 ms flip, 30 one-second countdown steps, 2 s auto-close.
    fn default() -> Self {
        Self {
            flip_delay: Duration::from_millis(650),
            countdown_seconds: 30,
            countdown_tick: Duration::from_secs(1),
            auto_close_delay: Duration::from_millis(2000),
        }
    }
}

impl TimingSettings {
    /// Creates custom timing settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if a delay is out of range or the countdown
    /// would never tick.
    pub fn new(
        flip_delay: Duration,
        countdown_seconds: u32,
        countdown_tick: Duration,
        auto_close_delay: Duration,
    ) -> Result<Self, SettingsError> {
        if flip_delay > Duration::from_secs(10) {
            return Err(SettingsError::InvalidFlipDelay);
        }
        if !(1..=600).contains(&countdown_seconds) {
            return Err(SettingsError::InvalidCountdownSeconds);
        }
        if countdown_tick.is_zero() {
            return Err(SettingsError::InvalidCountdownTick);
        }
        if auto_close_delay > Duration::from_secs(60) {
            return Err(SettingsError::InvalidAutoCloseDelay);
        }

        Ok(Self {
            flip_delay,
            countdown_seconds,
            countdown_tick,
            auto_close_delay,
        })
    }

    #[must_use]
    pub fn flip_delay(&self) -> Duration {
        self.flip_delay
    }

    /// Number of countdown steps before the forced answer.
    #[must_use]
    pub fn countdown_seconds(&self) -> u32 {
        self.countdown_seconds
    }

    #[must_use]
    pub fn countdown_tick(&self) -> Duration {
        self.countdown_tick
    }

    #[must_use]
    pub fn auto_close_delay(&self) -> Duration {
        self.auto_close_delay
    }
}
