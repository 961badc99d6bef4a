use chrono::{DateTime, Duration, Utc};

/// Source of wall-clock timestamps for session start and completion.
///
/// Timer delays do not go through this; they run on the controller's own
/// timeline.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Pushes a stopped clock forward by `delta`; the system clock ignores it.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

/// Unix seconds at which test sessions start.
pub const SESSION_EPOCH: i64 = 1_700_000_000;

/// Start time shared by test sessions.
///
/// # Panics
///
/// Never in practice: `SESSION_EPOCH` is a valid timestamp.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(SESSION_EPOCH, 0).expect("session epoch is in range")
}

/// A clock stopped at [`fixed_now`], so summaries have stable durations.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_only_moves_when_advanced() {
        let mut clock = fixed_clock();
        assert_eq!(clock.now(), fixed_now());

        clock.advance(Duration::seconds(30));
        assert_eq!(clock.now(), fixed_now() + Duration::seconds(30));
    }

    #[test]
    fn session_epoch_is_a_utc_timestamp() {
        assert_eq!(fixed_now().timestamp(), SESSION_EPOCH);
        assert!(matches!(Clock::default(), Clock::System));
    }
}
