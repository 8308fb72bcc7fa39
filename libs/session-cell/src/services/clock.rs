use tokio::time::Instant;

use shared_database::InFlightCounter;

use crate::models::{IdleSettings, IdleState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deadline {
    Warning,
    Logout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockTransition {
    /// A call was in flight, so the deadline counted as activity.
    Deferred,
    WarningShown,
    LoggedOut,
}

/// Idle bookkeeping without any timers of its own: callers pass `now` in
/// and ask for the next deadline. Both deadlines hang off one reset point,
/// so they can only ever move together.
#[derive(Debug)]
pub struct ActivityClock {
    settings: IdleSettings,
    in_flight: InFlightCounter,
    state: IdleState,
    reset_at: Instant,
    resets: u64,
}

impl ActivityClock {
    pub fn new(settings: IdleSettings, in_flight: InFlightCounter, now: Instant) -> Self {
        Self {
            settings,
            in_flight,
            state: IdleState::Active,
            reset_at: now,
            resets: 0,
        }
    }

    pub fn state(&self) -> IdleState {
        self.state
    }

    pub fn reset_at(&self) -> Instant {
        self.reset_at
    }

    /// How many times the deadlines have been rearmed since creation.
    pub fn resets(&self) -> u64 {
        self.resets
    }

    pub fn settings(&self) -> &IdleSettings {
        &self.settings
    }

    fn reset(&mut self, now: Instant) {
        self.reset_at = now;
        self.state = IdleState::Active;
        self.resets += 1;
    }

    /// A qualifying input event. Returns whether it reset the clock; inputs
    /// within the throttle window of the last reset are absorbed.
    pub fn record_input(&mut self, now: Instant) -> bool {
        if self.state == IdleState::LoggedOut {
            return false;
        }

        if now.saturating_duration_since(self.reset_at) <= self.settings.activity_throttle {
            return false;
        }

        self.reset(now);
        true
    }

    /// Explicit "stay signed in" from the warning prompt.
    pub fn stay_active(&mut self, now: Instant) {
        if self.state != IdleState::LoggedOut {
            self.reset(now);
        }
    }

    pub fn next_deadline(&self) -> Option<(Deadline, Instant)> {
        let warning_at = self.reset_at + self.settings.warning_after;
        let logout_at = self.reset_at + self.settings.logout_after;

        match self.state {
            IdleState::Active if warning_at < logout_at => Some((Deadline::Warning, warning_at)),
            IdleState::Active | IdleState::WarningShown => Some((Deadline::Logout, logout_at)),
            IdleState::LoggedOut => None,
        }
    }

    /// Called when `deadline` has been reached.
    pub fn fire(&mut self, deadline: Deadline, now: Instant) -> ClockTransition {
        if self.in_flight.is_busy() {
            self.reset(now);
            return ClockTransition::Deferred;
        }

        match deadline {
            Deadline::Warning => {
                self.state = IdleState::WarningShown;
                ClockTransition::WarningShown
            }
            Deadline::Logout => {
                self.state = IdleState::LoggedOut;
                ClockTransition::LoggedOut
            }
        }
    }
}
