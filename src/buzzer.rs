//! Buzzer actuation patterns.
//!
//! A pattern is expanded by a small phase machine and played to
//! completion before the caller regains control, so no other output
//! call can interleave with a running pattern.

use std::time::Duration;

use tracing::debug;

use crate::hardware::{HardwareError, HardwareIO};

/// Audible patterns the portal can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// One long pulse; the portal's buzzer test.
    Single,
    /// Three short pulses; medication reminders.
    Reminder,
}

impl Pattern {
    /// Pulse count for the pattern.
    fn pulses(self) -> u8 {
        match self {
            Pattern::Single => 1,
            Pattern::Reminder => 3,
        }
    }

    /// (high hold, low hold) for each pulse.
    fn phase_durations(self) -> (Duration, Duration) {
        match self {
            Pattern::Single => (Duration::from_secs(2), Duration::ZERO),
            Pattern::Reminder => (Duration::from_millis(500), Duration::from_millis(500)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Pulsing { remaining: u8, phase: Phase },
}

/// Expands a [`Pattern`] into line levels with hold times.
#[derive(Debug)]
pub struct PatternMachine {
    pattern: Pattern,
    state: State,
}

impl PatternMachine {
    pub fn new(pattern: Pattern) -> Self {
        Self {
            pattern,
            state: State::Pulsing {
                remaining: pattern.pulses(),
                phase: Phase::On,
            },
        }
    }

    /// Next phase to drive: line level plus how long to hold it.
    /// `None` once the machine has returned to idle; the last emitted
    /// phase always leaves the line low.
    pub fn next_phase(&mut self) -> Option<(bool, Duration)> {
        let (on_hold, off_hold) = self.pattern.phase_durations();
        match self.state {
            State::Idle => None,
            State::Pulsing {
                remaining,
                phase: Phase::On,
            } => {
                self.state = State::Pulsing {
                    remaining,
                    phase: Phase::Off,
                };
                Some((true, on_hold))
            }
            State::Pulsing {
                remaining,
                phase: Phase::Off,
            } => {
                self.state = if remaining > 1 {
                    State::Pulsing {
                        remaining: remaining - 1,
                        phase: Phase::On,
                    }
                } else {
                    State::Idle
                };
                Some((false, off_hold))
            }
        }
    }
}

/// Play a pattern to completion, holding the line through each phase.
pub async fn play(hw: &mut impl HardwareIO, pattern: Pattern) -> Result<(), HardwareError> {
    debug!("Buzzer pattern start: {:?}", pattern);
    let mut machine = PatternMachine::new(pattern);
    while let Some((level, hold)) = machine.next_phase() {
        hw.set_buzzer(level)?;
        if !hold.is_zero() {
            tokio::time::sleep(hold).await;
        }
    }
    debug!("Buzzer pattern done: {:?}", pattern);
    Ok(())
}
