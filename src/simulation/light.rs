//! Traffic light controller
//!
//! A five-state machine driven by two triggers: button presses and timer
//! expiries. Transitions are a single (state, trigger) table; the
//! cross-component consequences of a transition are returned as a
//! [`LightEffect`] for the owning context to carry out, which keeps the
//! machine itself free of borrow entanglements.

use log::warn;

use super::config::SimConfig;

/// Traffic light phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightState {
    /// Stable green with no pending timer (the entry state)
    Green,
    /// Green with the fallback timer running, not pressed since entry
    GreenWait,
    /// Green with the fallback timer running and a press registered
    GreenWaitPressed,
    /// Transitional phase before red, fixed duration
    Yellow,
    /// Pedestrian phase, fixed duration
    Red,
}

/// Input that drives the light
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightTrigger {
    Press,
    TimerExpire,
}

/// Side effect of a transition, executed by the owning context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightEffect {
    /// Nothing for the caller to do
    None,
    /// Yellow began: flag cars that must stop, schedule the yellow timer
    BeginYellow,
    /// Red began: deploy waiting pedestrians, schedule the red timer
    BeginRed,
    /// Green returned: release stopped cars, schedule the fallback timer
    BeginGreen,
}

/// The traffic light: current phase plus the walk-expiry deadline
#[derive(Debug, Clone)]
pub struct SimLight {
    state: LightState,
    walk_expiry: f64,
}

impl Default for SimLight {
    fn default() -> Self {
        Self::new()
    }
}

impl SimLight {
    pub fn new() -> Self {
        Self {
            state: LightState::Green,
            walk_expiry: 0.0,
        }
    }

    /// Current phase
    pub fn state(&self) -> LightState {
        self.state
    }

    /// Absolute deadline for starting a crossing; meaningful only while red
    pub fn walk_expiry(&self) -> f64 {
        self.walk_expiry
    }

    /// Feed one trigger through the transition table
    ///
    /// `now` is the owning context's clock, used to stamp the walk-expiry
    /// deadline on red entry. A timer expiry while stable green is an
    /// anomaly: it is logged and ignored.
    pub fn apply(&mut self, trigger: LightTrigger, now: f64, config: &SimConfig) -> LightEffect {
        use LightState::*;
        use LightTrigger::*;

        let (next, effect) = match (self.state, trigger) {
            (Green, Press) => (Yellow, LightEffect::BeginYellow),
            (Green, TimerExpire) => {
                warn!("Light timer expired while green; ignoring");
                (Green, LightEffect::None)
            }
            (GreenWait, TimerExpire) => (Green, LightEffect::None),
            (GreenWait, Press) => (GreenWaitPressed, LightEffect::None),
            (GreenWaitPressed, TimerExpire) => (Yellow, LightEffect::BeginYellow),
            (GreenWaitPressed, Press) => (GreenWaitPressed, LightEffect::None),
            (Yellow, Press) => (Yellow, LightEffect::None),
            (Yellow, TimerExpire) => (Red, LightEffect::BeginRed),
            (Red, Press) => (Red, LightEffect::None),
            (Red, TimerExpire) => (GreenWait, LightEffect::BeginGreen),
        };

        if effect == LightEffect::BeginRed {
            self.walk_expiry = now + config.red_duration;
        }

        self.state = next;
        effect
    }
}
