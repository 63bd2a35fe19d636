//! Pedestrian population
//!
//! Pedestrians spawn at a street corner, walk to the crosswalk button, and
//! either cross immediately (mid-red, when enough walk time remains) or join
//! a FIFO queue behind the button. Queued pedestrians retry the button on a
//! fixed interval until a red phase sends them across.

use std::collections::VecDeque;

use log::debug;

use super::config::SimConfig;
use super::light::{LightState, SimLight};
use super::scheduler::Scheduler;
use super::stats::Welford;
use super::types::{EventKind, PedId};
use super::variate::{bernoulli, UniformSource};

/// A pedestrian, tracked from spawn until the start of a crossing
#[derive(Debug, Clone)]
pub struct SimPed {
    pub id: PedId,
    /// Sim time this pedestrian entered the model
    pub spawn_time: f64,
    /// Walking speed in ft/s
    pub speed: f64,
    /// Travel time from the spawn corner to the crosswalk button
    pub time_to_button: f64,
    /// Time needed to cross the street at this pedestrian's speed
    pub crossing_time: f64,
}

impl SimPed {
    pub fn new(id: PedId, spawn_time: f64, speed: f64, config: &SimConfig) -> Self {
        Self {
            id,
            spawn_time,
            speed,
            time_to_button: (config.block_width + config.street_width) / speed,
            crossing_time: config.street_width / speed,
        }
    }
}

/// Tracks every pedestrian between spawn and crossing
#[derive(Debug, Default)]
pub struct PedManager {
    /// Pedestrians en route from their spawn corner to the button
    walking: Vec<SimPed>,
    /// FIFO queue at the button
    waiting: VecDeque<SimPed>,
    /// Crossings granted since the current red began
    crossed_this_phase: usize,
}

impl PedManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new pedestrian and schedule their arrival at the button
    pub fn spawn(&mut self, ped: SimPed, scheduler: &mut Scheduler) {
        debug!("Spawned pedestrian {} (speed {:.3} ft/s)", ped.id.0, ped.speed);
        scheduler.insert(ped.time_to_button, EventKind::PedArrive(ped.id));
        self.walking.push(ped);
    }

    /// A pedestrian reaches the button
    ///
    /// Mid-red arrivals cross on the spot when enough of the walk window
    /// remains and per-phase capacity allows it. Everyone else may press the
    /// button and joins the back of the waiting queue. Returns whether the
    /// button was pressed; unknown ids are ignored.
    pub fn arrive(
        &mut self,
        id: PedId,
        light: &SimLight,
        scheduler: &mut Scheduler,
        delays: &mut Welford,
        button: &mut dyn UniformSource,
        config: &SimConfig,
    ) -> bool {
        let idx = match self.walking.iter().position(|p| p.id == id) {
            Some(idx) => idx,
            None => return false,
        };
        let ped = self.walking.remove(idx);
        let now = scheduler.now();

        if light.state() == LightState::Red {
            if ped.crossing_time <= light.walk_expiry() - now {
                if self.cross(&ped, now, delays, config) {
                    return false;
                }
            } else {
                debug!("Pedestrian {} will not make it across in time", id.0);
            }
        }

        let pressed = Self::attempt_press(self.waiting.len(), id, button, config);
        debug!("Pedestrian {} is now waiting", id.0);
        self.waiting.push_back(ped);
        scheduler.insert(config.impatience_interval, EventKind::PedImpatient(id));
        pressed
    }

    /// A queued pedestrian loses patience and may press the button again
    ///
    /// Reschedules itself for as long as the pedestrian is still waiting;
    /// once they have crossed, the chain dies out on its own. Returns whether
    /// the button was pressed.
    pub fn impatient(
        &mut self,
        id: PedId,
        scheduler: &mut Scheduler,
        button: &mut dyn UniformSource,
        config: &SimConfig,
    ) -> bool {
        if !self.waiting.iter().any(|p| p.id == id) {
            return false;
        }
        debug!("Pedestrian {} has grown impatient", id.0);
        let pressed = Self::attempt_press(0, id, button, config);
        scheduler.insert(config.impatience_interval, EventKind::PedImpatient(id));
        pressed
    }

    /// Red began: send the waiting queue across in FIFO order
    ///
    /// Resets the per-phase capacity counter, then grants crossings from the
    /// front of the queue until it drains or capacity runs out. The first
    /// pedestrian refused keeps their place at the head of the queue.
    pub fn deploy(&mut self, now: f64, delays: &mut Welford, config: &SimConfig) {
        self.crossed_this_phase = 0;
        while let Some(ped) = self.waiting.pop_front() {
            if !self.cross(&ped, now, delays, config) {
                self.waiting.push_front(ped);
                break;
            }
        }
    }

    /// Grant one crossing if per-phase capacity allows it
    ///
    /// The pedestrian's delay is recorded the moment the crossing starts;
    /// nothing further can delay them once they step off the curb.
    fn cross(&mut self, ped: &SimPed, now: f64, delays: &mut Welford, config: &SimConfig) -> bool {
        if self.crossed_this_phase >= config.max_peds_per_red {
            return false;
        }
        self.crossed_this_phase += 1;
        let delay = now - ped.spawn_time - ped.time_to_button;
        delays.insert(delay);
        debug!(
            "Pedestrian {} crosses the street with {:.3}s delay",
            ped.id.0, delay
        );
        true
    }

    /// Decide whether a pedestrian presses the button
    ///
    /// A lone pedestrian almost always presses; with `n` others already
    /// waiting the chance drops to 1/(n+1).
    pub fn attempt_press(
        n: usize,
        id: PedId,
        button: &mut dyn UniformSource,
        config: &SimConfig,
    ) -> bool {
        let p = if n == 0 {
            config.lone_press_probability
        } else {
            1.0 / (n as f64 + 1.0)
        };
        let pressed = bernoulli(p, button);
        if pressed {
            debug!("Pedestrian {} has pressed the button", id.0);
        }
        pressed
    }

    /// Pedestrians still walking toward the button
    pub fn walking(&self) -> &[SimPed] {
        &self.walking
    }

    /// Pedestrians queued at the button, oldest first
    pub fn waiting(&self) -> &VecDeque<SimPed> {
        &self.waiting
    }

    /// Crossings granted since the current red began
    pub fn crossed_this_phase(&self) -> usize {
        self.crossed_this_phase
    }
}
