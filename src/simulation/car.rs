//! Car population
//!
//! Cars drive a fixed seven-block stretch with a crosswalk at its midpoint.
//! When the light turns yellow, each driving car projects where it will be
//! when the red starts and when the green returns, and decides whether it
//! must stop. Stopped cars are released on the next green; their braking
//! overhead and idle time is charged as delay.

use log::debug;

use super::config::SimConfig;
use super::light::LightState;
use super::scheduler::Scheduler;
use super::stats::Welford;
use super::types::{CarId, EventKind};

/// A car, tracked from spawn until it leaves the far end of the route
#[derive(Debug, Clone)]
pub struct SimCar {
    pub id: CarId,
    /// Sim time this car entered the route
    pub spawn_time: f64,
    /// Cruising speed in ft/s
    pub speed: f64,
    /// Distance needed to brake to a stop from cruising speed
    pub braking_distance: f64,
    /// Time needed to brake to a stop, and again to get back up to speed
    pub braking_time: f64,
    /// Set on a yellow: this car cannot clear the light legally
    pub should_stop: bool,
    /// Sim time of the stop-or-go decision at the braking point
    pub stop_decision: Option<f64>,
}

impl SimCar {
    pub fn new(id: CarId, spawn_time: f64, speed: f64, config: &SimConfig) -> Self {
        Self {
            id,
            spawn_time,
            speed,
            braking_distance: speed * speed / (2.0 * config.car_braking_rate),
            braking_time: speed / config.car_braking_rate,
            should_stop: false,
            stop_decision: None,
        }
    }
}

/// Tracks every car on the route, plus the route geometry
#[derive(Debug)]
pub struct CarManager {
    /// Cars still rolling toward the exit
    driving: Vec<SimCar>,
    /// Cars held at the crosswalk
    stopped: Vec<SimCar>,
    /// Full route length in feet
    pub total: f64,
    /// Distance from entry to the braking point at the crosswalk
    pub before: f64,
    /// Distance from entry to one car length past the crosswalk
    pub after: f64,
}

impl CarManager {
    pub fn new(config: &SimConfig) -> Self {
        let total = 7.0 * config.block_width + 6.0 * config.street_width;
        Self {
            driving: Vec::new(),
            stopped: Vec::new(),
            total,
            before: (total - config.crosswalk_width) / 2.0,
            after: (total + config.crosswalk_width) / 2.0 + config.car_length,
        }
    }

    /// Register a new car and schedule its light arrival and route exit
    pub fn spawn(&mut self, car: SimCar, scheduler: &mut Scheduler) {
        debug!("Spawned car {} (speed {:.3} ft/s)", car.id.0, car.speed);
        scheduler.insert(
            (self.before - car.braking_distance) / car.speed,
            EventKind::CarArrive(car.id),
        );
        scheduler.insert(self.total / car.speed, EventKind::CarExit(car.id));
        self.driving.push(car);
    }

    /// Yellow began: flag the driving cars that cannot clear the light
    ///
    /// Projects each car's position at the coming red and at the green after
    /// it. A car may roll through only if it will be fully past the crosswalk
    /// when the red starts, or still short of the braking point when the
    /// green returns.
    pub fn on_yellow(&mut self, now: f64, config: &SimConfig) {
        for car in &mut self.driving {
            let at_red = (now + config.yellow_duration - car.spawn_time) * car.speed;
            let at_green =
                (now + config.yellow_duration + config.red_duration - car.spawn_time) * car.speed;
            if at_red < self.after || at_green > self.before {
                car.should_stop = true;
                debug!("Car {} should stop at the crosswalk", car.id.0);
            }
        }
    }

    /// A car reaches its braking point at the light
    ///
    /// Cars flagged on the yellow pull over if the light is still against
    /// them; everyone else rolls through. Unknown ids are ignored.
    pub fn arrive(&mut self, id: CarId, now: f64, light: LightState) {
        let idx = match self.driving.iter().position(|c| c.id == id) {
            Some(idx) => idx,
            None => return,
        };
        let blocked = matches!(light, LightState::Yellow | LightState::Red);
        self.driving[idx].stop_decision = Some(now);
        if self.driving[idx].should_stop && blocked {
            let car = self.driving.remove(idx);
            debug!("Car {} will NOT make the light", car.id.0);
            self.stopped.push(car);
        } else {
            debug!("Car {} will make the light", id.0);
        }
    }

    /// Green returned: release every stopped car, newest stop first
    ///
    /// A released car leaves the model immediately. Its delay is the braking
    /// and acceleration overhead plus the time spent sitting at the light.
    pub fn on_green(&mut self, now: f64, delays: &mut Welford) {
        while let Some(car) = self.stopped.pop() {
            let base_time = (self.total - 2.0 * car.braking_distance) / car.speed;
            let stop_duration = now - car.stop_decision.unwrap_or(now);
            let travel_time = base_time + car.braking_time + stop_duration;
            let delay = travel_time - self.total / car.speed;
            delays.insert(delay);
            debug!(
                "Car {} has left the simulation in {:.3}s with {:.3}s delay",
                car.id.0, travel_time, delay
            );
        }
    }

    /// A car reaches the far end of the route
    ///
    /// Only cars that were never stopped exit this way, and they are charged
    /// zero delay. A car held at the light already left in
    /// [`CarManager::on_green`], so unknown ids are ignored.
    pub fn exit(&mut self, id: CarId, now: f64, delays: &mut Welford) {
        let idx = match self.driving.iter().position(|c| c.id == id) {
            Some(idx) => idx,
            None => return,
        };
        let car = self.driving.remove(idx);
        delays.insert(0.0);
        debug!(
            "Car {} has left the simulation in {:.3}s with no delay",
            car.id.0,
            now - car.spawn_time
        );
    }

    /// Cars still rolling toward the exit
    pub fn driving(&self) -> &[SimCar] {
        &self.driving
    }

    /// Cars held at the crosswalk
    pub fn stopped(&self) -> &[SimCar] {
        &self.stopped
    }
}
