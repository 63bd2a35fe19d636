//! Simulation context and dispatch loop
//!
//! [`SimWorld`] owns every component of the model: the clock and event queue,
//! the light, both populations, the delay statistics, and the three uniform
//! streams that feed them. It seeds the initial spawn events, dispatches
//! events to completion, and reports the closing statistics.

use log::{debug, info};

use super::car::{CarManager, SimCar};
use super::config::SimConfig;
use super::light::{LightEffect, LightTrigger, SimLight};
use super::pedestrian::{PedManager, SimPed};
use super::scheduler::Scheduler;
use super::stats::Welford;
use super::types::{CarId, Event, EventKind, PedId};
use super::variate::{exponential, uniform, PseudoRandom, UniformSource};

/// Closing statistics for one completed run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimReport {
    pub car_delay_mean: f64,
    pub car_delay_variance: f64,
    pub car_delay_std_dev: f64,
    pub cars_recorded: u64,
    pub ped_delay_mean: f64,
    pub ped_delay_variance: f64,
    pub ped_delay_std_dev: f64,
    pub peds_recorded: u64,
}

/// The whole crosswalk model
pub struct SimWorld {
    pub config: SimConfig,
    pub scheduler: Scheduler,
    pub light: SimLight,
    pub peds: PedManager,
    pub cars: CarManager,
    pub ped_delay: Welford,
    pub car_delay: Welford,
    /// Number of cars and of pedestrians to generate (each)
    target: u64,
    peds_spawned: u64,
    cars_spawned: u64,
    auto_source: Box<dyn UniformSource>,
    ped_source: Box<dyn UniformSource>,
    button_source: Box<dyn UniformSource>,
    dispatched: u64,
}

impl SimWorld {
    /// Build a world with freshly seeded pseudo-random streams
    pub fn new(target: u64) -> Self {
        Self::new_internal(
            target,
            SimConfig::new(),
            Box::new(PseudoRandom::new()),
            Box::new(PseudoRandom::new()),
            Box::new(PseudoRandom::new()),
        )
    }

    /// Build a world whose three streams all derive from one seed
    pub fn new_with_seed(target: u64, seed: u64) -> Self {
        Self::new_internal(
            target,
            SimConfig::new(),
            Box::new(PseudoRandom::seeded(seed)),
            Box::new(PseudoRandom::seeded(seed.wrapping_add(1))),
            Box::new(PseudoRandom::seeded(seed.wrapping_add(2))),
        )
    }

    /// Build a world from explicit streams (trace files, test doubles)
    pub fn new_with_sources(
        target: u64,
        config: SimConfig,
        auto_source: Box<dyn UniformSource>,
        ped_source: Box<dyn UniformSource>,
        button_source: Box<dyn UniformSource>,
    ) -> Self {
        Self::new_internal(target, config, auto_source, ped_source, button_source)
    }

    fn new_internal(
        target: u64,
        config: SimConfig,
        auto_source: Box<dyn UniformSource>,
        ped_source: Box<dyn UniformSource>,
        button_source: Box<dyn UniformSource>,
    ) -> Self {
        let mut world = Self {
            cars: CarManager::new(&config),
            config,
            scheduler: Scheduler::new(),
            light: SimLight::new(),
            peds: PedManager::new(),
            ped_delay: Welford::new(),
            car_delay: Welford::new(),
            target,
            peds_spawned: 0,
            cars_spawned: 0,
            auto_source,
            ped_source,
            button_source,
            dispatched: 0,
        };

        // Two independent spawn chains per population
        let gap = exponential(world.config.ped_arrival_mean, world.ped_source.as_mut());
        world.scheduler.insert(gap, EventKind::PedSpawn);
        let gap = exponential(world.config.ped_arrival_mean, world.ped_source.as_mut());
        world.scheduler.insert(gap, EventKind::PedSpawn);
        let gap = exponential(world.config.car_arrival_mean, world.auto_source.as_mut());
        world.scheduler.insert(gap, EventKind::CarSpawn);
        let gap = exponential(world.config.car_arrival_mean, world.auto_source.as_mut());
        world.scheduler.insert(gap, EventKind::CarSpawn);

        world
    }

    /// Dispatch the next event. Returns false once the queue has drained.
    pub fn step(&mut self) -> bool {
        let event = match self.scheduler.pop_next() {
            Some(event) => event,
            None => return false,
        };
        self.dispatched += 1;
        debug!("Event {:?} at {:.3}", event.kind, event.at);
        self.dispatch(event);
        true
    }

    /// Run the model until the event queue drains
    pub fn run(&mut self) {
        while self.step() {}
        self.log_summary();
    }

    fn dispatch(&mut self, event: Event) {
        match event.kind {
            EventKind::TimerExpire => self.run_light(LightTrigger::TimerExpire),
            EventKind::PedSpawn => self.spawn_ped(),
            EventKind::CarSpawn => self.spawn_car(),
            EventKind::PedArrive(id) => {
                let pressed = self.peds.arrive(
                    id,
                    &self.light,
                    &mut self.scheduler,
                    &mut self.ped_delay,
                    self.button_source.as_mut(),
                    &self.config,
                );
                if pressed {
                    self.run_light(LightTrigger::Press);
                }
            }
            EventKind::PedImpatient(id) => {
                let pressed = self.peds.impatient(
                    id,
                    &mut self.scheduler,
                    self.button_source.as_mut(),
                    &self.config,
                );
                if pressed {
                    self.run_light(LightTrigger::Press);
                }
            }
            EventKind::CarArrive(id) => {
                self.cars.arrive(id, self.scheduler.now(), self.light.state());
            }
            EventKind::CarExit(id) => {
                self.cars.exit(id, self.scheduler.now(), &mut self.car_delay);
            }
        }
    }

    /// Bring the next pedestrian into the model and keep its chain going
    ///
    /// Once the population target is reached the spawn is skipped and no
    /// follow-up is scheduled, so the chain dies out.
    fn spawn_ped(&mut self) {
        if self.peds_spawned >= self.target {
            return;
        }
        self.peds_spawned += 1;
        let id = PedId(self.peds_spawned as usize);
        let speed = uniform(
            self.config.ped_speed_min,
            self.config.ped_speed_max,
            self.ped_source.as_mut(),
        );
        let ped = SimPed::new(id, self.scheduler.now(), speed, &self.config);
        self.peds.spawn(ped, &mut self.scheduler);
        let gap = exponential(self.config.ped_arrival_mean, self.ped_source.as_mut());
        self.scheduler.insert(gap, EventKind::PedSpawn);
    }

    /// Bring the next car onto the route and keep its chain going
    fn spawn_car(&mut self) {
        if self.cars_spawned >= self.target {
            return;
        }
        self.cars_spawned += 1;
        let id = CarId(self.cars_spawned as usize);
        let speed = uniform(
            self.config.car_speed_min,
            self.config.car_speed_max,
            self.auto_source.as_mut(),
        );
        let car = SimCar::new(id, self.scheduler.now(), speed, &self.config);
        self.cars.spawn(car, &mut self.scheduler);
        let gap = exponential(self.config.car_arrival_mean, self.auto_source.as_mut());
        self.scheduler.insert(gap, EventKind::CarSpawn);
    }

    /// Feed one trigger to the light and carry out the resulting effect
    fn run_light(&mut self, trigger: LightTrigger) {
        let now = self.scheduler.now();
        match self.light.apply(trigger, now, &self.config) {
            LightEffect::None => {}
            LightEffect::BeginYellow => {
                info!("Traffic light has changed to yellow");
                self.cars.on_yellow(now, &self.config);
                self.scheduler
                    .insert(self.config.yellow_duration, EventKind::TimerExpire);
            }
            LightEffect::BeginRed => {
                info!("Traffic light has changed to red");
                self.peds.deploy(now, &mut self.ped_delay, &self.config);
                self.scheduler
                    .insert(self.config.red_duration, EventKind::TimerExpire);
            }
            LightEffect::BeginGreen => {
                info!("Traffic light has changed to green");
                self.cars.on_green(now, &mut self.car_delay);
                self.scheduler
                    .insert(self.config.green_duration, EventKind::TimerExpire);
            }
        }
    }

    /// Press the crosswalk button directly
    pub fn press_button(&mut self) {
        self.run_light(LightTrigger::Press);
    }

    /// Snapshot the delay statistics
    pub fn report(&self) -> SimReport {
        SimReport {
            car_delay_mean: self.car_delay.mean(),
            car_delay_variance: self.car_delay.variance(),
            car_delay_std_dev: self.car_delay.std_dev(),
            cars_recorded: self.car_delay.count(),
            ped_delay_mean: self.ped_delay.mean(),
            ped_delay_variance: self.ped_delay.variance(),
            ped_delay_std_dev: self.ped_delay.std_dev(),
            peds_recorded: self.ped_delay.count(),
        }
    }

    fn log_summary(&self) {
        info!(
            "Simulation complete after {} events at t = {:.3}s",
            self.dispatched,
            self.scheduler.now()
        );
        info!(
            "Auto delay: mean {:.3}s, variance {:.3}, std dev {:.3} over {} cars",
            self.car_delay.mean(),
            self.car_delay.variance(),
            self.car_delay.std_dev(),
            self.car_delay.count()
        );
        info!(
            "Ped delay: mean {:.3}s, variance {:.3}, std dev {:.3} over {} peds",
            self.ped_delay.mean(),
            self.ped_delay.variance(),
            self.ped_delay.std_dev(),
            self.ped_delay.count()
        );
    }

    /// Events dispatched so far
    pub fn events_dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Pedestrians generated so far
    pub fn peds_spawned(&self) -> u64 {
        self.peds_spawned
    }

    /// Cars generated so far
    pub fn cars_spawned(&self) -> u64 {
        self.cars_spawned
    }
}
