//! Discrete-event crosswalk simulation
//!
//! Models one signalized crosswalk on a seven-block stretch of road: cars
//! and pedestrians arrive at random, pedestrians press a button to request
//! the light, and both populations accumulate delay statistics. Everything
//! advances through a single event queue owned by [`SimWorld`].

pub mod car;
pub mod config;
pub mod light;
pub mod pedestrian;
pub mod scheduler;
pub mod stats;
pub mod trace;
pub mod types;
pub mod variate;
pub mod world;

pub use car::{CarManager, SimCar};
pub use config::{
    SimConfig, BLOCK_WIDTH, CAR_ARRIVAL_MEAN, CAR_BRAKING_RATE, CAR_LENGTH, CAR_SPEED_MAX,
    CAR_SPEED_MIN, CROSSWALK_WIDTH, GREEN_DURATION, IMPATIENCE_INTERVAL, LONE_PRESS_PROBABILITY,
    MAX_PEDS_PER_RED, PED_ARRIVAL_MEAN, PED_SPEED_MAX, PED_SPEED_MIN, RED_DURATION, STREET_WIDTH,
    YELLOW_DURATION,
};
pub use light::{LightEffect, LightState, LightTrigger, SimLight};
pub use pedestrian::{PedManager, SimPed};
pub use scheduler::Scheduler;
pub use stats::Welford;
pub use trace::TraceStream;
pub use types::{CarId, Event, EventKind, PedId};
pub use variate::{
    bernoulli, binomial, equilikely, exponential, geometric, normal, pascal, uniform,
    PseudoRandom, UniformSource,
};
pub use world::{SimReport, SimWorld};
