//! Fixed parameters of the crosswalk model
//!
//! All tunables live in one immutable [`SimConfig`] value constructed once
//! and owned by the simulation context. The named constants are the surveyed
//! defaults; tests build modified configs from them.

/// Corridor geometry in feet
pub const BLOCK_WIDTH: f64 = 330.0;
pub const STREET_WIDTH: f64 = 46.0;
pub const CROSSWALK_WIDTH: f64 = 24.0;
pub const CAR_LENGTH: f64 = 9.0;

/// Signal phase durations in seconds
pub const RED_DURATION: f64 = 18.0;
pub const YELLOW_DURATION: f64 = 8.0;
pub const GREEN_DURATION: f64 = 35.0;

/// Car free-flow speed range in ft/s (25 to 35 mi/h) and braking rate
pub const CAR_SPEED_MIN: f64 = 100.0 / 3.0;
pub const CAR_SPEED_MAX: f64 = 154.0 / 3.0;
pub const CAR_BRAKING_RATE: f64 = 10.0;

/// Pedestrian walking speed range in ft/s
pub const PED_SPEED_MIN: f64 = 2.6;
pub const PED_SPEED_MAX: f64 = 4.1;

/// Crossing capacity of one red phase
pub const MAX_PEDS_PER_RED: usize = 20;

/// Mean inter-arrival gaps in seconds (3 peds and 4 cars per minute)
pub const PED_ARRIVAL_MEAN: f64 = 20.0;
pub const CAR_ARRIVAL_MEAN: f64 = 15.0;

/// How often a waiting pedestrian rechecks the button, in seconds
pub const IMPATIENCE_INTERVAL: f64 = 60.0;

/// Press probability when the button queue is empty
pub const LONE_PRESS_PROBABILITY: f64 = 15.0 / 16.0;

/// Immutable simulation parameters
///
/// Owned by the simulation context and passed by reference to every
/// component that needs one.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// City block length in feet
    pub block_width: f64,
    /// Cross-street width in feet
    pub street_width: f64,
    /// Crosswalk width in feet
    pub crosswalk_width: f64,
    /// Car length in feet
    pub car_length: f64,
    /// Red phase duration in seconds
    pub red_duration: f64,
    /// Yellow phase duration in seconds
    pub yellow_duration: f64,
    /// Green fallback timer duration in seconds
    pub green_duration: f64,
    /// Lower bound of the car speed draw, ft/s
    pub car_speed_min: f64,
    /// Upper bound of the car speed draw, ft/s
    pub car_speed_max: f64,
    /// Constant braking deceleration, ft/s^2
    pub car_braking_rate: f64,
    /// Lower bound of the pedestrian speed draw, ft/s
    pub ped_speed_min: f64,
    /// Upper bound of the pedestrian speed draw, ft/s
    pub ped_speed_max: f64,
    /// Maximum crossings per red phase
    pub max_peds_per_red: usize,
    /// Mean pedestrian inter-arrival gap, seconds
    pub ped_arrival_mean: f64,
    /// Mean car inter-arrival gap, seconds
    pub car_arrival_mean: f64,
    /// Delay between impatience rechecks, seconds
    pub impatience_interval: f64,
    /// Press probability for a pedestrian arriving at an empty queue
    pub lone_press_probability: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SimConfig {
    /// Create a config with the surveyed default parameters
    pub fn new() -> Self {
        Self {
            block_width: BLOCK_WIDTH,
            street_width: STREET_WIDTH,
            crosswalk_width: CROSSWALK_WIDTH,
            car_length: CAR_LENGTH,
            red_duration: RED_DURATION,
            yellow_duration: YELLOW_DURATION,
            green_duration: GREEN_DURATION,
            car_speed_min: CAR_SPEED_MIN,
            car_speed_max: CAR_SPEED_MAX,
            car_braking_rate: CAR_BRAKING_RATE,
            ped_speed_min: PED_SPEED_MIN,
            ped_speed_max: PED_SPEED_MAX,
            max_peds_per_red: MAX_PEDS_PER_RED,
            ped_arrival_mean: PED_ARRIVAL_MEAN,
            car_arrival_mean: CAR_ARRIVAL_MEAN,
            impatience_interval: IMPATIENCE_INTERVAL,
            lone_press_probability: LONE_PRESS_PROBABILITY,
        }
    }
}
