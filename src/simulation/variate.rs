//! Random variate generation
//!
//! Every distribution is a closed-form mapping of one uniform draw. The draw
//! comes from a [`UniformSource`]: either the pseudorandom implementation
//! here or a recorded trace stream, chosen once when the simulation is
//! built and passed by reference afterwards.

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

/// A source of uniform draws on (0, 1)
///
/// The pseudorandom implementation never yields exactly 0. A trace-backed
/// source replays its file verbatim and falls back to 0.0 once exhausted.
pub trait UniformSource {
    fn draw(&mut self) -> f64;
}

/// Pseudorandom uniform source, optionally seeded for reproducible runs
#[derive(Debug, Default)]
pub struct PseudoRandom {
    rng: Option<StdRng>,
}

impl PseudoRandom {
    pub fn new() -> Self {
        Self { rng: None }
    }

    /// Create a seeded source for reproducible draws
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Some(StdRng::seed_from_u64(seed)),
        }
    }
}

impl UniformSource for PseudoRandom {
    fn draw(&mut self) -> f64 {
        // u = 0 exactly would blow up the log in the exponential mapping
        loop {
            let u: f64 = match &mut self.rng {
                Some(rng) => rng.random(),
                None => rand::rng().random(),
            };
            if u != 0.0 {
                return u;
            }
        }
    }
}

/// Bernoulli trial with success probability `p`
pub fn bernoulli(p: f64, source: &mut dyn UniformSource) -> bool {
    source.draw() >= 1.0 - p
}

/// Uniform float in [a, b)
pub fn uniform(a: f64, b: f64, source: &mut dyn UniformSource) -> f64 {
    a + (b - a) * source.draw()
}

/// Equally likely integer in the inclusive range [a, b]
pub fn equilikely(a: i64, b: i64, source: &mut dyn UniformSource) -> i64 {
    a + ((b - a + 1) as f64 * source.draw()).floor() as i64
}

/// Exponential float with the given mean (not rate)
pub fn exponential(mean: f64, source: &mut dyn UniformSource) -> f64 {
    assert!(mean > 0.0, "exponential mean must be positive: {}", mean);
    -mean * (1.0 - source.draw()).ln()
}

/// Geometric integer variate. Not implemented; nothing in the model draws
/// from it, and calling it is a bug.
pub fn geometric(_rate: f64, _source: &mut dyn UniformSource) -> i64 {
    unimplemented!("geometric random variate")
}

/// Binomial integer variate. Not implemented; calling it is a bug.
pub fn binomial(_n: u64, _p: f64) -> u64 {
    unimplemented!("binomial random variate")
}

/// Pascal integer variate. Not implemented; calling it is a bug.
pub fn pascal(_n: u64, _p: f64) -> u64 {
    unimplemented!("pascal random variate")
}

/// Normal float variate. Not implemented; calling it is a bug.
pub fn normal(_mean: f64, _std_dev: f64) -> f64 {
    unimplemented!("normal random variate")
}
