//! Core types for the crosswalk simulation
//!
//! Entity ids, event categories, and the event record the scheduler hands out.

/// A wrapper type for pedestrian ids
///
/// Ids count up from 1 in spawn order, independently of car ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PedId(pub usize);

/// A wrapper type for car ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CarId(pub usize);

/// Event category, carrying the subject id where one applies
///
/// Spawn events have no subject: the spawn handler allocates the next id
/// itself. Arrive, impatient, and exit events name the entity they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// The traffic light's pending timer ran out
    TimerExpire,
    /// Generate the next pedestrian (if the target count allows)
    PedSpawn,
    /// A pedestrian reached the crosswalk button
    PedArrive(PedId),
    /// A waiting pedestrian rechecks the button
    PedImpatient(PedId),
    /// Generate the next car (if the target count allows)
    CarSpawn,
    /// A car reached its braking decision point
    CarArrive(CarId),
    /// A car would leave the corridor if it was never stopped
    CarExit(CarId),
}

/// A dispatched simulation event
///
/// Immutable once created; `at` is absolute simulation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub at: f64,
    pub kind: EventKind,
}
