//! Crosswalk simulation library
//!
//! The binary in `main.rs` is a thin CLI over [`simulation::SimWorld`];
//! everything of substance lives in the [`simulation`] module tree.

pub mod simulation;
