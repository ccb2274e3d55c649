//! Concrete environments.

pub mod grid;

pub use grid::{GridAction, GridWorld, GridWorldBuilder, Position, TransitionModel};
