//! Stochastic grid worlds used as reference environments.
//!
//! The agent moves in four directions; each move succeeds, veers to one
//! side, or leaves the agent in place according to a [`TransitionModel`].

mod render;
mod world;

pub use world::{GridAction, GridWorld, GridWorldBuilder, Position, TransitionModel};
