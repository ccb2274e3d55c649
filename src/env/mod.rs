//! Environment contract consumed by the search engine.
//!
//! Domains implement `Environment` to define:
//! - The action set and enumerable state set
//! - Stochastic transitions and rewards
//! - Terminal and bounds predicates
//!
//! The engine calls into `Environment` but never interprets
//! domain-specific states or actions directly.

pub mod environment;

pub use environment::{Environment, Step};
