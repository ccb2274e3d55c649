//! Core types shared by the search engine and the planner: RNG and errors.

pub mod error;
pub mod rng;

pub use error::{MctsError, Result};
pub use rng::SearchRng;
