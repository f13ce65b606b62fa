//! Bounded reduction of interaction-combinator nets.

pub mod engine;
pub mod rules;

pub use engine::{has_valid_factor, reduce, Outcome};
