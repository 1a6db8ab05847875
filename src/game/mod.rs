//! Idle-game progression

pub mod progression;

pub use progression::{PlayerState, ProgressionEngine};
