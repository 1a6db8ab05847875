//! World events: configuration, transition mapping, narration, dispatch

pub mod config;
pub mod dispatcher;
pub mod mapper;
pub mod narrator;

pub use config::{EventConfigStore, WorldEventConfig};
pub use dispatcher::WorldEventDispatcher;
pub use mapper::{map_status_change, WorldEvent};
pub use narrator::Narrator;
