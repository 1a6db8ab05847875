//! Sidequest - idle-game overlay for a TAPD workload
//!
//! Sidequest snapshots the user's assigned tracker items on a long-period
//! timer, turns meaningful status transitions into narrative world events,
//! and runs a local idle-progression clock that accrues experience, levels,
//! and spendable contribution points.
//!
//! ## Services
//!
//! - **Progression**: the 1-second game tick owning level/energy/currency state
//! - **Poller**: fetch, claimability, snapshot diffing, ledger reconciliation
//! - **Claim ledger**: items already redeemed, kept consistent with the tracker
//! - **World events**: transition mapping, narrative copy, display lifetime

pub mod app;
pub mod config;
pub mod events;
pub mod game;
pub mod runtime;
pub mod store;
pub mod tracker;
pub mod types;

pub use app::App;
pub use config::{Args, TrackerCredentials};
pub use types::{Result, SidequestError};
