//! TAPD tracker integration
//!
//! Transport seam, the unified item model, the claim ledger, and the poller
//! that ties them together.

pub mod item;
pub mod ledger;
pub mod poller;
pub mod transport;

pub use item::{ItemKind, TrackedItem};
pub use ledger::ClaimLedger;
pub use poller::{StatusChange, TrackerPoller};
pub use transport::{HttpTransport, TrackerTransport};
