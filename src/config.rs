//! Configuration for the overlay
//!
//! CLI arguments and environment variable handling using clap, plus the
//! tracker credential set. Credentials resolve from the environment/CLI
//! first, falling back per-field to an optional JSON config file (the same
//! precedence the desktop shell's settings dialog writes into).

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Sidequest - idle-progression overlay for a TAPD workload
#[derive(Parser, Debug, Clone)]
#[command(name = "sidequest")]
#[command(about = "Idle-game overlay that gamifies your TAPD workload")]
pub struct Args {
    /// TAPD API bearer token
    #[arg(long, env = "TAPD_API_TOKEN")]
    pub tapd_api_token: Option<String>,

    /// TAPD workspace to scope story queries to
    #[arg(long, env = "TAPD_WORKSPACE_ID")]
    pub tapd_workspace_id: Option<String>,

    /// Display name used for the owner filter
    #[arg(long, env = "TAPD_NAME")]
    pub tapd_name: Option<String>,

    /// Custom field carrying the user's role on a story
    /// (custom_field_9 = product, custom_field_10 = test, otherwise developer)
    #[arg(long, env = "TAPD_USER_ROLE_FIELD")]
    pub tapd_user_role_field: Option<String>,

    /// Directory for persisted overlay state
    #[arg(long, env = "SIDEQUEST_DATA_DIR", default_value = "./data")]
    pub data_dir: PathBuf,

    /// JSON config file with fallback credentials
    #[arg(long, env = "SIDEQUEST_CONFIG", default_value = "sidequest.json")]
    pub config_file: PathBuf,

    /// World-event copy document
    #[arg(long, env = "SIDEQUEST_EVENTS_FILE", default_value = "assets/world-events.json")]
    pub events_file: PathBuf,

    /// Tracker poll interval in seconds
    #[arg(long, env = "SIDEQUEST_POLL_INTERVAL_SECS", default_value = "86400")]
    pub poll_interval_secs: u64,
}

impl Args {
    /// Resolve the effective tracker credentials.
    ///
    /// Environment/CLI values win per field; the config file fills the gaps.
    /// A completely absent config file is normal and not logged.
    pub fn credentials(&self) -> TrackerCredentials {
        let fallback = load_credentials_file(&self.config_file).unwrap_or_default();
        self.cli_credentials().merged_over(fallback)
    }

    fn cli_credentials(&self) -> TrackerCredentials {
        TrackerCredentials {
            token: self.tapd_api_token.clone(),
            workspace_id: self.tapd_workspace_id.clone(),
            user_name: self.tapd_name.clone(),
            user_role_field: self.tapd_user_role_field.clone(),
        }
    }
}

/// Credential/config set for the tracker, every field optional.
///
/// A missing token means "skip fetch, publish nothing" rather than an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackerCredentials {
    pub token: Option<String>,
    pub workspace_id: Option<String>,
    pub user_name: Option<String>,
    pub user_role_field: Option<String>,
}

impl TrackerCredentials {
    /// Field-wise merge, `self` taking precedence over `fallback`.
    pub fn merged_over(self, fallback: TrackerCredentials) -> TrackerCredentials {
        TrackerCredentials {
            token: self.token.or(fallback.token),
            workspace_id: self.workspace_id.or(fallback.workspace_id),
            user_name: self.user_name.or(fallback.user_name),
            user_role_field: self.user_role_field.or(fallback.user_role_field),
        }
    }
}

fn load_credentials_file(path: &Path) -> Option<TrackerCredentials> {
    let raw = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(creds) => Some(creds),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring unparseable config file");
            None
        }
    }
}
