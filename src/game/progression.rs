//! Idle-game progression engine
//!
//! Owns the player state and advances it once per one-second tick: online
//! time, periodic experience gain and energy drain, level-ups with their
//! energy/currency bonuses, and the derived status line. Every mutation ends
//! with an explicit persist step whose failure is logged and swallowed — the
//! in-memory state stays authoritative for the session.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::store::{KvStore, PLAYER_STATE_KEY};

/// Seconds between passive experience gains
const GAIN_INTERVAL_SECS: u64 = 10;
const XP_PER_GAIN: f64 = 5.0;
const ENERGY_DRAIN_PER_GAIN: f64 = 0.5;
/// Growth factor for the experience curve, floored each level
const XP_CURVE_GROWTH: f64 = 1.5;
const LEVEL_UP_ENERGY_BONUS: f64 = 20.0;
const LEVEL_UP_CONTRIBUTION_PER_LEVEL: f64 = 10.0;
const CLAIM_REWARD_PER_LEVEL: f64 = 50.0;

const STATUS_CRITICAL: &str = "🔴 精力接近临界值";
const STATUS_WARNING: &str = "🟡 世界线出现轻微扰动";
const STATUS_STABLE: &str = "🟢 稳定监控中";

/// The player's idle-game attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub level: u32,
    pub experience: f64,
    pub experience_to_next_level: u64,
    /// 0..=100
    pub energy: f64,
    /// Contribution points, the spendable currency
    pub contribution: f64,
    pub online_seconds: u64,
    /// Derived from energy thresholds after every tick
    pub status_text: String,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            level: 1,
            experience: 0.0,
            experience_to_next_level: 100,
            energy: 100.0,
            contribution: 6000.0,
            online_seconds: 0,
            status_text: STATUS_STABLE.to_string(),
        }
    }
}

fn status_text_for(energy: f64) -> &'static str {
    if energy < 20.0 {
        STATUS_CRITICAL
    } else if energy < 60.0 {
        STATUS_WARNING
    } else {
        STATUS_STABLE
    }
}

/// Advances and persists the player state.
pub struct ProgressionEngine {
    state: RwLock<PlayerState>,
    store: Arc<dyn KvStore>,
}

impl ProgressionEngine {
    /// Load the persisted state, falling back to defaults when the blob is
    /// missing or unreadable.
    pub fn load(store: Arc<dyn KvStore>) -> Self {
        let state = match store.get(PLAYER_STATE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(state) => state,
                Err(e) => {
                    warn!(error = %e, "Player state unparseable, starting fresh");
                    PlayerState::default()
                }
            },
            Ok(None) => PlayerState::default(),
            Err(e) => {
                warn!(error = %e, "Failed to read player state, starting fresh");
                PlayerState::default()
            }
        };
        Self {
            state: RwLock::new(state),
            store,
        }
    }

    /// Advance the game by one second.
    pub async fn tick(&self) {
        let mut state = self.state.write().await;

        state.online_seconds += 1;

        if state.online_seconds % GAIN_INTERVAL_SECS == 0 {
            state.experience += XP_PER_GAIN;
            state.energy = (state.energy - ENERGY_DRAIN_PER_GAIN).max(0.0);
        }

        // A large experience gain can cross several thresholds at once
        while state.experience >= state.experience_to_next_level as f64 {
            state.level += 1;
            state.experience -= state.experience_to_next_level as f64;
            state.experience_to_next_level =
                (state.experience_to_next_level as f64 * XP_CURVE_GROWTH).floor() as u64;
            state.energy = (state.energy + LEVEL_UP_ENERGY_BONUS).min(100.0);
            state.contribution += LEVEL_UP_CONTRIBUTION_PER_LEVEL * state.level as f64;
            info!(level = state.level, "Level up");
        }

        state.status_text = status_text_for(state.energy).to_string();

        self.persist(&state);
    }

    /// Spend contribution points. Returns false and leaves the state
    /// untouched when the balance is insufficient.
    pub async fn spend_contribution(&self, amount: f64) -> bool {
        let mut state = self.state.write().await;
        if state.contribution >= amount {
            state.contribution -= amount;
            self.persist(&state);
            true
        } else {
            false
        }
    }

    /// Credit the reward for a claimed item, scaled by level. Pure credit,
    /// no failure mode.
    pub async fn claim_reward(&self, for_level: u32) {
        let mut state = self.state.write().await;
        let reward = CLAIM_REWARD_PER_LEVEL * for_level as f64;
        state.contribution += reward;
        info!(reward, "Claimed task reward");
        self.persist(&state);
    }

    pub async fn state(&self) -> PlayerState {
        self.state.read().await.clone()
    }

    fn persist(&self, state: &PlayerState) {
        let raw = match serde_json::to_string(state) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Failed to serialize player state");
                return;
            }
        };
        if let Err(e) = self.store.set(PLAYER_STATE_KEY, &raw) {
            warn!(error = %e, "Failed to persist player state");
        }
    }
}
