//! Tracked item model and gamification rules
//!
//! Maps raw TAPD records to the unified `TrackedItem` shape, decorates the
//! secondary status with a thematic glyph, decides claimability per role
//! profile, and orders snapshots for display.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of tracker record an item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Bug,
    Story,
}

/// Unified shape for items fetched from TAPD.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedItem {
    /// Tracker-assigned stable id
    pub id: String,
    pub kind: ItemKind,
    pub name: String,
    /// Raw primary status
    pub status: String,
    pub owner: String,
    /// Secondary status field driving display and claimability
    pub v_status: String,
    /// `v_status` decorated with a thematic glyph
    pub gamified_status: String,
    /// True when the item is ready to be claimed for rewards
    pub is_claimable: bool,
}

/// Secondary statuses fetched from the tracker, pre-review through fully-tested.
pub const FETCH_STATUSES: [&str; 9] = [
    "方案中",
    "预审通过",
    "待正式评审",
    "技术方案中",
    "排期中",
    "开发中",
    "已提测",
    "测试中",
    "已测完",
];

/// Display ordering for statuses, later pipeline stages first.
const STATUS_PRIORITY: [&str; 9] = [
    "已提测",
    "测试中",
    "已测完",
    "开发中",
    "排期中",
    "待正式评审",
    "技术方案中",
    "预审通过",
    "方案中",
];

/// Translate a secondary status into its gamified display form.
///
/// Unmatched statuses pass through unchanged.
pub fn gamify_status(status: &str) -> String {
    match status {
        "预审通过" => "📖预审通过".to_string(),
        "方案中" => "📘方案中".to_string(),
        "排期中" => "🧭排期中".to_string(),
        "开发中" => "🔧开发中".to_string(),
        "已提测" => "✅已提测".to_string(),
        "测试中" => "🔬测试中".to_string(),
        "已测完" => "✅已测完".to_string(),
        _ => status.to_string(),
    }
}

/// Statuses claimable for the given role field.
///
/// Unknown or missing role falls back to the developer profile.
pub fn claimable_statuses(user_role_field: Option<&str>) -> &'static [&'static str] {
    match user_role_field {
        // Product manager
        Some("custom_field_9") => &["排期中", "开发中", "已提测", "测试中", "已测完"],
        // Tester
        Some("custom_field_10") => &["已测完"],
        // Developer (default)
        _ => &["已提测", "测试中", "已测完"],
    }
}

fn priority_rank(v_status: &str) -> usize {
    STATUS_PRIORITY
        .iter()
        .position(|s| *s == v_status)
        .unwrap_or(usize::MAX)
}

/// Sort a snapshot for display: claimable items first, then by status
/// priority. Statuses outside the priority sequence sort last within their
/// group. The sort is stable, so equal-rank items keep their fetch order.
pub fn sort_snapshot(items: &mut [TrackedItem]) {
    items.sort_by_key(|item| (!item.is_claimable, priority_rank(&item.v_status)));
}

impl TrackedItem {
    /// Build a `TrackedItem` from one entry of the tracker's response
    /// envelope (a wrapper object keyed by record type containing the actual
    /// record). Returns `None` for entries without a usable record or id.
    pub fn from_envelope_entry(entry: &Value, claimable: &[&str]) -> Option<TrackedItem> {
        let (kind, record) = if let Some(record) = entry.get("Story") {
            (ItemKind::Story, record)
        } else if let Some(record) = entry.get("Bug") {
            (ItemKind::Bug, record)
        } else {
            return None;
        };

        let id = text_field(record, "id")?;
        let v_status = text_field(record, "v_status").unwrap_or_default();

        Some(TrackedItem {
            gamified_status: gamify_status(&v_status),
            is_claimable: claimable.contains(&v_status.as_str()),
            id,
            kind,
            name: text_field(record, "name").unwrap_or_default(),
            status: text_field(record, "status").unwrap_or_default(),
            owner: text_field(record, "owner").unwrap_or_default(),
            v_status,
        })
    }
}

// TAPD serializes some numeric fields as numbers and some as strings
// depending on the record type; accept both.
fn text_field(record: &Value, name: &str) -> Option<String> {
    match record.get(name)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
