//! Status-change → world-event mapping
//!
//! The bridge between raw tracker diffs and game events. A pure, total
//! function: every status change maps to exactly one event or to none.

use crate::tracker::{ItemKind, StatusChange};

const BUG_RESOLVED_STATUS: &str = "已解决";
/// Reopened shows up under two spellings depending on workspace language
const BUG_REOPENED_STATUSES: [&str; 2] = ["重新打开", "Reopened"];

/// Story progress stages, earliest first. A move to an earlier index is a
/// regression; statuses outside the sequence never produce a rollback.
const STORY_PROGRESS_STAGES: [&str; 3] = ["规划中", "实现中", "已完成"];

/// World events recognized by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldEvent {
    BugFixed,
    BugReopened,
    StoryRollback,
}

impl WorldEvent {
    /// Event id as keyed in the event-config document.
    pub fn id(&self) -> &'static str {
        match self {
            WorldEvent::BugFixed => "BUG_FIXED",
            WorldEvent::BugReopened => "BUG_REOPENED",
            WorldEvent::StoryRollback => "STORY_ROLLBACK",
        }
    }
}

/// Map a detected status change to a world event, if any.
pub fn map_status_change(change: &StatusChange) -> Option<WorldEvent> {
    match change.kind {
        ItemKind::Bug => {
            if change.to == BUG_RESOLVED_STATUS {
                Some(WorldEvent::BugFixed)
            } else if BUG_REOPENED_STATUSES.contains(&change.to.as_str()) {
                Some(WorldEvent::BugReopened)
            } else {
                None
            }
        }
        ItemKind::Story => {
            let stage = |status: &str| STORY_PROGRESS_STAGES.iter().position(|s| *s == status);
            let from = stage(&change.from)?;
            let to = stage(&change.to)?;
            (from > to).then_some(WorldEvent::StoryRollback)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(kind: ItemKind, from: &str, to: &str) -> StatusChange {
        StatusChange {
            item_id: "1".to_string(),
            kind,
            from: from.to_string(),
            to: to.to_string(),
            occurred_at: 0,
        }
    }

    #[test]
    fn test_bug_fixed_regardless_of_from() {
        for from in ["处理中", "新", "测试中"] {
            assert_eq!(
                map_status_change(&change(ItemKind::Bug, from, "已解决")),
                Some(WorldEvent::BugFixed)
            );
        }
    }

    #[test]
    fn test_bug_reopened_both_spellings() {
        assert_eq!(
            map_status_change(&change(ItemKind::Bug, "已解决", "重新打开")),
            Some(WorldEvent::BugReopened)
        );
        assert_eq!(
            map_status_change(&change(ItemKind::Bug, "已解决", "Reopened")),
            Some(WorldEvent::BugReopened)
        );
    }

    #[test]
    fn test_bug_other_transitions_map_to_nothing() {
        assert_eq!(map_status_change(&change(ItemKind::Bug, "新", "处理中")), None);
    }

    #[test]
    fn test_story_rollback_on_regression() {
        assert_eq!(
            map_status_change(&change(ItemKind::Story, "已完成", "规划中")),
            Some(WorldEvent::StoryRollback)
        );
        assert_eq!(
            map_status_change(&change(ItemKind::Story, "实现中", "规划中")),
            Some(WorldEvent::StoryRollback)
        );
    }

    #[test]
    fn test_story_forward_progress_is_not_an_event() {
        assert_eq!(
            map_status_change(&change(ItemKind::Story, "规划中", "实现中")),
            None
        );
    }

    #[test]
    fn test_story_unknown_stages_never_roll_back() {
        // Fetch-pipeline statuses are outside the progress sequence
        assert_eq!(
            map_status_change(&change(ItemKind::Story, "测试中", "规划中")),
            None
        );
        assert_eq!(
            map_status_change(&change(ItemKind::Story, "已完成", "开发中")),
            None
        );
    }
}
