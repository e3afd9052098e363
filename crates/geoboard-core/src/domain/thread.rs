use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Thread entity - a time-bounded conversation pinned to a board.
///
/// `is_archived` is only flipped by the sweep, so a thread whose `expires_at`
/// has passed may still read `is_archived = false`. Use
/// [`LifecyclePolicy::evaluate`](crate::lifecycle::LifecyclePolicy::evaluate)
/// to decide whether a thread is usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: Uuid,
    /// `None` when the board was removed or the thread was never pinned.
    pub board_id: Option<Uuid>,
    /// `None` for anonymous threads, which can never be restored.
    pub author_id: Option<Uuid>,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// `None` means the thread never expires.
    pub expires_at: Option<DateTime<Utc>>,
    pub is_archived: bool,
    pub restored_at: Option<DateTime<Utc>>,
    pub restore_count: i32,
    pub post_count: i32,
}

impl Thread {
    /// Create a new active thread expiring `lifetime` after `now`.
    pub fn new(
        board_id: Option<Uuid>,
        author_id: Option<Uuid>,
        title: String,
        content: String,
        now: DateTime<Utc>,
        lifetime: TimeDelta,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            board_id,
            author_id,
            title,
            content,
            created_at: now,
            expires_at: Some(now + lifetime),
            is_archived: false,
            restored_at: None,
            restore_count: 0,
            post_count: 0,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.author_id.is_none()
    }

    /// `expires_at` has passed (regardless of whether the sweep ran).
    pub fn is_past_expiry(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}
