use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Board, Post, Thread};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Board repository.
#[async_trait]
pub trait BoardRepository: BaseRepository<Board, Uuid> {
    /// Every board, unordered. Ranking happens in the geofence evaluator.
    async fn list_all(&self) -> Result<Vec<Board>, RepoError>;
}

/// Counts of threads per lifecycle state at a point in time.
///
/// `active` includes `expiring_soon`; `expired_pending` are past expiry but
/// not yet archived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleStats {
    pub total: u64,
    pub active: u64,
    pub expiring_soon: u64,
    pub expired_pending: u64,
    pub archived: u64,
    pub restored: u64,
}

/// Thread repository.
#[async_trait]
pub trait ThreadRepository: BaseRepository<Thread, Uuid> {
    /// Non-archived threads of a board that have not expired, newest first.
    async fn list_live_for_board(
        &self,
        board_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Thread>, RepoError>;

    /// Archive every thread with `is_archived = false AND expires_at < now`
    /// in one batch. Returns the ids that were archived.
    async fn archive_expired(&self, now: DateTime<Utc>) -> Result<Vec<Uuid>, RepoError>;

    /// Conditionally restore a thread in a single atomic write.
    ///
    /// Matches only when `id`, `author_id = requester`, `restore_count = 0`
    /// and the thread is archived or past expiry. Returns `None` when no row
    /// matched.
    async fn try_restore(
        &self,
        id: Uuid,
        requester: Uuid,
        now: DateTime<Utc>,
        new_expiry: DateTime<Utc>,
    ) -> Result<Option<Thread>, RepoError>;

    async fn lifecycle_stats(
        &self,
        now: DateTime<Utc>,
        expiring_before: DateTime<Utc>,
    ) -> Result<LifecycleStats, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Posts of a thread, oldest first.
    async fn find_by_thread_id(&self, thread_id: Uuid) -> Result<Vec<Post>, RepoError>;

    /// Insert a post and bump its thread's post counter together.
    async fn append(&self, post: Post) -> Result<Post, RepoError>;
}
