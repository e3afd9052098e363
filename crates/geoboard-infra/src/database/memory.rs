//! In-memory repositories - used when no database is configured and in tests.
//!
//! Every mutating call holds the write lock for its whole check-and-write, so
//! the conditional restore is as atomic here as the SQL version.
//! Note: Data is lost on process restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use geoboard_core::domain::{Board, Post, Thread};
use geoboard_core::error::RepoError;
use geoboard_core::lifecycle::LifecyclePolicy;
use geoboard_core::ports::{
    BaseRepository, BoardRepository, LifecycleStats, PostRepository, ThreadRepository,
};

#[derive(Default)]
struct Tables {
    boards: HashMap<Uuid, Board>,
    threads: HashMap<Uuid, Thread>,
    posts: HashMap<Uuid, Post>,
}

/// Board, thread and post tables behind one async lock.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the given boards already loaded.
    pub fn with_boards(boards: impl IntoIterator<Item = Board>) -> Self {
        let tables = Tables {
            boards: boards.into_iter().map(|b| (b.id, b)).collect(),
            ..Tables::default()
        };
        Self {
            tables: Arc::new(RwLock::new(tables)),
        }
    }
}

fn is_live(thread: &Thread, now: DateTime<Utc>) -> bool {
    !thread.is_archived && !thread.is_past_expiry(now)
}

#[async_trait]
impl BaseRepository<Board, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Board>, RepoError> {
        Ok(self.tables.read().await.boards.get(&id).cloned())
    }

    async fn save(&self, board: Board) -> Result<Board, RepoError> {
        let mut tables = self.tables.write().await;
        tables.boards.insert(board.id, board.clone());
        Ok(board)
    }

    /// Threads of a deleted board become orphans.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.boards.remove(&id).ok_or(RepoError::NotFound)?;
        for thread in tables.threads.values_mut() {
            if thread.board_id == Some(id) {
                thread.board_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl BoardRepository for InMemoryStore {
    async fn list_all(&self) -> Result<Vec<Board>, RepoError> {
        let mut boards: Vec<Board> = self.tables.read().await.boards.values().cloned().collect();
        boards.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(boards)
    }
}

#[async_trait]
impl BaseRepository<Thread, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Thread>, RepoError> {
        Ok(self.tables.read().await.threads.get(&id).cloned())
    }

    async fn save(&self, thread: Thread) -> Result<Thread, RepoError> {
        let mut tables = self.tables.write().await;
        if let Some(board_id) = thread.board_id {
            if !tables.boards.contains_key(&board_id) {
                return Err(RepoError::Constraint(format!(
                    "board {board_id} does not exist"
                )));
            }
        }
        tables.threads.insert(thread.id, thread.clone());
        Ok(thread)
    }

    /// Posts of a deleted thread go with it.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.threads.remove(&id).ok_or(RepoError::NotFound)?;
        tables.posts.retain(|_, post| post.thread_id != id);
        Ok(())
    }
}

#[async_trait]
impl ThreadRepository for InMemoryStore {
    async fn list_live_for_board(
        &self,
        board_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Thread>, RepoError> {
        let tables = self.tables.read().await;
        let mut threads: Vec<Thread> = tables
            .threads
            .values()
            .filter(|t| t.board_id == Some(board_id) && is_live(t, now))
            .cloned()
            .collect();
        threads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(threads)
    }

    async fn archive_expired(&self, now: DateTime<Utc>) -> Result<Vec<Uuid>, RepoError> {
        let mut tables = self.tables.write().await;
        let mut archived = Vec::new();
        for thread in tables.threads.values_mut() {
            if LifecyclePolicy::is_sweepable(thread, now) {
                thread.is_archived = true;
                archived.push(thread.id);
            }
        }
        Ok(archived)
    }

    async fn try_restore(
        &self,
        id: Uuid,
        requester: Uuid,
        now: DateTime<Utc>,
        new_expiry: DateTime<Utc>,
    ) -> Result<Option<Thread>, RepoError> {
        let mut tables = self.tables.write().await;
        let Some(thread) = tables.threads.get_mut(&id) else {
            return Ok(None);
        };

        let matches = thread.author_id == Some(requester)
            && thread.restore_count == 0
            && (thread.is_archived || thread.is_past_expiry(now));
        if !matches {
            return Ok(None);
        }

        thread.is_archived = false;
        thread.expires_at = Some(new_expiry);
        thread.restored_at = Some(now);
        thread.restore_count += 1;
        Ok(Some(thread.clone()))
    }

    async fn lifecycle_stats(
        &self,
        now: DateTime<Utc>,
        expiring_before: DateTime<Utc>,
    ) -> Result<LifecycleStats, RepoError> {
        let tables = self.tables.read().await;
        let mut stats = LifecycleStats::default();

        for thread in tables.threads.values() {
            stats.total += 1;
            if thread.restore_count > 0 {
                stats.restored += 1;
            }
            if thread.is_archived {
                stats.archived += 1;
            } else if thread.is_past_expiry(now) {
                stats.expired_pending += 1;
            } else {
                stats.active += 1;
                if thread.expires_at.is_some_and(|e| e <= expiring_before) {
                    stats.expiring_soon += 1;
                }
            }
        }

        Ok(stats)
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.threads.contains_key(&post.thread_id) {
            return Err(RepoError::Constraint(format!(
                "thread {} does not exist",
                post.thread_id
            )));
        }
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.posts.remove(&id).ok_or(RepoError::NotFound)?;
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn find_by_thread_id(&self, thread_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables
            .posts
            .values()
            .filter(|p| p.thread_id == thread_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(posts)
    }

    async fn append(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        let thread = tables
            .threads
            .get_mut(&post.thread_id)
            .ok_or(RepoError::NotFound)?;
        thread.post_count += 1;
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use geoboard_core::DomainError;
    use geoboard_core::domain::{BoardCategory, NewBoard};
    use geoboard_core::geo::{Coordinate, Observer};
    use geoboard_core::geofence::GeofenceEvaluator;
    use geoboard_core::lifecycle::{RestoreRejection, ThreadStatus};
    use geoboard_core::service::{
        BoardService, LifecycleService, NewThreadInput, ThreadService,
    };

    use super::*;

    struct Harness {
        store: InMemoryStore,
        board: Board,
        threads: ThreadService,
        lifecycle: LifecycleService,
    }

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-04-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn at_board() -> Observer {
        Observer::at(Coordinate::new(35.6580, 139.7020))
    }

    fn harness() -> Harness {
        let board = Board::new(NewBoard {
            name: "Shibuya Station".to_string(),
            category: BoardCategory::Station,
            location: Coordinate::new(35.6580, 139.7016),
            access_radius_m: 300.0,
            view_radius_m: 1500.0,
            description: "Hachiko side".to_string(),
        })
        .unwrap();

        let store = InMemoryStore::with_boards([board.clone()]);
        let repo = Arc::new(store.clone());
        let policy = LifecyclePolicy::default();
        let boards = BoardService::new(repo.clone(), GeofenceEvaluator::default());

        Harness {
            threads: ThreadService::new(boards, repo.clone(), repo.clone(), policy),
            lifecycle: LifecycleService::new(repo, policy),
            store,
            board,
        }
    }

    async fn create(h: &Harness, author: Option<Uuid>) -> Thread {
        h.threads
            .create(
                h.board.id,
                author,
                at_board(),
                NewThreadInput {
                    title: "Street musician tonight".to_string(),
                    content: "Anyone know the name of the band?".to_string(),
                },
                t0(),
            )
            .await
            .unwrap()
            .thread
    }

    #[tokio::test]
    async fn test_sweep_is_idempotent() {
        let h = harness();
        let a = create(&h, None).await;
        let b = create(&h, Some(Uuid::new_v4())).await;
        let later = t0() + TimeDelta::hours(73);

        let first = h.lifecycle.archive_expired(later).await.unwrap();
        assert_eq!(first.archived, 2);
        assert!(first.thread_ids.contains(&a.id));
        assert!(first.thread_ids.contains(&b.id));

        let second = h.lifecycle.archive_expired(later).await.unwrap();
        assert_eq!(second.archived, 0);
        assert!(second.thread_ids.is_empty());
    }

    #[tokio::test]
    async fn test_sweep_skips_live_threads() {
        let h = harness();
        create(&h, None).await;

        let report = h.lifecycle.archive_expired(t0() + TimeDelta::hours(71)).await.unwrap();
        assert_eq!(report.archived, 0);
    }

    #[tokio::test]
    async fn test_lifecycle_scenario() {
        let h = harness();
        let author = Uuid::new_v4();
        let thread = create(&h, Some(author)).await;

        let at_73h = t0() + TimeDelta::hours(73);
        let details = h.threads.get(thread.id, Observer::UNKNOWN, at_73h).await.unwrap();
        assert_eq!(details.view.lifecycle.status, ThreadStatus::Expired);

        h.lifecycle.archive_expired(at_73h).await.unwrap();
        let details = h.threads.get(thread.id, Observer::UNKNOWN, at_73h).await.unwrap();
        assert!(details.view.thread.is_archived);
        assert_eq!(details.view.lifecycle.status, ThreadStatus::Archived);
        assert!(details.view.lifecycle.can_restore);

        let restore_time = t0() + TimeDelta::hours(75);
        let restored = h.lifecycle.restore(thread.id, author, restore_time).await.unwrap();
        assert!(!restored.is_archived);
        assert_eq!(restored.restore_count, 1);
        assert_eq!(restored.restored_at, Some(restore_time));
        assert_eq!(restored.expires_at, Some(restore_time + TimeDelta::hours(72)));

        let second = h.lifecycle.restore(thread.id, author, restore_time).await;
        assert!(matches!(
            second,
            Err(DomainError::RestoreRejected(RestoreRejection::AlreadyRestored))
        ));

        // Expire and sweep again: the second restore is refused for good.
        let much_later = restore_time + TimeDelta::hours(80);
        h.lifecycle.archive_expired(much_later).await.unwrap();
        let third = h.lifecycle.restore(thread.id, author, much_later).await;
        assert!(matches!(
            third,
            Err(DomainError::RestoreRejected(RestoreRejection::AlreadyRestored))
        ));
    }

    #[tokio::test]
    async fn test_restore_expired_before_sweep() {
        let h = harness();
        let author = Uuid::new_v4();
        let thread = create(&h, Some(author)).await;

        let restored = h
            .lifecycle
            .restore(thread.id, author, t0() + TimeDelta::hours(73))
            .await
            .unwrap();
        assert_eq!(restored.restore_count, 1);
        assert!(!restored.is_archived);
    }

    #[tokio::test]
    async fn test_restore_rejections() {
        let h = harness();
        let author = Uuid::new_v4();
        let owned = create(&h, Some(author)).await;
        let anonymous = create(&h, None).await;
        let expired = t0() + TimeDelta::hours(80);

        let reason = |result: Result<Thread, DomainError>| match result {
            Err(DomainError::RestoreRejected(rejection)) => rejection,
            other => panic!("expected rejection, got {other:?}"),
        };

        assert_eq!(
            reason(h.lifecycle.restore(owned.id, author, t0()).await),
            RestoreRejection::NotExpired
        );
        assert_eq!(
            reason(h.lifecycle.restore(owned.id, Uuid::new_v4(), expired).await),
            RestoreRejection::NotFoundOrForbidden
        );
        assert_eq!(
            reason(h.lifecycle.restore(Uuid::new_v4(), author, expired).await),
            RestoreRejection::NotFoundOrForbidden
        );
        assert_eq!(
            reason(h.lifecycle.restore(anonymous.id, author, expired).await),
            RestoreRejection::AnonymousNotRestorable
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_restores_succeed_once() {
        let h = harness();
        let author = Uuid::new_v4();
        let thread = create(&h, Some(author)).await;
        let now = t0() + TimeDelta::hours(74);
        h.lifecycle.archive_expired(now).await.unwrap();

        let thread_id = thread.id;
        let attempts: Vec<_> = (0..8)
            .map(|_| {
                let lifecycle = h.lifecycle.clone();
                tokio::spawn(async move { lifecycle.restore(thread_id, author, now).await })
            })
            .collect();

        let mut successes = 0;
        for attempt in attempts {
            if attempt.await.unwrap().is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);

        let stored: Option<Thread> = BaseRepository::<Thread, Uuid>::find_by_id(&h.store, thread.id)
            .await
            .unwrap();
        assert_eq!(stored.unwrap().restore_count, 1);
    }

    #[tokio::test]
    async fn test_create_requires_access_radius() {
        let h = harness();
        let input = NewThreadInput {
            title: "Hello".to_string(),
            content: "From far away".to_string(),
        };

        let far = Observer::at(Coordinate::new(35.6762, 139.6503));
        let result = h.threads.create(h.board.id, None, far, input.clone(), t0()).await;
        assert!(matches!(result, Err(DomainError::OutsideAccessRadius { .. })));

        let unknown = h.threads.create(h.board.id, None, Observer::UNKNOWN, input, t0()).await;
        assert!(matches!(unknown, Err(DomainError::OutsideAccessRadius { .. })));
    }

    #[tokio::test]
    async fn test_list_for_board_hides_expired_and_gates_view() {
        let h = harness();
        let old = create(&h, None).await;
        let fresh = h
            .threads
            .create(
                h.board.id,
                None,
                at_board(),
                NewThreadInput {
                    title: "Later".to_string(),
                    content: "Posted a day later".to_string(),
                },
                t0() + TimeDelta::hours(24),
            )
            .await
            .unwrap()
            .thread;

        let now = t0() + TimeDelta::hours(80);
        let listed = h.threads.list_for_board(h.board.id, Observer::UNKNOWN, now).await.unwrap();
        let ids: Vec<_> = listed.iter().map(|v| v.thread.id).collect();
        assert_eq!(ids, vec![fresh.id]);
        assert!(!ids.contains(&old.id));
        assert_eq!(listed[0].lifecycle.status, ThreadStatus::Active);

        let far = Observer::at(Coordinate::new(35.6762, 139.6503));
        let hidden = h.threads.list_for_board(h.board.id, far, now).await;
        assert!(matches!(hidden, Err(DomainError::OutsideViewRadius { .. })));
    }

    #[tokio::test]
    async fn test_get_gates_view_for_known_observers() {
        let h = harness();
        let thread = create(&h, None).await;

        let far = Observer::at(Coordinate::new(35.6762, 139.6503));
        let hidden = h.threads.get(thread.id, far, t0()).await;
        assert!(matches!(hidden, Err(DomainError::OutsideViewRadius { .. })));

        let near = h.threads.get(thread.id, at_board(), t0()).await.unwrap();
        assert_eq!(near.board_name.as_deref(), Some("Shibuya Station"));

        let unknown = h.threads.get(thread.id, Observer::UNKNOWN, t0()).await;
        assert!(unknown.is_ok());
    }

    #[tokio::test]
    async fn test_add_post_bumps_counter_and_respects_lifecycle() {
        let h = harness();
        let thread = create(&h, None).await;

        let post = h
            .threads
            .add_post(thread.id, None, at_board(), "Me too!", t0() + TimeDelta::hours(1))
            .await
            .unwrap();
        assert_eq!(post.thread_id, thread.id);

        let details = h
            .threads
            .get(thread.id, Observer::UNKNOWN, t0() + TimeDelta::hours(1))
            .await
            .unwrap();
        assert_eq!(details.view.thread.post_count, 1);
        assert_eq!(details.posts.len(), 1);
        assert_eq!(details.board_name.as_deref(), Some("Shibuya Station"));

        let closed = h
            .threads
            .add_post(thread.id, None, at_board(), "Too late", t0() + TimeDelta::hours(73))
            .await;
        assert!(matches!(closed, Err(DomainError::ThreadClosed { .. })));
    }

    #[tokio::test]
    async fn test_deleting_board_orphans_threads() {
        let h = harness();
        let thread = create(&h, None).await;

        BaseRepository::<Board, Uuid>::delete(&h.store, h.board.id)
            .await
            .unwrap();

        let details = h.threads.get(thread.id, Observer::UNKNOWN, t0()).await.unwrap();
        assert_eq!(details.view.thread.board_id, None);
        assert_eq!(details.board_name, None);
    }

    #[tokio::test]
    async fn test_lifecycle_stats() {
        let h = harness();
        let author = Uuid::new_v4();
        let restored = create(&h, Some(author)).await;
        create(&h, None).await;

        let now = t0() + TimeDelta::hours(73);
        h.lifecycle.archive_expired(now).await.unwrap();
        h.lifecycle.restore(restored.id, author, now).await.unwrap();

        let stats = h.lifecycle.stats(now).await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.archived, 1);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.restored, 1);
        assert_eq!(stats.expired_pending, 0);
        assert_eq!(stats.expiring_soon, 0);

        let near_end = now + TimeDelta::hours(70);
        let stats = h.lifecycle.stats(near_end).await.unwrap();
        assert_eq!(stats.expiring_soon, 1);
    }
}
