//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use uuid::Uuid;

use geoboard_core::domain::{Board, Post, Thread};
use geoboard_core::error::RepoError;
use geoboard_core::ports::{BoardRepository, LifecycleStats, PostRepository, ThreadRepository};

use super::entity::board::{self, Entity as BoardEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::thread::{self, Entity as ThreadEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL board repository.
pub type PostgresBoardRepository = PostgresBaseRepository<BoardEntity>;

/// PostgreSQL thread repository.
pub type PostgresThreadRepository = PostgresBaseRepository<ThreadEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

#[async_trait]
impl BoardRepository for PostgresBoardRepository {
    async fn list_all(&self) -> Result<Vec<Board>, RepoError> {
        let result = BoardEntity::find()
            .order_by_asc(board::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// `expires_at IS NULL OR expires_at > now`
fn not_expired(now: DateTime<Utc>) -> Condition {
    Condition::any()
        .add(thread::Column::ExpiresAt.is_null())
        .add(thread::Column::ExpiresAt.gt(now))
}

#[async_trait]
impl ThreadRepository for PostgresThreadRepository {
    async fn list_live_for_board(
        &self,
        board_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Thread>, RepoError> {
        let result = ThreadEntity::find()
            .filter(thread::Column::BoardId.eq(board_id))
            .filter(thread::Column::IsArchived.eq(false))
            .filter(not_expired(now))
            .order_by_desc(thread::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn archive_expired(&self, now: DateTime<Utc>) -> Result<Vec<Uuid>, RepoError> {
        let archived = ThreadEntity::update_many()
            .col_expr(thread::Column::IsArchived, Expr::value(true))
            .filter(thread::Column::IsArchived.eq(false))
            .filter(thread::Column::ExpiresAt.lt(now))
            .exec_with_returning(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(archived.into_iter().map(|model| model.id).collect())
    }

    async fn try_restore(
        &self,
        id: Uuid,
        requester: Uuid,
        now: DateTime<Utc>,
        new_expiry: DateTime<Utc>,
    ) -> Result<Option<Thread>, RepoError> {
        // One statement: the restore_count guard and the increment cannot
        // interleave with a concurrent restore.
        let restored = ThreadEntity::update_many()
            .col_expr(thread::Column::IsArchived, Expr::value(false))
            .col_expr(thread::Column::ExpiresAt, Expr::value(new_expiry))
            .col_expr(thread::Column::RestoredAt, Expr::value(now))
            .col_expr(
                thread::Column::RestoreCount,
                Expr::col(thread::Column::RestoreCount).add(1),
            )
            .filter(thread::Column::Id.eq(id))
            .filter(thread::Column::AuthorId.eq(requester))
            .filter(thread::Column::RestoreCount.eq(0))
            .filter(
                Condition::any()
                    .add(thread::Column::IsArchived.eq(true))
                    .add(thread::Column::ExpiresAt.lte(now)),
            )
            .exec_with_returning(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(restored.into_iter().next().map(Into::into))
    }

    async fn lifecycle_stats(
        &self,
        now: DateTime<Utc>,
        expiring_before: DateTime<Utc>,
    ) -> Result<LifecycleStats, RepoError> {
        let live = || {
            ThreadEntity::find()
                .filter(thread::Column::IsArchived.eq(false))
                .filter(not_expired(now))
        };

        let total = ThreadEntity::find()
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        let active = live().count(self.db.as_ref()).await.map_err(map_db_err)?;
        let expiring_soon = live()
            .filter(thread::Column::ExpiresAt.lte(expiring_before))
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        let expired_pending = ThreadEntity::find()
            .filter(thread::Column::IsArchived.eq(false))
            .filter(thread::Column::ExpiresAt.lte(now))
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        let archived = ThreadEntity::find()
            .filter(thread::Column::IsArchived.eq(true))
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        let restored = ThreadEntity::find()
            .filter(thread::Column::RestoreCount.gt(0))
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(LifecycleStats {
            total,
            active,
            expiring_soon,
            expired_pending,
            archived,
            restored,
        })
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_thread_id(&self, thread_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::ThreadId.eq(thread_id))
            .order_by_asc(post::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn append(&self, new_post: Post) -> Result<Post, RepoError> {
        let thread_id = new_post.thread_id;
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let model = PostEntity::insert(post::ActiveModel::from(new_post))
            .exec_with_returning(&txn)
            .await
            .map_err(map_db_err)?;

        let bumped = ThreadEntity::update_many()
            .col_expr(
                thread::Column::PostCount,
                Expr::col(thread::Column::PostCount).add(1),
            )
            .filter(thread::Column::Id.eq(thread_id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;
        if bumped.rows_affected == 0 {
            // Dropping the transaction rolls the insert back.
            return Err(RepoError::NotFound);
        }

        txn.commit().await.map_err(map_db_err)?;
        Ok(model.into())
    }
}
