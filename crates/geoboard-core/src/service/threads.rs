use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Post, Thread};
use crate::error::DomainError;
use crate::geo::Observer;
use crate::lifecycle::{LifecyclePolicy, LifecycleView};
use crate::ports::{PostRepository, ThreadRepository};

use super::boards::BoardService;

pub const MAX_TITLE_CHARS: usize = 100;
pub const MAX_CONTENT_CHARS: usize = 2000;

/// User-supplied fields of a new thread.
#[derive(Debug, Clone)]
pub struct NewThreadInput {
    pub title: String,
    pub content: String,
}

/// A thread together with its derived lifecycle state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadView {
    pub thread: Thread,
    pub lifecycle: LifecycleView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadDetails {
    #[serde(flatten)]
    pub view: ThreadView,
    /// Missing when the thread is orphaned or the board lookup failed.
    pub board_name: Option<String>,
    pub posts: Vec<Post>,
}

#[derive(Clone)]
pub struct ThreadService {
    boards: BoardService,
    threads: Arc<dyn ThreadRepository>,
    posts: Arc<dyn PostRepository>,
    policy: LifecyclePolicy,
}

impl ThreadService {
    pub fn new(
        boards: BoardService,
        threads: Arc<dyn ThreadRepository>,
        posts: Arc<dyn PostRepository>,
        policy: LifecyclePolicy,
    ) -> Self {
        Self {
            boards,
            threads,
            posts,
            policy,
        }
    }

    fn view(&self, thread: Thread, now: DateTime<Utc>) -> ThreadView {
        let lifecycle = self.policy.evaluate(&thread, now);
        ThreadView { thread, lifecycle }
    }

    /// Live threads of a board the observer can see.
    pub async fn list_for_board(
        &self,
        board_id: Uuid,
        observer: Observer,
        now: DateTime<Utc>,
    ) -> Result<Vec<ThreadView>, DomainError> {
        self.boards.ensure_viewable(board_id, observer).await?;

        let threads = self.threads.list_live_for_board(board_id, now).await?;
        Ok(threads.into_iter().map(|t| self.view(t, now)).collect())
    }

    /// Open a thread on a board. The observer must be inside the access radius.
    pub async fn create(
        &self,
        board_id: Uuid,
        author: Option<Uuid>,
        observer: Observer,
        input: NewThreadInput,
        now: DateTime<Utc>,
    ) -> Result<ThreadView, DomainError> {
        let title = validate_text("title", &input.title, MAX_TITLE_CHARS)?;
        let content = validate_text("content", &input.content, MAX_CONTENT_CHARS)?;

        self.boards.ensure_accessible(board_id, observer).await?;

        let thread = Thread::new(
            Some(board_id),
            author,
            title,
            content,
            now,
            self.policy.lifetime(),
        );
        let saved = self.threads.save(thread).await?;

        tracing::info!(
            thread_id = %saved.id,
            board_id = %board_id,
            anonymous = saved.is_anonymous(),
            "Thread created"
        );

        Ok(self.view(saved, now))
    }

    /// Thread with its posts, regardless of lifecycle state.
    ///
    /// A known observer outside the board's view radius is refused; orphaned
    /// threads are readable from anywhere.
    pub async fn get(
        &self,
        id: Uuid,
        observer: Observer,
        now: DateTime<Utc>,
    ) -> Result<ThreadDetails, DomainError> {
        let thread = self.find(id).await?;

        let board_name = match thread.board_id {
            Some(board_id) if observer.is_known() => {
                Some(self.boards.ensure_viewable(board_id, observer).await?.name)
            }
            Some(board_id) => self.boards.name_of(board_id).await,
            None => None,
        };

        let posts = self.posts.find_by_thread_id(id).await?;

        Ok(ThreadDetails {
            view: self.view(thread, now),
            board_name,
            posts,
        })
    }

    /// Reply to a live thread from inside its board's access radius.
    pub async fn add_post(
        &self,
        thread_id: Uuid,
        author: Option<Uuid>,
        observer: Observer,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<Post, DomainError> {
        let content = validate_text("content", content, MAX_CONTENT_CHARS)?;

        let thread = self.find(thread_id).await?;
        if !self.policy.accepts_posts(&thread, now) {
            return Err(DomainError::ThreadClosed { thread_id });
        }
        if let Some(board_id) = thread.board_id {
            self.boards.ensure_accessible(board_id, observer).await?;
        }

        let post = self
            .posts
            .append(Post::new(thread_id, author, content, now))
            .await?;

        tracing::debug!(post_id = %post.id, thread_id = %thread_id, "Post appended");
        Ok(post)
    }

    async fn find(&self, id: Uuid) -> Result<Thread, DomainError> {
        self.threads
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound {
                entity_type: "thread",
                id,
            })
    }
}

fn validate_text(field: &str, value: &str, max_chars: usize) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > max_chars {
        return Err(DomainError::Validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(trimmed.to_string())
}
