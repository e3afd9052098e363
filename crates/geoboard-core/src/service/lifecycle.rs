use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Thread;
use crate::error::DomainError;
use crate::lifecycle::{LifecyclePolicy, RestoreRejection};
use crate::ports::{LifecycleStats, ThreadRepository};

/// Outcome of one archive sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub archived: usize,
    pub thread_ids: Vec<Uuid>,
}

/// The two mutating lifecycle transitions plus reporting.
#[derive(Clone)]
pub struct LifecycleService {
    threads: Arc<dyn ThreadRepository>,
    policy: LifecyclePolicy,
}

impl LifecycleService {
    pub fn new(threads: Arc<dyn ThreadRepository>, policy: LifecyclePolicy) -> Self {
        Self { threads, policy }
    }

    pub fn policy(&self) -> &LifecyclePolicy {
        &self.policy
    }

    /// Archive every expired, non-archived thread.
    ///
    /// Safe to run concurrently or repeatedly: the selection predicate no
    /// longer matches a row once it is archived.
    pub async fn archive_expired(&self, now: DateTime<Utc>) -> Result<SweepReport, DomainError> {
        let thread_ids = self.threads.archive_expired(now).await?;

        if thread_ids.is_empty() {
            tracing::debug!("Archive sweep found nothing to do");
        } else {
            tracing::info!(archived = thread_ids.len(), "Archive sweep finished");
        }

        Ok(SweepReport {
            archived: thread_ids.len(),
            thread_ids,
        })
    }

    /// Restore a thread for its author, at most once.
    ///
    /// The write is a single conditional update; when it matches nothing the
    /// thread is re-read only to pick the rejection reason.
    pub async fn restore(
        &self,
        thread_id: Uuid,
        requester: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Thread, DomainError> {
        let new_expiry = self.policy.expiry_from(now);

        if let Some(thread) = self
            .threads
            .try_restore(thread_id, requester, now, new_expiry)
            .await?
        {
            tracing::info!(
                thread_id = %thread_id,
                expires_at = %new_expiry,
                "Thread restored"
            );
            return Ok(thread);
        }

        let current = self.threads.find_by_id(thread_id).await?;
        let rejection = match self.policy.check_restore(current.as_ref(), requester, now) {
            Err(rejection) => rejection,
            Ok(()) => {
                // Conditional write lost to a concurrent change that has
                // since been undone; the only such change is a restore.
                tracing::warn!(thread_id = %thread_id, "Restore write matched no row");
                RestoreRejection::AlreadyRestored
            }
        };

        tracing::debug!(
            thread_id = %thread_id,
            reason = rejection.reason(),
            "Restore rejected"
        );
        Err(DomainError::RestoreRejected(rejection))
    }

    pub async fn stats(&self, now: DateTime<Utc>) -> Result<LifecycleStats, DomainError> {
        let expiring_before = now + self.policy.expiring_window();
        Ok(self.threads.lifecycle_stats(now, expiring_before).await?)
    }
}
