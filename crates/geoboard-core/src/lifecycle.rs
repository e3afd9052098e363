//! Thread lifecycle state machine.
//!
//! ```text
//! active -> expiring-soon -> expired -> archived -> (restore, once) -> active
//! ```
//!
//! `expired` is never stored: it is what a thread looks like between passing
//! its `expires_at` and the next sweep. Status is always derived from the
//! stored fields and the current time, never from `is_archived` alone.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Thread;

/// Lifetime granted at creation and again at restore.
pub const DEFAULT_THREAD_LIFETIME_HOURS: i64 = 72;

/// Threads this close to expiry report `expiring-soon`.
pub const EXPIRING_SOON_HOURS: i64 = 6;

/// Lowest fade hint handed to clients.
pub const MIN_FADE_FACTOR: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThreadStatus {
    Active,
    ExpiringSoon,
    /// Past `expires_at`, waiting for the sweep.
    Expired,
    Archived,
}

/// Derived lifecycle state of a thread at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LifecycleView {
    pub status: ThreadStatus,
    pub can_restore: bool,
    /// Presentation hint in `[0.3, 1.0]`; not a behavioral gate.
    pub fade_factor: f64,
    /// Seconds until expiry, `None` when the thread never expires or is
    /// already past it.
    pub expires_in_secs: Option<i64>,
}

/// Why a restore was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreRejection {
    /// Thread does not exist or belongs to someone else. The two are
    /// deliberately indistinguishable.
    NotFoundOrForbidden,
    AnonymousNotRestorable,
    NotExpired,
    AlreadyRestored,
}

impl RestoreRejection {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NotFoundOrForbidden => "not-found-or-forbidden",
            Self::AnonymousNotRestorable => "anonymous-not-restorable",
            Self::NotExpired => "not-expired",
            Self::AlreadyRestored => "already-restored",
        }
    }
}

/// Timing rules for threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecyclePolicy {
    lifetime: TimeDelta,
    expiring_window: TimeDelta,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self::from_hours(DEFAULT_THREAD_LIFETIME_HOURS)
    }
}

impl LifecyclePolicy {
    pub fn new(lifetime: TimeDelta) -> Self {
        Self {
            lifetime,
            expiring_window: TimeDelta::hours(EXPIRING_SOON_HOURS),
        }
    }

    pub fn from_hours(hours: i64) -> Self {
        Self::new(TimeDelta::hours(hours))
    }

    pub fn lifetime(&self) -> TimeDelta {
        self.lifetime
    }

    pub fn expiring_window(&self) -> TimeDelta {
        self.expiring_window
    }

    /// Expiry for a thread created or restored at `now`.
    pub fn expiry_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.lifetime
    }

    pub fn status(&self, thread: &Thread, now: DateTime<Utc>) -> ThreadStatus {
        if thread.is_archived {
            return ThreadStatus::Archived;
        }
        match thread.expires_at {
            Some(expires_at) if expires_at <= now => ThreadStatus::Expired,
            Some(expires_at) if expires_at - now <= self.expiring_window => {
                ThreadStatus::ExpiringSoon
            }
            _ => ThreadStatus::Active,
        }
    }

    pub fn evaluate(&self, thread: &Thread, now: DateTime<Utc>) -> LifecycleView {
        let status = self.status(thread, now);

        let remaining = thread
            .expires_at
            .map(|expires_at| expires_at - now)
            .filter(|remaining| *remaining > TimeDelta::zero());

        let fade_factor = match (status, remaining) {
            (ThreadStatus::ExpiringSoon, Some(remaining)) => {
                let window = self.expiring_window.num_seconds() as f64;
                let ratio = remaining.num_seconds() as f64 / window;
                ratio.clamp(MIN_FADE_FACTOR, 1.0)
            }
            _ => 1.0,
        };

        LifecycleView {
            status,
            can_restore: self.can_restore(thread, now),
            fade_factor,
            expires_in_secs: remaining.map(|r| r.num_seconds()),
        }
    }

    /// Whether the author could restore this thread right now.
    ///
    /// Expired-but-unswept threads count: restore performs the archive step
    /// implicitly.
    pub fn can_restore(&self, thread: &Thread, now: DateTime<Utc>) -> bool {
        !thread.is_anonymous()
            && thread.restore_count == 0
            && matches!(
                self.status(thread, now),
                ThreadStatus::Archived | ThreadStatus::Expired
            )
    }

    /// Check every restore precondition, in order.
    pub fn check_restore(
        &self,
        thread: Option<&Thread>,
        requester: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), RestoreRejection> {
        let thread = thread.ok_or(RestoreRejection::NotFoundOrForbidden)?;

        let author = thread
            .author_id
            .ok_or(RestoreRejection::AnonymousNotRestorable)?;
        if author != requester {
            return Err(RestoreRejection::NotFoundOrForbidden);
        }
        if thread.restore_count != 0 {
            return Err(RestoreRejection::AlreadyRestored);
        }
        if !matches!(
            self.status(thread, now),
            ThreadStatus::Archived | ThreadStatus::Expired
        ) {
            return Err(RestoreRejection::NotExpired);
        }
        Ok(())
    }

    /// Apply the restore effect. Callers must have passed `check_restore`
    /// under the same lock or as part of the same conditional write.
    pub fn apply_restore(&self, thread: &mut Thread, now: DateTime<Utc>) {
        thread.is_archived = false;
        thread.expires_at = Some(self.expiry_from(now));
        thread.restored_at = Some(now);
        thread.restore_count += 1;
    }

    /// Selected by the archive sweep.
    pub fn is_sweepable(thread: &Thread, now: DateTime<Utc>) -> bool {
        !thread.is_archived && thread.expires_at.is_some_and(|expires_at| expires_at < now)
    }

    /// Live threads accept new posts.
    pub fn accepts_posts(&self, thread: &Thread, now: DateTime<Utc>) -> bool {
        matches!(
            self.status(thread, now),
            ThreadStatus::Active | ThreadStatus::ExpiringSoon
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-04-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn thread(author: Option<Uuid>) -> Thread {
        Thread::new(
            Some(Uuid::new_v4()),
            author,
            "Lost umbrella".to_string(),
            "Blue, left near the Hachiko exit".to_string(),
            t0(),
            TimeDelta::hours(DEFAULT_THREAD_LIFETIME_HOURS),
        )
    }

    #[test]
    fn test_new_thread_is_active() {
        let policy = LifecyclePolicy::default();
        let thread = thread(Some(Uuid::new_v4()));
        let view = policy.evaluate(&thread, t0());

        assert_eq!(thread.expires_at, Some(t0() + TimeDelta::hours(72)));
        assert_eq!(view.status, ThreadStatus::Active);
        assert_eq!(view.fade_factor, 1.0);
        assert!(!view.can_restore);
        assert_eq!(view.expires_in_secs, Some(72 * 3600));
    }

    #[test]
    fn test_expiring_soon_fades_linearly() {
        let policy = LifecyclePolicy::default();
        let thread = thread(None);

        let view = policy.evaluate(&thread, t0() + TimeDelta::hours(69));
        assert_eq!(view.status, ThreadStatus::ExpiringSoon);
        assert!((view.fade_factor - 0.5).abs() < 1e-9);

        let view = policy.evaluate(&thread, t0() + TimeDelta::hours(66));
        assert_eq!(view.status, ThreadStatus::ExpiringSoon);
        assert!((view.fade_factor - 1.0).abs() < 1e-9);

        let view = policy.evaluate(&thread, t0() + TimeDelta::minutes(72 * 60 - 10));
        assert_eq!(view.fade_factor, MIN_FADE_FACTOR);
    }

    #[test]
    fn test_expired_until_swept() {
        let policy = LifecyclePolicy::default();
        let thread = thread(Some(Uuid::new_v4()));
        let now = t0() + TimeDelta::hours(73);

        let view = policy.evaluate(&thread, now);
        assert_eq!(view.status, ThreadStatus::Expired);
        assert_eq!(view.expires_in_secs, None);
        assert!(LifecyclePolicy::is_sweepable(&thread, now));
        assert!(!policy.accepts_posts(&thread, now));
    }

    #[test]
    fn test_thread_without_expiry_stays_active() {
        let policy = LifecyclePolicy::default();
        let mut thread = thread(None);
        thread.expires_at = None;
        let now = t0() + TimeDelta::days(365);

        assert_eq!(policy.status(&thread, now), ThreadStatus::Active);
        assert!(!LifecyclePolicy::is_sweepable(&thread, now));
    }

    #[test]
    fn test_full_lifecycle_with_single_restore() {
        let policy = LifecyclePolicy::default();
        let author = Uuid::new_v4();
        let mut thread = thread(Some(author));

        // Sweep at T0+73h.
        let swept_at = t0() + TimeDelta::hours(73);
        thread.is_archived = true;
        let view = policy.evaluate(&thread, swept_at);
        assert_eq!(view.status, ThreadStatus::Archived);
        assert!(view.can_restore);

        // Restore at T0+80h.
        let restored_at = t0() + TimeDelta::hours(80);
        policy.check_restore(Some(&thread), author, restored_at).unwrap();
        policy.apply_restore(&mut thread, restored_at);
        assert_eq!(thread.expires_at, Some(restored_at + TimeDelta::hours(72)));
        assert_eq!(thread.restored_at, Some(restored_at));
        assert_eq!(thread.restore_count, 1);
        assert_eq!(policy.status(&thread, restored_at), ThreadStatus::Active);

        // Live again, but the one restore is spent.
        assert_eq!(
            policy.check_restore(Some(&thread), author, restored_at),
            Err(RestoreRejection::AlreadyRestored)
        );

        // Expires again, swept again, restore refused for good.
        let later = restored_at + TimeDelta::hours(100);
        thread.is_archived = true;
        assert!(!policy.evaluate(&thread, later).can_restore);
        assert_eq!(
            policy.check_restore(Some(&thread), author, later),
            Err(RestoreRejection::AlreadyRestored)
        );
    }

    #[test]
    fn test_anonymous_thread_never_restorable() {
        let policy = LifecyclePolicy::default();
        let mut thread = thread(None);
        thread.is_archived = true;
        let now = t0() + TimeDelta::hours(100);

        assert!(!policy.evaluate(&thread, now).can_restore);
        assert_eq!(
            policy.check_restore(Some(&thread), Uuid::new_v4(), now),
            Err(RestoreRejection::AnonymousNotRestorable)
        );
    }

    #[test]
    fn test_restore_rejections() {
        let policy = LifecyclePolicy::default();
        let author = Uuid::new_v4();
        let thread = thread(Some(author));
        let expired = t0() + TimeDelta::hours(73);

        assert_eq!(
            policy.check_restore(None, author, expired),
            Err(RestoreRejection::NotFoundOrForbidden)
        );
        assert_eq!(
            policy.check_restore(Some(&thread), Uuid::new_v4(), expired),
            Err(RestoreRejection::NotFoundOrForbidden)
        );
        assert_eq!(
            policy.check_restore(Some(&thread), author, t0()),
            Err(RestoreRejection::NotExpired)
        );
        // Expired but not yet swept is restorable directly.
        assert_eq!(policy.check_restore(Some(&thread), author, expired), Ok(()));
    }

    #[test]
    fn test_custom_lifetime() {
        let policy = LifecyclePolicy::from_hours(24);
        assert_eq!(policy.lifetime(), TimeDelta::hours(24));
        assert_eq!(policy.expiry_from(t0()), t0() + TimeDelta::hours(24));
    }

    #[test]
    fn test_rejection_reasons() {
        assert_eq!(RestoreRejection::AlreadyRestored.reason(), "already-restored");
        assert_eq!(RestoreRejection::NotExpired.reason(), "not-expired");
        assert_eq!(
            RestoreRejection::AnonymousNotRestorable.reason(),
            "anonymous-not-restorable"
        );
        assert_eq!(
            RestoreRejection::NotFoundOrForbidden.reason(),
            "not-found-or-forbidden"
        );
    }
}
