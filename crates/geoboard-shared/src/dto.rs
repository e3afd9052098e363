//! Data Transfer Objects - request/response types for the API.
//!
//! Coordinates arrive as optional `lat`/`lng` pairs. Supplying only one of
//! the two is a validation error; supplying neither (or `0,0`) means the
//! observer's position is unknown.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Query string for `GET /api/boards`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardListQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// `all`, `accessible`, `station`, `ward` or `park`.
    pub filter: Option<String>,
}

/// Query string carrying only the observer position.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ObserverQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Request to open a thread on a board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateThreadRequest {
    pub title: String,
    pub content: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Request to reply to a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Body of `POST /api/threads/{id}/restore`.
///
/// `user_id` is only honoured when no bearer token is present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestoreRequest {
    pub user_id: Option<Uuid>,
}

/// Body of `POST /api/threads/lifecycle`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LifecycleActionRequest {
    ArchiveExpired,
    RestoreThread {
        thread_id: Uuid,
        user_id: Option<Uuid>,
    },
    GetLifecycleStats,
}

/// Response for the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage: String,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_action_tags() {
        let action: LifecycleActionRequest =
            serde_json::from_str(r#"{"action":"archive_expired"}"#).unwrap();
        assert!(matches!(action, LifecycleActionRequest::ArchiveExpired));

        let id = Uuid::new_v4();
        let action: LifecycleActionRequest = serde_json::from_str(&format!(
            r#"{{"action":"restore_thread","thread_id":"{id}"}}"#
        ))
        .unwrap();
        assert!(matches!(
            action,
            LifecycleActionRequest::RestoreThread { thread_id, user_id: None } if thread_id == id
        ));

        let unknown = serde_json::from_str::<LifecycleActionRequest>(r#"{"action":"purge"}"#);
        assert!(unknown.is_err());
    }

    #[test]
    fn test_restore_request_body_is_optional() {
        let request: RestoreRequest = serde_json::from_str("{}").unwrap();
        assert!(request.user_id.is_none());
    }
}
