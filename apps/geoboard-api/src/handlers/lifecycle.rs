//! Thread restore and the lifecycle action endpoint.

use actix_web::{FromRequest, HttpRequest, HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use geoboard_core::DomainError;
use geoboard_core::lifecycle::RestoreRejection;
use geoboard_core::service::ThreadView;
use geoboard_shared::ApiResponse;
use geoboard_shared::dto::{LifecycleActionRequest, RestoreRequest};

use super::cron::authorize_sweep;
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// The bearer identity wins; a body `user_id` that disagrees with it is
/// treated like any other non-owner.
fn requester(identity: OptionalIdentity, claimed: Option<Uuid>) -> AppResult<Uuid> {
    match (identity.user_id(), claimed) {
        (Some(user_id), Some(claimed)) if claimed != user_id => Err(DomainError::RestoreRejected(
            RestoreRejection::NotFoundOrForbidden,
        )
        .into()),
        (Some(user_id), _) => Ok(user_id),
        (None, Some(claimed)) => Ok(claimed),
        (None, None) => Err(DomainError::Unauthorized.into()),
    }
}

async fn restore_thread(
    state: &AppState,
    thread_id: Uuid,
    requester: Uuid,
) -> AppResult<HttpResponse> {
    let now = Utc::now();
    let thread = state.lifecycle.restore(thread_id, requester, now).await?;
    let lifecycle = state.lifecycle.policy().evaluate(&thread, now);

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        ThreadView { thread, lifecycle },
        "Thread restored",
    )))
}

/// POST /api/threads/{id}/restore
pub async fn restore(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
    body: Option<web::Json<RestoreRequest>>,
) -> AppResult<HttpResponse> {
    let claimed = body.and_then(|b| b.user_id);
    let requester = requester(identity, claimed)?;
    restore_thread(&state, path.into_inner(), requester).await
}

/// POST /api/threads/lifecycle
///
/// The bearer header carries the cron secret for `archive_expired` and a user
/// token for `restore_thread`, so identity is only extracted for the latter.
pub async fn dispatch(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<LifecycleActionRequest>,
) -> actix_web::Result<HttpResponse> {
    match body.into_inner() {
        LifecycleActionRequest::ArchiveExpired => {
            authorize_sweep(&req, &state)?;
            let report = state.lifecycle.archive_expired(Utc::now()).await.map_err(AppError::from)?;
            Ok(HttpResponse::Ok().json(ApiResponse::ok(report)))
        }
        LifecycleActionRequest::RestoreThread { thread_id, user_id } => {
            let identity = OptionalIdentity::extract(&req).await?;
            let requester = requester(identity, user_id)?;
            Ok(restore_thread(&state, thread_id, requester).await?)
        }
        LifecycleActionRequest::GetLifecycleStats => {
            let stats = state.lifecycle.stats(Utc::now()).await.map_err(AppError::from)?;
            Ok(HttpResponse::Ok().json(ApiResponse::ok(stats)))
        }
    }
}
