//! Thread listing, creation and replies.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use geoboard_core::service::NewThreadInput;
use geoboard_shared::ApiResponse;
use geoboard_shared::dto::{CreatePostRequest, CreateThreadRequest, ObserverQuery};

use super::observer;
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/boards/{id}/threads?lat&lng
pub async fn list_for_board(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<ObserverQuery>,
) -> AppResult<HttpResponse> {
    let observer = observer(query.lat, query.lng)?;
    let threads = state
        .threads
        .list_for_board(path.into_inner(), observer, Utc::now())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(threads)))
}

/// POST /api/boards/{id}/threads
pub async fn create(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
    body: web::Json<CreateThreadRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let observer = observer(body.lat, body.lng)?;
    let input = NewThreadInput {
        title: body.title,
        content: body.content,
    };

    let view = state
        .threads
        .create(path.into_inner(), identity.user_id(), observer, input, Utc::now())
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(view)))
}

/// GET /api/threads/{id}?lat&lng
pub async fn get(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<ObserverQuery>,
) -> AppResult<HttpResponse> {
    let observer = observer(query.lat, query.lng)?;
    let details = state
        .threads
        .get(path.into_inner(), observer, Utc::now())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(details)))
}

/// POST /api/threads/{id}/posts
pub async fn add_post(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let observer = observer(body.lat, body.lng)?;
    let post = state
        .threads
        .add_post(
            path.into_inner(),
            identity.user_id(),
            observer,
            &body.content,
            Utc::now(),
        )
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(post)))
}
