//! Board listing and lookup.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use geoboard_core::geofence::BoardFilter;
use geoboard_core::service::BoardQuery;
use geoboard_shared::ApiResponse;
use geoboard_shared::dto::{BoardListQuery, ObserverQuery};

use super::observer;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/boards?lat&lng&filter
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<BoardListQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let filter: BoardFilter = query.filter.as_deref().unwrap_or_default().parse()?;
    let observer = observer(query.lat, query.lng)?;

    let listing = state.boards.list(BoardQuery { observer, filter }).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(listing)))
}

/// GET /api/boards/{id}?lat&lng
pub async fn get(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<ObserverQuery>,
) -> AppResult<HttpResponse> {
    let observer = observer(query.lat, query.lng)?;
    let board = state.boards.get(path.into_inner(), observer).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(board)))
}
