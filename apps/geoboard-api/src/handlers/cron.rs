//! Sweep trigger for an external scheduler.

use actix_web::{HttpRequest, HttpResponse, http::header, web};
use chrono::Utc;

use geoboard_shared::ApiResponse;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Sweeps require the bearer `CRON_SECRET` whenever one is configured.
pub(super) fn authorize_sweep(req: &HttpRequest, state: &AppState) -> AppResult<()> {
    let Some(secret) = state.cron_secret.as_deref() else {
        return Ok(());
    };

    let presented = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match presented {
        Some(token) if token == secret => Ok(()),
        Some(_) => Err(AppError::Unauthorized("Invalid cron secret".to_string())),
        None => Err(AppError::Unauthorized("Missing cron secret".to_string())),
    }
}

/// GET|POST /api/cron/archive-expired
pub async fn archive_expired(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    authorize_sweep(&req, &state)?;

    let report = state.lifecycle.archive_expired(Utc::now()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(report)))
}
