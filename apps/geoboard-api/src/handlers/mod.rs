//! HTTP handlers and route configuration.

mod boards;
mod cron;
mod health;
mod lifecycle;
mod threads;


use std::sync::Arc;

use actix_web::{HttpRequest, web};
use geoboard_core::DomainError;
use geoboard_core::geo::Observer;
use geoboard_core::ports::RateLimiter;

use crate::middleware::error::{AppError, AppResult};
use crate::middleware::rate_limit::RateLimitMiddleware;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig, limiter: Arc<dyn RateLimiter>) {
    cfg.service(
        web::scope("/api")
            .wrap(RateLimitMiddleware::new(limiter))
            .app_data(web::JsonConfig::default().error_handler(invalid_input))
            .app_data(web::QueryConfig::default().error_handler(invalid_input))
            .app_data(web::PathConfig::default().error_handler(invalid_input))
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/boards")
                    .route("", web::get().to(boards::list))
                    .route("/{id}", web::get().to(boards::get))
                    .service(
                        web::resource("/{id}/threads")
                            .route(web::get().to(threads::list_for_board))
                            .route(web::post().to(threads::create)),
                    ),
            )
            .service(
                web::scope("/threads")
                    .route("/lifecycle", web::post().to(lifecycle::dispatch))
                    .route("/{id}", web::get().to(threads::get))
                    .route("/{id}/posts", web::post().to(threads::add_post))
                    .route("/{id}/restore", web::post().to(lifecycle::restore)),
            )
            .service(
                web::resource("/cron/archive-expired")
                    .route(web::get().to(cron::archive_expired))
                    .route(web::post().to(cron::archive_expired)),
            ),
    );
}

/// Extractor failures (bad JSON, query or path) become `validation-failed`.
fn invalid_input<E: std::fmt::Display>(err: E, _req: &HttpRequest) -> actix_web::Error {
    AppError::from(DomainError::Validation(err.to_string())).into()
}

/// Observer from optional `lat`/`lng` parameters.
fn observer(lat: Option<f64>, lng: Option<f64>) -> AppResult<Observer> {
    Ok(Observer::from_parts(lat, lng)?)
}
