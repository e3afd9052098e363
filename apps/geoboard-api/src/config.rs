//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use geoboard_core::geo::Coordinate;
use geoboard_core::lifecycle::DEFAULT_THREAD_LIFETIME_HOURS;

#[cfg(feature = "postgres")]
use geoboard_infra::database::DatabaseConfig;

/// Every five minutes, on the minute.
pub const DEFAULT_SWEEP_SCHEDULE: &str = "0 */5 * * * *";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    pub thread_lifetime_hours: i64,
    /// Ranking viewpoint for observers who share no location.
    pub fallback_viewpoint: Option<Coordinate>,
    /// Bearer secret required by the cron endpoint. Unset means open.
    pub cron_secret: Option<String>,
    pub scheduler_enabled: bool,
    pub sweep_schedule: String,
}

/// Upper bound on thread lifetime (one year).
pub const MAX_THREAD_LIFETIME_HOURS: i64 = 24 * 365;

fn parsed<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

/// Non-positive values fall back to the default; oversized ones are capped.
fn thread_lifetime_hours(raw: Option<i64>) -> i64 {
    match raw {
        Some(hours) if hours <= 0 => {
            tracing::warn!(hours, "THREAD_LIFETIME_HOURS must be positive, using default");
            DEFAULT_THREAD_LIFETIME_HOURS
        }
        Some(hours) if hours > MAX_THREAD_LIFETIME_HOURS => {
            tracing::warn!(
                hours,
                max = MAX_THREAD_LIFETIME_HOURS,
                "THREAD_LIFETIME_HOURS too large, capping"
            );
            MAX_THREAD_LIFETIME_HOURS
        }
        Some(hours) => hours,
        None => DEFAULT_THREAD_LIFETIME_HOURS,
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let fallback_viewpoint = match (
            parsed::<f64>("GEOFENCE_FALLBACK_LAT"),
            parsed::<f64>("GEOFENCE_FALLBACK_LNG"),
        ) {
            (Some(lat), Some(lng)) => match Coordinate::parse(lat, lng) {
                Ok(coordinate) => Some(coordinate),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring invalid fallback viewpoint");
                    None
                }
            },
            _ => None,
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT").unwrap_or(8080),
            #[cfg(feature = "postgres")]
            database: DatabaseConfig::from_env(),
            thread_lifetime_hours: thread_lifetime_hours(parsed("THREAD_LIFETIME_HOURS")),
            fallback_viewpoint,
            cron_secret: env::var("CRON_SECRET").ok().filter(|s| !s.is_empty()),
            scheduler_enabled: env::var("SCHEDULER_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            sweep_schedule: env::var("SWEEP_SCHEDULE")
                .unwrap_or_else(|_| DEFAULT_SWEEP_SCHEDULE.to_string()),
        }
    }
}
