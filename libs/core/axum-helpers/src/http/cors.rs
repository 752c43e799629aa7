use axum::http::{HeaderValue, Method, header};
use std::time::Duration;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub const CORS_ALLOWED_ORIGIN: &str = "CORS_ALLOWED_ORIGIN";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CorsError {
    #[error(
        "CORS_ALLOWED_ORIGIN environment variable is required. Example: CORS_ALLOWED_ORIGIN=http://localhost:3000,https://example.com"
    )]
    Missing,

    #[error("CORS_ALLOWED_ORIGIN cannot be empty")]
    Empty,

    #[error("Invalid CORS_ALLOWED_ORIGIN value '{0}'")]
    InvalidOrigin(String),
}

/// Parses a comma-separated origin list, ignoring blank entries.
pub fn parse_allowed_origins(raw: &str) -> Result<Vec<HeaderValue>, CorsError> {
    let origins = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| HeaderValue::from_str(s).map_err(|_| CorsError::InvalidOrigin(s.to_string())))
        .collect::<Result<Vec<_>, _>>()?;

    if origins.is_empty() {
        return Err(CorsError::Empty);
    }

    Ok(origins)
}

/// CORS layer for the origins listed in `CORS_ALLOWED_ORIGIN`.
///
/// Allows the methods the catalog API serves plus preflight, JSON content
/// negotiation headers, and caches preflight results for one hour.
pub fn cors_layer_from_env() -> Result<CorsLayer, CorsError> {
    let raw = std::env::var(CORS_ALLOWED_ORIGIN).map_err(|_| CorsError::Missing)?;
    let origins = parse_allowed_origins(&raw)?;

    tracing::info!(origins = %raw, "CORS configured");

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .max_age(Duration::from_secs(3600)))
}
