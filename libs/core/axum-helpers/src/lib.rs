//! # Axum Helpers
//!
//! Shared HTTP plumbing for the catalog services.
//!
//! - **[`errors`]**: `AppError` and the common JSON error body
//! - **[`extractors`]**: integer id path, JSON body and query extractors with structured rejections
//! - **[`http`]**: CORS and security header middleware
//! - **[`server`]**: router assembly, health endpoints, graceful shutdown

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use errors::{AppError, ErrorCode, ErrorResponse};
pub use extractors::{IdPath, JsonBody, QueryParams};
pub use http::{cors_layer_from_env, security_headers};
pub use server::{
    HealthCheckFuture, HealthResponse, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};
