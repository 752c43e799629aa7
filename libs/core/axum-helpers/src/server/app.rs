use super::shutdown::shutdown_signal;
use crate::errors::handlers::not_found;
use crate::http::{cors_layer_from_env, security_headers};
use axum::{Router, middleware};
use core_config::server::ServerConfig;
use std::future::Future;
use std::io;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info, warn};
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;
use utoipa_redoc::{Redoc, Servable as RedocServable};
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

/// Wraps the API routes with documentation and cross-cutting middleware.
///
/// - `apis` is nested under `/api` (state already applied)
/// - OpenAPI JSON at `/api-docs/openapi.json`, viewers at `/swagger-ui`,
///   `/redoc`, `/rapidoc` and `/scalar`
/// - JSON 404 fallback, request tracing, security headers, CORS, compression
///
/// # Errors
/// Fails when `CORS_ALLOWED_ORIGIN` is missing, empty or invalid.
pub fn create_router<T>(apis: Router) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    let cors_layer =
        cors_layer_from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .merge(Redoc::with_url("/redoc", T::openapi()))
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/rapidoc"))
        .merge(Scalar::with_url("/scalar", T::openapi()))
        .nest("/api", apis)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers))
        .layer(cors_layer)
        .layer(CompressionLayer::new());

    Ok(router)
}

/// Serves `router` until SIGINT/SIGTERM, then runs `cleanup` with a deadline.
///
/// `cleanup` (closing the connection pool, for example) starts only after
/// every in-flight request has been answered, and is abandoned if it exceeds
/// `shutdown_timeout`.
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: Future<Output = ()>,
{
    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    serve_then_cleanup(listener, router, shutdown_signal(), shutdown_timeout, cleanup).await
}

async fn serve_then_cleanup<S, F>(
    listener: tokio::net::TcpListener,
    router: Router,
    signal: S,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
    F: Future<Output = ()>,
{
    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(signal)
        .await
        .inspect_err(|e| tracing::error!("Server encountered an error: {:?}", e));
    info!("Server stopped accepting connections");

    info!("Starting cleanup tasks (timeout: {:?})", shutdown_timeout);
    match tokio::time::timeout(shutdown_timeout, cleanup).await {
        Ok(()) => info!("Cleanup completed successfully"),
        Err(_) => warn!(
            "Cleanup exceeded timeout of {:?}, forcing shutdown",
            shutdown_timeout
        ),
    }

    serve_result
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::{Notify, oneshot};

    #[tokio::test]
    async fn test_cleanup_runs_after_in_flight_request_completes() {
        let started = Arc::new(Notify::new());
        let answered = Arc::new(AtomicBool::new(false));

        let router = {
            let started = started.clone();
            let answered = answered.clone();
            Router::new().route(
                "/slow",
                get(move || async move {
                    started.notify_one();
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    answered.store(true, Ordering::SeqCst);
                    "done"
                }),
            )
        };

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let answered_at_cleanup = Arc::new(AtomicBool::new(false));
        let cleanup = {
            let answered = answered.clone();
            let answered_at_cleanup = answered_at_cleanup.clone();
            async move {
                answered_at_cleanup.store(answered.load(Ordering::SeqCst), Ordering::SeqCst);
            }
        };

        let server = tokio::spawn(serve_then_cleanup(
            listener,
            router,
            async move {
                let _ = stop_rx.await;
            },
            Duration::from_secs(5),
            cleanup,
        ));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /slow HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();

        started.notified().await;
        stop_tx.send(()).unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200"), "got: {response}");
        assert!(response.ends_with("done"));

        server.await.unwrap().unwrap();
        assert!(answered_at_cleanup.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_slow_cleanup_is_abandoned_after_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            serve_then_cleanup(
                listener,
                Router::new(),
                async {},
                Duration::from_millis(50),
                std::future::pending::<()>(),
            ),
        )
        .await;

        assert!(matches!(result, Ok(Ok(()))));
    }
}
