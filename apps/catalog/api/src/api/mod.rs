use axum::Router;

pub mod health;
pub mod products;

/// Path of the products resource below `/api`
pub const PRODUCTS_PATH: &str = "/products";

/// Creates the API routes without the `/api` prefix.
/// The `/api` prefix is added by `create_router`.
pub fn routes(state: &crate::state::AppState) -> Router {
    Router::new().nest(PRODUCTS_PATH, products::router(state))
}

/// Router with `GET /ready`, which pings the database.
pub fn ready_router(state: crate::state::AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
