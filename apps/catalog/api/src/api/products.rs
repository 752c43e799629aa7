use axum::Router;
use domain_products::{PgProductRepository, ProductService, handlers};

pub fn router(state: &crate::state::AppState) -> Router {
    let repository = PgProductRepository::new(state.db.clone());
    let service = ProductService::new(repository, state.config.products);
    handlers::router(service)
}
