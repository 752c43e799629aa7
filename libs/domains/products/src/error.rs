use axum::response::{IntoResponse, Response};
use axum_helpers::errors::AppError;
use thiserror::Error;

use crate::validation::ValidationFailure;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationFailure),

    #[error("Product {0} not found")]
    NotFound(i32),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

pub type ProductResult<T> = Result<T, ProductError>;

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::Validation(failure) => AppError::validation(failure.violations),
            ProductError::NotFound(id) => AppError::NotFound(format!("Product {} not found", id)),
            ProductError::Database(e) => AppError::Database(e),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
