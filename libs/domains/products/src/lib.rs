//! Products Domain
//!
//! Catalog of sellable products: paginated listing, lookup by id, creation
//! and partial update.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, OpenAPI
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, paging, not-found mapping
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + Postgres / in-memory)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Product, DTOs, page envelope
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_products::{
//!     handlers, InMemoryProductRepository, ProductRules, ProductService,
//! };
//!
//! let service = ProductService::new(InMemoryProductRepository::new(), ProductRules::default());
//! let router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod validation;

pub use error::{ProductError, ProductResult};
pub use models::{
    CreateProduct, ListProducts, NewProduct, PageInfo, PriceInput, Product, ProductFilter,
    ProductPage, ProductPatch, UpdateProduct,
};
pub use postgres::PgProductRepository;
pub use repository::{InMemoryProductRepository, ProductRepository};
pub use service::ProductService;
pub use validation::{DescriptionRule, PageRequest, ProductRules, ValidationFailure};
