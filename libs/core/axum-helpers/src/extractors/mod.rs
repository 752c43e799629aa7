//! Extractors whose rejections render as [`ErrorResponse`](crate::errors::ErrorResponse).

pub mod id_path;
pub mod json_body;
pub mod query_params;

pub use id_path::IdPath;
pub use json_body::JsonBody;
pub use query_params::QueryParams;
