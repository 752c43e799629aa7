use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::validation::messages;

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub is_active: bool,
}

impl Product {
    /// Materialize a validated insert under a store-assigned id.
    pub fn from_new(id: i32, input: NewProduct) -> Self {
        Self {
            id,
            name: input.name,
            description: input.description,
            price: input.price,
            is_active: input.is_active,
        }
    }

    /// Overwrite the fields present in `patch`; `id` never changes.
    pub fn apply(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
    }
}

/// Price as sent by clients: a JSON number or a numeric string such as `"9.99"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

impl PriceInput {
    /// The finite numeric value, if there is one.
    ///
    /// Text is trimmed before parsing; blank text is not a number.
    /// Negative zero comes back as `0.0`.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            PriceInput::Number(n) => *n,
            PriceInput::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return None;
                }
                s.parse::<f64>().ok()?
            }
        };
        // -0.0 + 0.0 is +0.0
        value.is_finite().then_some(value + 0.0)
    }
}

impl From<f64> for PriceInput {
    fn from(value: f64) -> Self {
        PriceInput::Number(value)
    }
}

impl From<&str> for PriceInput {
    fn from(value: &str) -> Self {
        PriceInput::Text(value.to_string())
    }
}

fn validate_price(price: &PriceInput) -> Result<(), ValidationError> {
    match price.as_f64() {
        None => Err(ValidationError::new("price_not_a_number")
            .with_message(Cow::Borrowed(messages::PRICE_NOT_A_NUMBER))),
        Some(value) if value < 0.0 => Err(ValidationError::new("price_negative")
            .with_message(Cow::Borrowed(messages::PRICE_NEGATIVE))),
        Some(_) => Ok(()),
    }
}

fn default_is_active() -> bool {
    true
}

/// DTO for creating a new product
///
/// `name` and `price` are required, but a missing one is reported together
/// with every other violation instead of failing deserialization.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    #[serde(default)]
    #[validate(
        required(message = "name is required"),
        length(min = 1, message = "name must not be empty")
    )]
    #[schema(required = true)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(required(message = "price is required"), custom(function = "validate_price"))]
    #[schema(required = true)]
    pub price: Option<PriceInput>,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

/// DTO for a partial update; absent (or null) fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    /// Overridden by the path parameter over HTTP
    #[serde(default)]
    #[validate(range(min = 1, max = 2147483647, message = "id must be a positive integer"))]
    pub id: i64,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "validate_price"))]
    pub price: Option<PriceInput>,
    pub is_active: Option<bool>,
}

/// Validated creation input.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub is_active: bool,
}

/// Validated update input; `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub is_active: Option<bool>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.is_active.is_none()
    }
}

/// Query parameters for listing products
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListProducts {
    /// 1-based page number (default 1)
    pub page: Option<i64>,
    /// Page size (default and maximum are configured)
    pub limit: Option<i64>,
    /// Only products with this active flag
    pub is_active: Option<bool>,
}

/// Row filter shared by the page query and the count query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub is_active: Option<bool>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        self.is_active.is_none_or(|active| product.is_active == active)
    }
}

/// Navigation flags of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl PageInfo {
    pub fn new(page: u64, limit: u64, total_items: u64) -> Self {
        Self {
            has_previous_page: page > 1,
            has_next_page: page.saturating_mul(limit) < total_items,
        }
    }
}

/// One page of products, newest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub data: Vec<Product>,
    /// Rows matching the filter, ignoring pagination
    pub total_items: u64,
    pub page_info: PageInfo,
}

impl ProductPage {
    pub fn new(data: Vec<Product>, total_items: u64, page: u64, limit: u64) -> Self {
        Self {
            data,
            total_items,
            page_info: PageInfo::new(page, limit, total_items),
        }
    }
}
