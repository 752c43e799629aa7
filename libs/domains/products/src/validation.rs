//! Input rules for product mutations and list paging.
//!
//! Every check reports all violated rules at once. Nothing here touches the
//! store.

use core_config::{ConfigError, FromEnv, env_parse_or};
use serde::Serialize;
use std::fmt;
use validator::{Validate, ValidationErrors};

use crate::models::{CreateProduct, NewProduct, PriceInput, ProductPatch, UpdateProduct};

/// Violation messages surfaced to clients.
pub mod messages {
    pub const NAME_REQUIRED: &str = "name is required";
    pub const NAME_EMPTY: &str = "name must not be empty";
    pub const DESCRIPTION_EMPTY: &str = "description must not be empty";
    pub const DESCRIPTION_REQUIRED: &str = "description is required";
    pub const PRICE_REQUIRED: &str = "price is required";
    pub const PRICE_NOT_A_NUMBER: &str = "price must be a number";
    pub const PRICE_NEGATIVE: &str = "price must not be negative";
    pub const ID_NOT_POSITIVE: &str = "id must be a positive integer";
    pub const PAGE_TOO_SMALL: &str = "page must be at least 1";
    pub const PAGE_OUT_OF_RANGE: &str = "page is out of range";
    pub const LIMIT_TOO_SMALL: &str = "limit must be at least 1";
}

/// Every rule an input violated, sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub violations: Vec<String>,
}

impl ValidationFailure {
    pub fn new(mut violations: Vec<String>) -> Self {
        violations.sort();
        violations.dedup();
        Self { violations }
    }

    pub fn single(message: impl Into<String>) -> Self {
        Self {
            violations: vec![message.into()],
        }
    }

    pub fn contains(&self, message: &str) -> bool {
        self.violations.iter().any(|v| v == message)
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.violations.join("; "))
    }
}

impl std::error::Error for ValidationFailure {}

/// Flatten derive-level field errors into their messages.
fn violations_of(errors: &ValidationErrors) -> Vec<String> {
    errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| match &err.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid ({})", field, err.code),
            })
        })
        .collect()
}

/// Whether a product must carry a description.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DescriptionRule {
    /// May be omitted; any text is accepted when present
    #[default]
    Optional,
    /// Must be present and non-empty on creation, non-empty when updated
    Required,
}

impl DescriptionRule {
    fn check_create(self, description: Option<&str>, violations: &mut Vec<String>) {
        match (self, description) {
            (DescriptionRule::Required, None) => {
                violations.push(messages::DESCRIPTION_REQUIRED.to_string())
            }
            (DescriptionRule::Required, Some("")) => {
                violations.push(messages::DESCRIPTION_EMPTY.to_string())
            }
            _ => {}
        }
    }

    fn check_update(self, description: Option<&str>, violations: &mut Vec<String>) {
        if self == DescriptionRule::Required && description == Some("") {
            violations.push(messages::DESCRIPTION_EMPTY.to_string());
        }
    }
}

/// Immutable rule set, built once at startup and handed to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductRules {
    pub description: DescriptionRule,
    pub default_page_size: u64,
    pub max_page_size: u64,
}

impl Default for ProductRules {
    fn default() -> Self {
        Self {
            description: DescriptionRule::Optional,
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

impl FromEnv for ProductRules {
    /// - PRODUCT_DESCRIPTION_REQUIRED: defaults to false
    /// - PRODUCT_DEFAULT_PAGE_SIZE: defaults to 10
    /// - PRODUCT_MAX_PAGE_SIZE: defaults to 100
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let description = if env_parse_or("PRODUCT_DESCRIPTION_REQUIRED", false)? {
            DescriptionRule::Required
        } else {
            DescriptionRule::Optional
        };
        let default_page_size =
            env_parse_or("PRODUCT_DEFAULT_PAGE_SIZE", defaults.default_page_size)?;
        let max_page_size = env_parse_or("PRODUCT_MAX_PAGE_SIZE", defaults.max_page_size)?;

        if max_page_size == 0 {
            return Err(ConfigError::ParseError {
                key: "PRODUCT_MAX_PAGE_SIZE".to_string(),
                details: "must be at least 1".to_string(),
            });
        }
        if default_page_size == 0 || default_page_size > max_page_size {
            return Err(ConfigError::ParseError {
                key: "PRODUCT_DEFAULT_PAGE_SIZE".to_string(),
                details: format!("must be between 1 and {}", max_page_size),
            });
        }

        Ok(Self {
            description,
            default_page_size,
            max_page_size,
        })
    }
}

impl ProductRules {
    pub fn validate_create(&self, input: CreateProduct) -> Result<NewProduct, ValidationFailure> {
        let mut violations = match input.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => violations_of(&errors),
        };
        self.description
            .check_create(input.description.as_deref(), &mut violations);

        if !violations.is_empty() {
            return Err(ValidationFailure::new(violations));
        }

        let name = input
            .name
            .ok_or_else(|| ValidationFailure::single(messages::NAME_REQUIRED))?;
        let price = input
            .price
            .as_ref()
            .and_then(PriceInput::as_f64)
            .ok_or_else(|| ValidationFailure::single(messages::PRICE_NOT_A_NUMBER))?;

        Ok(NewProduct {
            name,
            description: input.description,
            price,
            is_active: input.is_active,
        })
    }

    /// Returns the target id and the fields to change.
    pub fn validate_update(
        &self,
        input: UpdateProduct,
    ) -> Result<(i32, ProductPatch), ValidationFailure> {
        let mut violations = match input.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => violations_of(&errors),
        };
        self.description
            .check_update(input.description.as_deref(), &mut violations);

        if !violations.is_empty() {
            return Err(ValidationFailure::new(violations));
        }

        let id = i32::try_from(input.id)
            .map_err(|_| ValidationFailure::single(messages::ID_NOT_POSITIVE))?;
        let price = match &input.price {
            Some(price) => Some(
                price
                    .as_f64()
                    .ok_or_else(|| ValidationFailure::single(messages::PRICE_NOT_A_NUMBER))?,
            ),
            None => None,
        };

        Ok((
            id,
            ProductPatch {
                name: input.name,
                description: input.description,
                price,
                is_active: input.is_active,
            },
        ))
    }

    /// Resolve optional paging input against this rule set.
    pub fn page_request(
        &self,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<PageRequest, ValidationFailure> {
        PageRequest::new(page, limit, self)
    }
}

/// A validated page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl PageRequest {
    /// `page` defaults to 1 and `limit` to `rules.default_page_size`.
    pub fn new(
        page: Option<i64>,
        limit: Option<i64>,
        rules: &ProductRules,
    ) -> Result<Self, ValidationFailure> {
        let mut violations = Vec::new();

        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(i64::try_from(rules.default_page_size).unwrap_or(i64::MAX));

        if page < 1 {
            violations.push(messages::PAGE_TOO_SMALL.to_string());
        }
        if limit < 1 {
            violations.push(messages::LIMIT_TOO_SMALL.to_string());
        } else if (limit as u64) > rules.max_page_size {
            violations.push(format!("limit must not exceed {}", rules.max_page_size));
        }
        if !violations.is_empty() {
            return Err(ValidationFailure::new(violations));
        }

        let request = Self {
            page: page as u64,
            limit: limit as u64,
        };

        // Postgres OFFSET is a signed 64-bit value.
        match (request.page - 1).checked_mul(request.limit) {
            Some(offset) if offset <= i64::MAX as u64 => Ok(request),
            _ => Err(ValidationFailure::single(messages::PAGE_OUT_OF_RANGE)),
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Rows skipped before this page: `(page - 1) * limit`.
    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}
