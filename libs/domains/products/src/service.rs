use std::sync::Arc;
use tracing::instrument;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, ListProducts, Product, ProductFilter, ProductPage, UpdateProduct};
use crate::repository::ProductRepository;
use crate::validation::ProductRules;

/// Service layer for the product resource
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
    rules: ProductRules,
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            rules: self.rules,
        }
    }
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R, rules: ProductRules) -> Self {
        Self {
            repository: Arc::new(repository),
            rules,
        }
    }

    /// One page of products plus the total matching count.
    ///
    /// The page and the count are two independent reads over the same filter.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: ListProducts) -> ProductResult<ProductPage> {
        let page = self.rules.page_request(query.page, query.limit)?;
        let filter = ProductFilter {
            is_active: query.is_active,
        };

        let (data, total_items) = tokio::try_join!(
            self.repository.list(filter, page),
            self.repository.count(filter),
        )?;

        Ok(ProductPage::new(data, total_items, page.page(), page.limit()))
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: i32) -> ProductResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    #[instrument(skip(self, input), fields(name = ?input.name))]
    pub async fn create_product(&self, input: CreateProduct) -> ProductResult<Product> {
        let product = self.rules.validate_create(input)?;
        self.repository.create(product).await
    }

    #[instrument(skip(self, input), fields(id = input.id))]
    pub async fn update_product(&self, input: UpdateProduct) -> ProductResult<Product> {
        let (id, patch) = self.rules.validate_update(input)?;

        self.repository
            .update(id, patch)
            .await?
            .ok_or(ProductError::NotFound(id))
    }
}
