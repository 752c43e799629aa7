use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};
use tokio::sync::RwLock;

use crate::error::ProductResult;
use crate::models::{NewProduct, Product, ProductFilter, ProductPatch};
use crate::validation::PageRequest;

/// Repository trait for Product persistence.
///
/// Inputs are already validated; implementations only store and fetch.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a product and return it with its store-assigned id
    async fn create(&self, input: NewProduct) -> ProductResult<Product>;

    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>>;

    /// Matching products ordered by id descending, windowed by `page`
    async fn list(&self, filter: ProductFilter, page: PageRequest) -> ProductResult<Vec<Product>>;

    /// Number of products matching `filter`, ignoring pagination
    async fn count(&self, filter: ProductFilter) -> ProductResult<u64>;

    /// Apply `patch` and return the updated row, or `None` if `id` does not exist
    async fn update(&self, id: i32, patch: ProductPatch) -> ProductResult<Option<Product>>;
}

/// In-memory implementation of ProductRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<BTreeMap<i32, Product>>>,
    last_id: Arc<AtomicI32>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, input: NewProduct) -> ProductResult<Product> {
        let mut products = self.products.write().await;

        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let product = Product::from_new(id, input);
        products.insert(id, product.clone());

        tracing::info!(product_id = id, "Created product");
        Ok(product)
    }

    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.get(&id).cloned())
    }

    async fn list(&self, filter: ProductFilter, page: PageRequest) -> ProductResult<Vec<Product>> {
        let products = self.products.read().await;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);

        Ok(products
            .values()
            .rev()
            .filter(|p| filter.matches(p))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: ProductFilter) -> ProductResult<u64> {
        let products = self.products.read().await;
        Ok(products.values().filter(|p| filter.matches(p)).count() as u64)
    }

    async fn update(&self, id: i32, patch: ProductPatch) -> ProductResult<Option<Product>> {
        let mut products = self.products.write().await;

        let Some(product) = products.get_mut(&id) else {
            return Ok(None);
        };
        if !patch.is_empty() {
            product.apply(patch);
            tracing::info!(product_id = id, "Updated product");
        }

        Ok(Some(product.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ProductRules;

    fn new_product(name: &str, is_active: bool) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: None,
            price: 1.0,
            is_active,
        }
    }

    fn page(page: i64, limit: i64) -> PageRequest {
        ProductRules::default()
            .page_request(Some(page), Some(limit))
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let repo = InMemoryProductRepository::new();

        let first = repo.create(new_product("a", true)).await.unwrap();
        let second = repo.create(new_product("b", true)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(repo.get_by_id(2).await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let repo = InMemoryProductRepository::new();
        assert_eq!(repo.get_by_id(999_999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_windowed() {
        let repo = InMemoryProductRepository::new();
        for i in 0..5 {
            repo.create(new_product(&format!("p{i}"), true)).await.unwrap();
        }

        let ids: Vec<i32> = repo
            .list(ProductFilter::default(), page(2, 2))
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();

        assert_eq!(ids, vec![3, 2]);
    }

    #[tokio::test]
    async fn test_list_and_count_share_filter() {
        let repo = InMemoryProductRepository::new();
        repo.create(new_product("on", true)).await.unwrap();
        repo.create(new_product("off", false)).await.unwrap();
        repo.create(new_product("on again", true)).await.unwrap();

        let filter = ProductFilter {
            is_active: Some(true),
        };
        let rows = repo.list(filter, page(1, 10)).await.unwrap();

        assert!(rows.iter().all(|p| p.is_active));
        assert_eq!(rows.len(), 2);
        assert_eq!(repo.count(filter).await.unwrap(), 2);
        assert_eq!(repo.count(ProductFilter::default()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_update_changes_only_patched_fields() {
        let repo = InMemoryProductRepository::new();
        let created = repo.create(new_product("Widget", true)).await.unwrap();

        let updated = repo
            .update(
                created.id,
                ProductPatch {
                    price: Some(150.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.price, 150.0);
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.is_active, created.is_active);
    }

    #[tokio::test]
    async fn test_update_missing_is_none() {
        let repo = InMemoryProductRepository::new();
        let result = repo.update(42, ProductPatch::default()).await.unwrap();
        assert!(result.is_none());
    }
}
