use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

use crate::entity::{ActiveModel, Column, Entity};
use crate::error::ProductResult;
use crate::models::{NewProduct, Product, ProductFilter, ProductPatch};
use crate::repository::ProductRepository;
use crate::validation::PageRequest;

/// PostgreSQL implementation of ProductRepository
#[derive(Clone)]
pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, input: NewProduct) -> ProductResult<Product> {
        let model = ActiveModel::from(input).insert(&self.db).await?;
        tracing::info!(product_id = model.id, "Created product");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>> {
        let result = Entity::find_by_id(id).one(&self.db).await?.map(Into::into);
        Ok(result)
    }

    async fn list(&self, filter: ProductFilter, page: PageRequest) -> ProductResult<Vec<Product>> {
        let rows = Entity::find()
            .filter(filter.condition())
            .order_by_desc(Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self, filter: ProductFilter) -> ProductResult<u64> {
        let total = Entity::find()
            .filter(filter.condition())
            .count(&self.db)
            .await?;
        Ok(total)
    }

    async fn update(&self, id: i32, patch: ProductPatch) -> ProductResult<Option<Product>> {
        // UPDATE with no SET columns is invalid SQL; an empty patch is a read.
        if patch.is_empty() {
            return self.get_by_id(id).await;
        }

        match ActiveModel::from_patch(id, patch).update(&self.db).await {
            Ok(model) => {
                tracing::info!(product_id = id, "Updated product");
                Ok(Some(model.into()))
            }
            Err(DbErr::RecordNotUpdated | DbErr::RecordNotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
