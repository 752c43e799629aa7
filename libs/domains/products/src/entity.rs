use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::Condition;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::{NewProduct, Product, ProductFilter, ProductPatch};

/// Sea-ORM Entity for the products table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Product {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            is_active: model.is_active,
        }
    }
}

// The id is left to the SERIAL sequence.
impl From<NewProduct> for ActiveModel {
    fn from(input: NewProduct) -> Self {
        Self {
            id: NotSet,
            name: Set(input.name),
            description: Set(input.description),
            price: Set(input.price),
            is_active: Set(input.is_active),
        }
    }
}

impl ActiveModel {
    /// Update model touching only the columns present in `patch`.
    pub fn from_patch(id: i32, patch: ProductPatch) -> Self {
        Self {
            id: Unchanged(id),
            name: patch.name.map_or(NotSet, Set),
            description: patch.description.map_or(NotSet, |d| Set(Some(d))),
            price: patch.price.map_or(NotSet, Set),
            is_active: patch.is_active.map_or(NotSet, Set),
        }
    }
}

impl ProductFilter {
    /// WHERE clause for this filter; an absent flag matches every row.
    pub fn condition(&self) -> Condition {
        Condition::all().add_option(self.is_active.map(|active| Column::IsActive.eq(active)))
    }
}
