use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub category_id: i32,
    pub tags: Option<String>,
    pub brand: Option<String>,
    pub price: f64,
    pub stock: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product_category::Entity",
        from = "Column::CategoryId",
        to = "super::product_category::Column::Id"
    )]
    ProductCategory,
    #[sea_orm(has_many = "super::product_media::Entity")]
    ProductMedia,
    #[sea_orm(has_many = "super::product_size::Entity")]
    ProductSize,
}

impl Related<super::product_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductCategory.def()
    }
}

impl Related<super::product_media::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductMedia.def()
    }
}

impl Related<super::product_size::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductSize.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
