use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entities::product_media::MediaType;
use crate::entities::{product, product_category, product_media, product_size};
use crate::models::product::{ProductInput, SizeInput};

/// A product row together with the rows that hang off it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetails {
    pub product: product::Model,
    pub media: Vec<product_media::Model>,
    pub category: Option<product_category::Model>,
    pub sizes: Vec<product_size::Model>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMedia {
    pub file_url: String,
    pub file_type: MediaType,
}

/// Relational access to the catalog tables.
///
/// Reads go through the pooled connection held by the store. Writes are
/// associated functions over any `ConnectionTrait` so the write pipeline can
/// run them inside one transaction.
#[derive(Clone)]
pub struct CatalogStore {
    db: DatabaseConnection,
}

impl CatalogStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn list_categories(&self) -> Result<Vec<product_category::Model>, DbErr> {
        product_category::Entity::find()
            .order_by_asc(product_category::Column::Id)
            .all(&self.db)
            .await
    }

    pub async fn list_products(&self) -> Result<Vec<ProductDetails>, DbErr> {
        let products = product::Entity::find()
            .order_by_asc(product::Column::Id)
            .all(&self.db)
            .await?;

        let mut details = Vec::with_capacity(products.len());
        for product in products {
            details.push(self.load_details(product).await?);
        }
        Ok(details)
    }

    pub async fn find_product(&self, id: i32) -> Result<Option<ProductDetails>, DbErr> {
        match product::Entity::find_by_id(id).one(&self.db).await? {
            Some(product) => Ok(Some(self.load_details(product).await?)),
            None => Ok(None),
        }
    }

    /// The lowest-id product filed under `category_id`.
    pub async fn find_first_in_category(
        &self,
        category_id: i32,
    ) -> Result<Option<ProductDetails>, DbErr> {
        let product = product::Entity::find()
            .filter(product::Column::CategoryId.eq(category_id))
            .order_by_asc(product::Column::Id)
            .one(&self.db)
            .await?;

        match product {
            Some(product) => Ok(Some(self.load_details(product).await?)),
            None => Ok(None),
        }
    }

    async fn load_details(&self, product: product::Model) -> Result<ProductDetails, DbErr> {
        let media = product_media::Entity::find()
            .filter(product_media::Column::ProductId.eq(product.id))
            .order_by_asc(product_media::Column::Id)
            .all(&self.db)
            .await?;

        let category = product_category::Entity::find_by_id(product.category_id)
            .one(&self.db)
            .await?;

        let sizes = product_size::Entity::find()
            .filter(product_size::Column::ProductId.eq(product.id))
            .order_by_asc(product_size::Column::Id)
            .all(&self.db)
            .await?;

        Ok(ProductDetails {
            product,
            media,
            category,
            sizes,
        })
    }

    async fn find_category<C: ConnectionTrait>(
        conn: &C,
        name: &str,
        name_en: &str,
    ) -> Result<Option<product_category::Model>, DbErr> {
        product_category::Entity::find()
            .filter(product_category::Column::Name.eq(name))
            .filter(product_category::Column::NameEn.eq(name_en))
            .one(conn)
            .await
    }

    /// Returns the id of the (name, name_en) category, creating it on first use.
    /// Concurrent first uses converge on one row through the unique index.
    pub async fn resolve_category<C: ConnectionTrait>(
        conn: &C,
        name: &str,
        name_en: &str,
    ) -> Result<i32, DbErr> {
        if let Some(existing) = Self::find_category(conn, name, name_en).await? {
            return Ok(existing.id);
        }

        let category = product_category::ActiveModel {
            name: Set(name.to_string()),
            name_en: Set(name_en.to_string()),
            ..Default::default()
        };
        let inserted = product_category::Entity::insert(category)
            .on_conflict(
                OnConflict::columns([
                    product_category::Column::Name,
                    product_category::Column::NameEn,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;
        if inserted > 0 {
            tracing::info!(name, name_en, "Created product category");
        }

        Self::find_category(conn, name, name_en)
            .await?
            .map(|category| category.id)
            .ok_or_else(|| {
                DbErr::RecordNotFound(format!("product category ({}, {})", name, name_en))
            })
    }

    pub async fn insert_product<C: ConnectionTrait>(
        conn: &C,
        category_id: i32,
        input: &ProductInput,
    ) -> Result<i32, DbErr> {
        let product = product::ActiveModel {
            name: Set(input.name.clone()),
            description: Set(input.description.clone()),
            category_id: Set(category_id),
            tags: Set(input.tags.clone()),
            brand: Set(input.brand.clone()),
            price: Set(input.price),
            stock: Set(input.stock),
            ..Default::default()
        };

        let result = product::Entity::insert(product).exec(conn).await?;
        Ok(result.last_insert_id)
    }

    /// Overwrites every column of product `id`. Returns false when no row matched.
    pub async fn update_product<C: ConnectionTrait>(
        conn: &C,
        id: i32,
        category_id: i32,
        input: &ProductInput,
    ) -> Result<bool, DbErr> {
        let product = product::ActiveModel {
            name: Set(input.name.clone()),
            description: Set(input.description.clone()),
            category_id: Set(category_id),
            tags: Set(input.tags.clone()),
            brand: Set(input.brand.clone()),
            price: Set(input.price),
            stock: Set(input.stock),
            ..Default::default()
        };

        let result = product::Entity::update_many()
            .set(product)
            .filter(product::Column::Id.eq(id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Deletes product `id`. Returns false when no row matched.
    pub async fn delete_product<C: ConnectionTrait>(conn: &C, id: i32) -> Result<bool, DbErr> {
        let result = product::Entity::delete_by_id(id).exec(conn).await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn media_urls<C: ConnectionTrait>(
        conn: &C,
        product_id: i32,
    ) -> Result<Vec<String>, DbErr> {
        product_media::Entity::find()
            .select_only()
            .column(product_media::Column::FileUrl)
            .filter(product_media::Column::ProductId.eq(product_id))
            .into_tuple()
            .all(conn)
            .await
    }

    pub async fn insert_media<C: ConnectionTrait>(
        conn: &C,
        product_id: i32,
        media: &[NewMedia],
    ) -> Result<(), DbErr> {
        for item in media {
            let row = product_media::ActiveModel {
                product_id: Set(product_id),
                file_url: Set(item.file_url.clone()),
                file_type: Set(item.file_type),
                ..Default::default()
            };
            product_media::Entity::insert(row).exec(conn).await?;
        }
        Ok(())
    }

    pub async fn delete_media<C: ConnectionTrait>(conn: &C, product_id: i32) -> Result<u64, DbErr> {
        let result = product_media::Entity::delete_many()
            .filter(product_media::Column::ProductId.eq(product_id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn insert_sizes<C: ConnectionTrait>(
        conn: &C,
        product_id: i32,
        sizes: &[SizeInput],
    ) -> Result<(), DbErr> {
        for size in sizes {
            let row = product_size::ActiveModel {
                product_id: Set(product_id),
                size: Set(size.size.clone()),
                quantity: Set(size.quantity),
                ..Default::default()
            };
            product_size::Entity::insert(row).exec(conn).await?;
        }
        Ok(())
    }

    pub async fn delete_sizes<C: ConnectionTrait>(conn: &C, product_id: i32) -> Result<u64, DbErr> {
        let result = product_size::Entity::delete_many()
            .filter(product_size::Column::ProductId.eq(product_id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }
}
