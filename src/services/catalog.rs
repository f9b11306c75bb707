use sea_orm::{DatabaseConnection, DbErr, TransactionTrait};

use crate::entities::product_category;
use crate::error::AppError;
use crate::models::product::{ProductInput, UploadedFile};
use crate::services::storage::{StoredFile, UploadStorage};
use crate::stores::catalog_store::{CatalogStore, NewMedia, ProductDetails};

/// Orchestrates product reads and the product write pipeline
/// (category upsert, product upsert, media replacement, size replacement).
#[derive(Clone)]
pub struct CatalogService {
    store: CatalogStore,
    storage: UploadStorage,
}

impl CatalogService {
    pub fn new(db: DatabaseConnection, storage: UploadStorage) -> Self {
        Self {
            store: CatalogStore::new(db),
            storage,
        }
    }

    pub fn storage(&self) -> &UploadStorage {
        &self.storage
    }

    fn db(&self) -> &DatabaseConnection {
        self.store.connection()
    }

    pub async fn list_products(&self) -> Result<Vec<ProductDetails>, AppError> {
        Ok(self.store.list_products().await?)
    }

    pub async fn list_categories(&self) -> Result<Vec<product_category::Model>, AppError> {
        Ok(self.store.list_categories().await?)
    }

    /// Single product lookup. Sizes that are out of stock are dropped here but
    /// not in the listing endpoints.
    pub async fn get_product(&self, id: i32) -> Result<ProductDetails, AppError> {
        let mut details = self
            .store
            .find_product(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

        details.sizes.retain(|size| size.quantity > 0);
        Ok(details)
    }

    pub async fn get_product_by_category(&self, category_id: i32) -> Result<ProductDetails, AppError> {
        self.store
            .find_first_in_category(category_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
    }

    /// Writes uploads to `<root>/<folder>`. On a write failure the files
    /// already written for this request are removed again.
    async fn stage_files(
        &self,
        folder: &str,
        product_name: &str,
        files: &[UploadedFile],
    ) -> Result<Vec<(StoredFile, NewMedia)>, AppError> {
        let mut staged: Vec<(StoredFile, NewMedia)> = Vec::with_capacity(files.len());
        // Timestamps are strictly increasing within one request so sibling
        // uploads never share a name.
        let mut last_millis: Option<i64> = None;
        for file in files {
            let now = chrono::Utc::now().timestamp_millis();
            let millis = last_millis.map_or(now, |last| now.max(last + 1));
            last_millis = Some(millis);

            let file_name = UploadStorage::file_name(Some(product_name), &file.original_name, millis);
            match self.storage.put_object(folder, &file_name, &file.data).await {
                Ok(stored) => {
                    let media = NewMedia {
                        file_url: stored.file_url.clone(),
                        file_type: file.media_type(),
                    };
                    staged.push((stored, media));
                }
                Err(e) => {
                    self.discard(&staged).await;
                    return Err(e.into());
                }
            }
        }
        Ok(staged)
    }

    async fn discard(&self, staged: &[(StoredFile, NewMedia)]) {
        let files: Vec<StoredFile> = staged.iter().map(|(stored, _)| stored.clone()).collect();
        self.storage.discard(&files).await;
    }

    pub async fn create_product(
        &self,
        input: ProductInput,
        folder: &str,
        files: &[UploadedFile],
    ) -> Result<i32, AppError> {
        if files.is_empty() {
            return Err(AppError::BadRequest("At least one file is required".to_string()));
        }

        let staged = self.stage_files(folder, &input.name, files).await?;
        let media: Vec<NewMedia> = staged.iter().map(|(_, media)| media.clone()).collect();

        match self.create_in_transaction(&input, &media).await {
            Ok(id) => {
                tracing::info!(product_id = id, media = media.len(), "Product created");
                Ok(id)
            }
            Err(e) => {
                self.discard(&staged).await;
                Err(e.into())
            }
        }
    }

    async fn create_in_transaction(&self, input: &ProductInput, media: &[NewMedia]) -> Result<i32, DbErr> {
        let txn = self.db().begin().await?;

        let category_id =
            CatalogStore::resolve_category(&txn, &input.category_name, &input.category_name_en).await?;
        let product_id = CatalogStore::insert_product(&txn, category_id, input).await?;
        CatalogStore::insert_media(&txn, product_id, media).await?;
        if let Some(sizes) = &input.sizes {
            CatalogStore::insert_sizes(&txn, product_id, sizes).await?;
        }

        txn.commit().await?;
        Ok(product_id)
    }

    /// Replaces product `id`. Media is always replaced by `files` (possibly
    /// with nothing); sizes only when the input carries a sizes array.
    /// Old media files are removed from disk after the commit.
    pub async fn update_product(
        &self,
        id: i32,
        input: ProductInput,
        folder: &str,
        files: &[UploadedFile],
    ) -> Result<(), AppError> {
        let staged = self.stage_files(folder, &input.name, files).await?;
        let media: Vec<NewMedia> = staged.iter().map(|(_, media)| media.clone()).collect();

        let old_urls = match self.update_in_transaction(id, &input, &media).await {
            Ok(Some(old_urls)) => old_urls,
            Ok(None) => {
                self.discard(&staged).await;
                return Err(AppError::NotFound("Product not found".to_string()));
            }
            Err(e) => {
                self.discard(&staged).await;
                return Err(e.into());
            }
        };

        // A re-upload can land on an old file name within the same millisecond.
        let fresh: Vec<&str> = media.iter().map(|m| m.file_url.as_str()).collect();
        for url in old_urls.iter().filter(|url| !fresh.contains(&url.as_str())) {
            self.storage.delete_object(url).await?;
        }

        tracing::info!(
            product_id = id,
            removed_media = old_urls.len(),
            media = media.len(),
            "Product updated"
        );
        Ok(())
    }

    /// Returns the replaced media urls, or `None` when the product does not exist.
    async fn update_in_transaction(
        &self,
        id: i32,
        input: &ProductInput,
        media: &[NewMedia],
    ) -> Result<Option<Vec<String>>, DbErr> {
        let txn = self.db().begin().await?;

        let category_id =
            CatalogStore::resolve_category(&txn, &input.category_name, &input.category_name_en).await?;
        if !CatalogStore::update_product(&txn, id, category_id, input).await? {
            txn.rollback().await?;
            return Ok(None);
        }

        let old_urls = CatalogStore::media_urls(&txn, id).await?;
        CatalogStore::delete_media(&txn, id).await?;
        CatalogStore::insert_media(&txn, id, media).await?;

        if let Some(sizes) = &input.sizes {
            CatalogStore::delete_sizes(&txn, id).await?;
            CatalogStore::insert_sizes(&txn, id, sizes).await?;
        }

        txn.commit().await?;
        Ok(Some(old_urls))
    }

    /// Removes the product with its media and size rows. Media files stay on disk.
    pub async fn delete_product(&self, id: i32) -> Result<(), AppError> {
        let txn = self.db().begin().await?;

        let media = CatalogStore::delete_media(&txn, id).await?;
        let sizes = CatalogStore::delete_sizes(&txn, id).await?;
        if !CatalogStore::delete_product(&txn, id).await? {
            txn.rollback().await?;
            return Err(AppError::NotFound("Product not found".to_string()));
        }

        txn.commit().await?;
        tracing::info!(product_id = id, media, sizes, "Product deleted");
        Ok(())
    }
}
