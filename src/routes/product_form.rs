use axum::body::Bytes;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{FromRequest, Multipart, Request};

use crate::error::AppError;
use crate::models::product::{ProductFields, UploadedFile, MAX_FILES, MAX_FILE_BYTES};

/// Form field that carries uploaded files.
pub const FILES_FIELD: &str = "files";

/// A decoded `multipart/form-data` product form.
#[derive(Debug, Default)]
pub struct ProductForm {
    pub fields: ProductFields,
    pub files: Vec<UploadedFile>,
}

fn invalid_multipart(e: MultipartError) -> AppError {
    AppError::BadRequest(format!("Invalid multipart data: {}", e.body_text()))
}

impl ProductForm {
    /// Reads the whole form. Files are buffered in memory (bounded by
    /// `MAX_FILES` x `MAX_FILE_BYTES`) so the text fields are all known before
    /// anything is written to disk.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = ProductForm::default();

        while let Some(field) = multipart.next_field().await.map_err(invalid_multipart)? {
            let name = field.name().unwrap_or_default().to_string();

            if let Some(file_name) = field.file_name() {
                // Browsers send an empty filename for a file input left blank.
                if file_name.is_empty() {
                    drain(field).await?;
                    continue;
                }
                if name != FILES_FIELD {
                    return Err(AppError::BadRequest(format!("Unexpected file field '{}'", name)));
                }
                if form.files.len() == MAX_FILES {
                    return Err(AppError::BadRequest(format!(
                        "Too many files (max {})",
                        MAX_FILES
                    )));
                }
                form.files.push(read_file(field).await?);
                continue;
            }

            let value = field.text().await.map_err(invalid_multipart)?;
            let slot = match name.as_str() {
                "name" => &mut form.fields.name,
                "description" => &mut form.fields.description,
                "category_name" => &mut form.fields.category_name,
                "category_name_en" => &mut form.fields.category_name_en,
                "tags" => &mut form.fields.tags,
                "brand" => &mut form.fields.brand,
                "price" => &mut form.fields.price,
                "stock" => &mut form.fields.stock,
                "sizes" => &mut form.fields.sizes,
                other => {
                    tracing::debug!("Ignoring unknown form field '{}'", other);
                    continue;
                }
            };
            *slot = Some(value);
        }

        Ok(form)
    }
}

impl<S> FromRequest<S> for ProductForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state).await?;
        Self::from_multipart(multipart).await
    }
}

async fn drain(mut field: Field<'_>) -> Result<(), AppError> {
    while field.chunk().await.map_err(invalid_multipart)?.is_some() {}
    Ok(())
}

async fn read_file(mut field: Field<'_>) -> Result<UploadedFile, AppError> {
    let original_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let mut data: Vec<u8> = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(invalid_multipart)? {
        if data.len() + chunk.len() > MAX_FILE_BYTES {
            return Err(AppError::BadRequest(format!(
                "File '{}' exceeds the {} MiB limit",
                original_name,
                MAX_FILE_BYTES / (1024 * 1024)
            )));
        }
        data.extend_from_slice(&chunk);
    }

    Ok(UploadedFile {
        original_name,
        content_type,
        data: Bytes::from(data),
    })
}
