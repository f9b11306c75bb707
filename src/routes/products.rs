use axum::{
    extract::State,
    response::Json,
    Extension,
};
use serde::Serialize;

use crate::entities::{product_category, product_media, product_size};
use crate::error::AppError;
use crate::middleware::upload_folder::UploadFolder;
use crate::routes::extract::AppPath;
use crate::routes::product_form::ProductForm;
use crate::services::token::AdminClaims;
use crate::state::AppState;
use crate::stores::catalog_store::ProductDetails;

#[derive(Serialize, utoipa::ToSchema)]
pub struct CategorySummary {
    pub name: String,
    pub name_en: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProductResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub category_id: i32,
    pub tags: Option<String>,
    pub brand: Option<String>,
    pub price: f64,
    pub stock: i32,
    pub media: Vec<product_media::Model>,
    pub category: Option<CategorySummary>,
    pub sizes: Vec<product_size::Model>,
}

impl From<ProductDetails> for ProductResponse {
    fn from(details: ProductDetails) -> Self {
        let ProductDetails {
            product,
            media,
            category,
            sizes,
        } = details;

        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            category_id: product.category_id,
            tags: product.tags,
            brand: product.brand,
            price: product.price,
            stock: product.stock,
            media,
            category: category.map(|c| CategorySummary {
                name: c.name,
                name_en: c.name_en,
            }),
            sizes,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CreateProductResponse {
    pub message: String,
    pub id: i32,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// Claims are only present when the write routes are token-gated.
fn acting_admin(admin: &Option<Extension<AdminClaims>>) -> &str {
    admin.as_ref().map_or("anonymous", |Extension(claims)| claims.username.as_str())
}

// Routes mounted without an upload folder write to the default one.
fn upload_folder(folder: Option<Extension<UploadFolder>>) -> &'static str {
    folder.map(|Extension(f)| f).unwrap_or_default().0
}

#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "All products with media, category and sizes", body = [ProductResponse]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let products = state.catalog.list_products().await?;
    tracing::debug!("Listing {} products", products.len());
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/products/categories",
    responses(
        (status = 200, description = "All product categories", body = [product_category::Model]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Products"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<product_category::Model>>, AppError> {
    Ok(Json(state.catalog.list_categories().await?))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product with in-stock sizes only", body = ProductResponse),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<ProductResponse>, AppError> {
    let details = state.catalog.get_product(id).await?;
    Ok(Json(ProductResponse::from(details)))
}

#[utoipa::path(
    get,
    path = "/api/products/category/{id}",
    params(
        ("id" = i32, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "First product in the category", body = ProductResponse),
        (status = 404, description = "No product in this category"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Products"
)]
pub async fn get_product_by_category(
    State(state): State<AppState>,
    AppPath(category_id): AppPath<i32>,
) -> Result<Json<ProductResponse>, AppError> {
    let details = state.catalog.get_product_by_category(category_id).await?;
    Ok(Json(ProductResponse::from(details)))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Product created", body = CreateProductResponse),
        (status = 400, description = "Missing required fields or files"),
        (status = 401, description = "Missing or invalid admin token (when required)"),
        (status = 500, description = "Internal server error")
    ),
    security(
        (),
        ("bearer_auth" = [])
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    folder: Option<Extension<UploadFolder>>,
    admin: Option<Extension<AdminClaims>>,
    form: ProductForm,
) -> Result<Json<CreateProductResponse>, AppError> {
    let input = form.fields.validate()?;
    tracing::debug!(admin = acting_admin(&admin), product = %input.name, "Creating product");

    let id = state.catalog.create_product(input, upload_folder(folder), &form.files).await?;

    Ok(Json(CreateProductResponse {
        message: "Product created".to_string(),
        id,
    }))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Product updated; media replaced by the uploaded files", body = MessageResponse),
        (status = 400, description = "Missing required fields"),
        (status = 401, description = "Missing or invalid admin token (when required)"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        (),
        ("bearer_auth" = [])
    ),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    folder: Option<Extension<UploadFolder>>,
    admin: Option<Extension<AdminClaims>>,
    form: ProductForm,
) -> Result<Json<MessageResponse>, AppError> {
    let input = form.fields.validate()?;
    tracing::debug!(admin = acting_admin(&admin), product_id = id, "Updating product");

    state.catalog.update_product(id, input, upload_folder(folder), &form.files).await?;

    Ok(Json(MessageResponse {
        message: "Product updated".to_string(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product and its media/size rows deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid admin token (when required)"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        (),
        ("bearer_auth" = [])
    ),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    admin: Option<Extension<AdminClaims>>,
) -> Result<Json<MessageResponse>, AppError> {
    tracing::debug!(admin = acting_admin(&admin), product_id = id, "Deleting product");
    state.catalog.delete_product(id).await?;

    Ok(Json(MessageResponse {
        message: "Product deleted".to_string(),
    }))
}
