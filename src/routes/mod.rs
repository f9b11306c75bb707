mod admin;
pub mod extract;
mod home;
pub mod product_form;
mod products;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::middleware::auth::require_admin_for_writes;
use crate::middleware::upload_folder::{set_upload_folder, UploadFolder};
use crate::models::product::{MAX_FILES, MAX_FILE_BYTES};
use crate::state::AppState;

/// Whole-request cap for product forms: every file at its limit plus room for text fields.
pub const MAX_FORM_BYTES: usize = MAX_FILES * MAX_FILE_BYTES + 1024 * 1024;

// Define the OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        home::root,
        admin::login,
        admin::register,
        admin::verify_token,
        products::list_products,
        products::list_categories,
        products::get_product,
        products::get_product_by_category,
        products::create_product,
        products::update_product,
        products::delete_product,
    ),
    components(
        schemas(
            home::RootResponse,
            admin::CredentialsRequest,
            admin::TokenResponse,
            admin::VerifyTokenRequest,
            admin::VerifyTokenResponse,
            products::ProductResponse,
            products::CategorySummary,
            products::CreateProductResponse,
            products::MessageResponse,
            crate::entities::product_category::Model,
            crate::entities::product_media::Model,
            crate::entities::product_media::MediaType,
            crate::entities::product_size::Model,
            crate::services::token::AdminClaims,
        )
    ),
    tags(
        (name = "General", description = "General API information"),
        (name = "Admin", description = "Admin login, registration and token verification"),
        (name = "Products", description = "Product catalog with media and size variants")
    ),
    info(
        title = "Product Catalog API",
        version = "0.1.0",
        description = "Product catalog backend with admin authentication, media uploads and size variants",
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

// Add security scheme for JWT Bearer tokens
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            utoipa::openapi::security::SecurityScheme::Http(
                utoipa::openapi::security::Http::new(
                    utoipa::openapi::security::HttpAuthScheme::Bearer
                )
            ),
        );
    }
}

pub fn create_routes(state: AppState) -> Router {
    // Swagger UI (stateless)
    let swagger_router: Router = SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into();

    let admin_routes = Router::new()
        .route("/login", post(admin::login))
        .route("/register", post(admin::register))
        .route("/verify-token", post(admin::verify_token));

    let mut product_routes = Router::new()
        .route(
            "/api/products",
            get(products::list_products).post(products::create_product),
        )
        .route("/api/products/categories", get(products::list_categories))
        .route(
            "/api/products/category/{id}",
            get(products::get_product_by_category),
        )
        .route(
            "/api/products/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .layer(middleware::from_fn_with_state(
            UploadFolder::PRODUCTS,
            set_upload_folder,
        ))
        .layer(DefaultBodyLimit::max(MAX_FORM_BYTES));

    if state.config.require_admin_token {
        product_routes = product_routes.route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin_for_writes,
        ));
    }

    let uploads = ServeDir::new(state.catalog.storage().root());

    let app_routes = Router::new()
        .route("/", get(home::root))
        .nest("/api/admin", admin_routes)
        .merge(product_routes)
        .nest_service("/uploads", uploads)
        .with_state(state);

    // Merge Swagger UI (which has no state) with the rest
    Router::new()
        .merge(swagger_router)
        .merge(app_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
