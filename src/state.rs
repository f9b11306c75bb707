use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::services::auth::AuthService;
use crate::services::catalog::CatalogService;
use crate::services::password::PasswordHasher;
use crate::services::storage::UploadStorage;
use crate::services::token::TokenService;
use crate::stores::admin_store::AdminStore;

/// Shared handles injected into every handler. The pool is created once at
/// startup and each store gets its own clone of the handle.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: AuthService,
    pub catalog: CatalogService,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let auth = AuthService::new(
            AdminStore::new(db.clone()),
            PasswordHasher::new(config.bcrypt_cost),
            TokenService::new(&config.jwt_secret),
        );
        let catalog = CatalogService::new(db, UploadStorage::new(config.upload_dir.clone()));

        Self {
            config: Arc::new(config),
            auth,
            catalog,
        }
    }
}
