use sea_orm::SqlErr;

use crate::entities::admin;
use crate::error::AppError;
use crate::services::password::PasswordHasher;
use crate::services::token::TokenService;
use crate::stores::admin_store::AdminStore;

/// Admin login and registration on top of the credential store.
#[derive(Clone)]
pub struct AuthService {
    admins: AdminStore,
    passwords: PasswordHasher,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(admins: AdminStore, passwords: PasswordHasher, tokens: TokenService) -> Self {
        Self {
            admins,
            passwords,
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Returns a signed token for a matching username/password pair.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        let admin = self
            .admins
            .find_by_username(username)
            .await?
            .ok_or_else(|| {
                tracing::info!(username, "Login failed: unknown user");
                AppError::Unauthorized("User not found".to_string())
            })?;

        if !self.passwords.verify(password, &admin.password).await? {
            tracing::info!(username, "Login failed: wrong password");
            return Err(AppError::Unauthorized("Incorrect password".to_string()));
        }

        tracing::info!(admin_id = admin.id, username, "Admin logged in");
        Ok(self.tokens.issue(admin.id, &admin.username)?)
    }

    /// Creates an admin and returns it with a freshly issued token.
    pub async fn register(&self, username: &str, password: &str) -> Result<(admin::Model, String), AppError> {
        let admin = self.create_admin(username, password).await?;
        let token = self.tokens.issue(admin.id, &admin.username)?;
        Ok((admin, token))
    }

    pub async fn create_admin(&self, username: &str, password: &str) -> Result<admin::Model, AppError> {
        if username.is_empty() || password.is_empty() {
            return Err(AppError::BadRequest(
                "Username and password are required".to_string(),
            ));
        }

        if self.admins.find_by_username(username).await?.is_some() {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let password_hash = self.passwords.hash(password).await?;
        let admin = self
            .admins
            .create(username, &password_hash)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    AppError::Conflict("Username already exists".to_string())
                }
                _ => AppError::from(e),
            })?;

        tracing::info!(admin_id = admin.id, username, "Admin registered");
        Ok(admin)
    }
}
