use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};

use crate::entities::admin::{self, Entity as Admin};

/// Credential store for admin accounts. Uniqueness of usernames is the
/// caller's job (plus the unique index as a backstop).
#[derive(Clone)]
pub struct AdminStore {
    db: DatabaseConnection,
}

impl AdminStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<admin::Model>, DbErr> {
        Admin::find()
            .filter(admin::Column::Username.eq(username))
            .one(&self.db)
            .await
    }

    pub async fn create(&self, username: &str, password_hash: &str) -> Result<admin::Model, DbErr> {
        let admin = admin::ActiveModel {
            username: Set(username.to_string()),
            password: Set(password_hash.to_string()),
            created_at: Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        };

        admin.insert(&self.db).await
    }
}
