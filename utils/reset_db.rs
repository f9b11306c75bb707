use sea_orm::{ConnectionTrait, Database, DbErr, Statement};
use std::env;

const TABLES: [&str; 6] = [
    "product_sizes",
    "product_media",
    "products",
    "product_category",
    "admins",
    "seaql_migrations",
];

#[tokio::main]
async fn main() -> Result<(), DbErr> {
    dotenvy::dotenv().ok();
    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://catalog.db?mode=rwc".to_string());

    let db = Database::connect(database_url).await?;
    let backend = db.get_database_backend();

    // Children first so foreign keys never block a drop.
    for table in TABLES {
        db.execute(Statement::from_string(
            backend,
            format!("DROP TABLE IF EXISTS \"{}\";", table),
        ))
        .await?;
    }

    println!("Database reset successfully");
    Ok(())
}
