use std::env;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_JWT_SECRET: &str = "default_secret";
pub const DEFAULT_BCRYPT_COST: u32 = 10;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://catalog.db?mode=rwc";
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub bcrypt_cost: u32,
    pub upload_dir: PathBuf,
    /// Gates POST/PUT/DELETE on the product routes behind a bearer token.
    pub require_admin_token: bool,
}

impl Config {
    /// Reads the process environment. Load `.env` and install the tracing
    /// subscriber first, so the default-value warnings are not lost.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, so tests don't touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("PORT")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| {
                tracing::warn!("JWT_SECRET not set, using default (insecure!)");
                DEFAULT_JWT_SECRET.to_string()
            });

        let bcrypt_cost = parse_bcrypt_cost(lookup("BCRYPT_SALT_ROUNDS").as_deref());

        let upload_dir = lookup("UPLOAD_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR));

        let require_admin_token = lookup("REQUIRE_ADMIN_TOKEN")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            port,
            database_url,
            jwt_secret,
            bcrypt_cost,
            upload_dir,
            require_admin_token,
        }
    }
}

// bcrypt accepts costs in 4..=31.
fn parse_bcrypt_cost(raw: Option<&str>) -> u32 {
    match raw.map(|v| v.trim().parse::<u32>()) {
        Some(Ok(cost)) if (4..=31).contains(&cost) => cost,
        Some(_) => {
            tracing::warn!("BCRYPT_SALT_ROUNDS is not a valid bcrypt cost, using {}", DEFAULT_BCRYPT_COST);
            DEFAULT_BCRYPT_COST
        }
        None => DEFAULT_BCRYPT_COST,
    }
}
