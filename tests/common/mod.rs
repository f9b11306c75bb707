#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use migration::{Migrator, MigratorTrait};
use product_catalog::config::Config;
use product_catalog::routes::create_routes;
use product_catalog::state::AppState;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const BOUNDARY: &str = "catalog-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub uploads: TempDir,
}

pub async fn setup() -> TestApp {
    setup_with(false).await
}

pub async fn setup_with(require_admin_token: bool) -> TestApp {
    // One pooled connection, otherwise every connection gets its own in-memory database.
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("connect to in-memory sqlite");
    Migrator::up(&db, None).await.expect("run migrations");

    let uploads = TempDir::new().expect("create upload dir");
    let config = Config {
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret".to_string(),
        bcrypt_cost: 4,
        upload_dir: uploads.path().to_path_buf(),
        require_admin_token,
    };

    let router = create_routes(AppState::new(db.clone(), config));
    TestApp {
        router,
        db,
        uploads,
    }
}

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        filename: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

pub fn image(filename: &'static str) -> Part<'static> {
    Part::File {
        name: "files",
        filename,
        content_type: "image/png",
        data: b"\x89PNG fake image bytes",
    }
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                filename,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, filename, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(
            Request::delete(uri).body(Body::empty()).unwrap(),
        )
        .await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn send_form(
        &self,
        method: Method,
        uri: &str,
        parts: &[Part<'_>],
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            );
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(multipart_body(parts))).unwrap())
            .await
    }

    pub async fn create_product(&self, parts: &[Part<'_>]) -> (StatusCode, Value) {
        self.send_form(Method::POST, "/api/products", parts, None).await
    }

    pub async fn update_product(&self, id: i64, parts: &[Part<'_>]) -> (StatusCode, Value) {
        self.send_form(Method::PUT, &format!("/api/products/{}", id), parts, None)
            .await
    }

    /// Maps a `file_url` from a response to its location in the temp upload root.
    pub fn upload_path(&self, file_url: &str) -> std::path::PathBuf {
        let relative = file_url
            .strip_prefix("uploads/")
            .expect("file urls start with uploads/");
        self.uploads.path().join(relative)
    }

    /// Number of regular files anywhere under the upload root.
    pub fn stored_file_count(&self) -> usize {
        fn walk(dir: &std::path::Path) -> usize {
            std::fs::read_dir(dir)
                .map(|entries| {
                    entries
                        .flatten()
                        .map(|entry| {
                            let path = entry.path();
                            if path.is_dir() {
                                walk(&path)
                            } else {
                                1
                            }
                        })
                        .sum()
                })
                .unwrap_or(0)
        }
        walk(self.uploads.path())
    }
}

/// A file part the way browsers send an empty file input.
pub fn blank_file() -> Part<'static> {
    Part::File {
        name: "files",
        filename: "",
        content_type: "application/octet-stream",
        data: b"",
    }
}
