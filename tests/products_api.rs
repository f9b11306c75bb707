mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use product_catalog::entities::{product, product_category, product_media, product_size};
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait};
use serde_json::{json, Value};

use common::{blank_file, image, setup, setup_with, Part, TestApp};

fn shoe_form<'a>(name: &'a str, sizes: &'a str) -> Vec<Part<'a>> {
    vec![
        Part::Text("name", name),
        Part::Text("category_name", "Shoes"),
        Part::Text("category_name_en", "Shoes"),
        Part::Text("price", "49.99"),
        Part::Text("stock", "10"),
        Part::Text("sizes", sizes),
    ]
}

async fn create_shoe(app: &TestApp, name: &str, sizes: &str) -> i64 {
    let mut parts = shoe_form(name, sizes);
    parts.push(image("front.png"));
    let (status, body) = app.create_product(&parts).await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", body);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn created_product_reads_back_with_media_and_sizes() {
    let app = setup().await;

    let id = create_shoe(&app, "Red Shoes", r#"[{"size":"M","quantity":5}]"#).await;

    let (status, body) = app.get(&format!("/api/products/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Red Shoes");
    assert_eq!(body["price"], 49.99);
    assert_eq!(body["stock"], 10);
    assert_eq!(body["category"], json!({"name": "Shoes", "name_en": "Shoes"}));

    let media = body["media"].as_array().unwrap();
    assert_eq!(media.len(), 1);
    assert_eq!(media[0]["file_type"], "image");
    let url = media[0]["file_url"].as_str().unwrap();
    assert!(url.starts_with("uploads/products/RedShoes_"), "{}", url);
    assert!(url.ends_with(".png"), "{}", url);
    assert!(app.upload_path(url).is_file());

    let sizes = body["sizes"].as_array().unwrap();
    assert_eq!(sizes.len(), 1);
    assert_eq!(sizes[0]["size"], "M");
    assert_eq!(sizes[0]["quantity"], 5);
}

#[tokio::test]
async fn uploaded_files_are_served_statically() {
    let app = setup().await;
    let id = create_shoe(&app, "Static", "[]").await;

    let (_, body) = app.get(&format!("/api/products/{}", id)).await;
    let url = body["media"][0]["file_url"].as_str().unwrap().to_string();

    let (status, served) = app.get(&format!("/{}", url)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(served.as_str().unwrap().contains("fake image bytes"));
}

#[tokio::test]
async fn category_pair_is_reused() {
    let app = setup().await;

    let first = create_shoe(&app, "First", "[]").await;
    let second = create_shoe(&app, "Second", "[]").await;

    assert_eq!(product_category::Entity::find().count(&app.db).await.unwrap(), 1);

    let (_, first) = app.get(&format!("/api/products/{}", first)).await;
    let (_, second) = app.get(&format!("/api/products/{}", second)).await;
    assert_eq!(first["category_id"], second["category_id"]);

    let (status, categories) = app.get("/api/products/categories").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(categories.as_array().unwrap().len(), 1);
    assert_eq!(categories[0]["name_en"], "Shoes");
}

#[tokio::test]
async fn single_product_hides_sold_out_sizes_but_list_keeps_them() {
    let app = setup().await;
    let id = create_shoe(
        &app,
        "Boots",
        r#"[{"size":"S","quantity":0},{"size":"L","quantity":3}]"#,
    )
    .await;

    let (_, single) = app.get(&format!("/api/products/{}", id)).await;
    let sizes = single["sizes"].as_array().unwrap();
    assert_eq!(sizes.len(), 1);
    assert_eq!(sizes[0]["size"], "L");

    let (status, list) = app.get("/api/products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["sizes"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn product_by_category_returns_its_own_media() {
    let app = setup().await;
    let id = create_shoe(&app, "Sneakers", "[]").await;

    let (_, single) = app.get(&format!("/api/products/{}", id)).await;
    let category_id = single["category_id"].as_i64().unwrap();

    let (status, body) = app
        .get(&format!("/api/products/category/{}", category_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    assert_eq!(body["media"], single["media"]);

    let (status, _) = app.get("/api/products/category/9999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_requires_names_and_files() {
    let app = setup().await;

    let (status, body) = app
        .create_product(&[Part::Text("name", "No category"), image("a.png")])
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name and category names are required.");

    let (status, _) = app.create_product(&shoe_form("No files", "[]")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(product::Entity::find().count(&app.db).await.unwrap(), 0);
}

#[tokio::test]
async fn update_without_files_clears_media_and_removes_old_files() {
    let app = setup().await;
    let id = create_shoe(&app, "Loafers", r#"[{"size":"M","quantity":1}]"#).await;

    let (_, before) = app.get(&format!("/api/products/{}", id)).await;
    let old_path = app.upload_path(before["media"][0]["file_url"].as_str().unwrap());
    assert!(old_path.is_file());

    let parts = vec![
        Part::Text("name", "Loafers v2"),
        Part::Text("category_name", "Shoes"),
        Part::Text("category_name_en", "Shoes"),
        Part::Text("price", "59.5"),
    ];
    let (status, body) = app.update_product(id, &parts).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product updated");

    let (_, after) = app.get(&format!("/api/products/{}", id)).await;
    assert_eq!(after["name"], "Loafers v2");
    assert_eq!(after["price"], 59.5);
    assert_eq!(after["stock"], 0);
    assert!(after["media"].as_array().unwrap().is_empty());
    // No sizes field in the form: sizes are left alone.
    assert_eq!(after["sizes"].as_array().unwrap().len(), 1);
    assert!(!old_path.exists());
}

#[tokio::test]
async fn update_replaces_sizes_when_given() {
    let app = setup().await;
    let id = create_shoe(&app, "Clogs", r#"[{"size":"M","quantity":1}]"#).await;

    let mut parts = shoe_form("Clogs", r#"[{"size":"XL","quantity":7}]"#);
    parts.push(image("side.jpg"));
    let (status, _) = app.update_product(id, &parts).await;
    assert_eq!(status, StatusCode::OK);

    let (_, after) = app.get(&format!("/api/products/{}", id)).await;
    let sizes = after["sizes"].as_array().unwrap();
    assert_eq!(sizes.len(), 1);
    assert_eq!(sizes[0]["size"], "XL");
    let media = after["media"].as_array().unwrap();
    assert_eq!(media.len(), 1);
    assert!(media[0]["file_url"].as_str().unwrap().ends_with(".jpg"));
}

#[tokio::test]
async fn update_of_unknown_product_is_not_found() {
    let app = setup().await;

    let mut parts = shoe_form("Ghost", "[]");
    parts.push(image("ghost.png"));
    let (status, _) = app.update_product(4242, &parts).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(product_media::Entity::find().count(&app.db).await.unwrap(), 0);
    assert_eq!(app.stored_file_count(), 0);
}

#[tokio::test]
async fn delete_removes_rows_and_unknown_id_changes_nothing() {
    let app = setup().await;
    let keep = create_shoe(&app, "Keep", r#"[{"size":"M","quantity":2}]"#).await;
    let gone = create_shoe(&app, "Gone", r#"[{"size":"S","quantity":1}]"#).await;
    let (_, before) = app.get(&format!("/api/products/{}", gone)).await;
    let gone_file = app.upload_path(before["media"][0]["file_url"].as_str().unwrap());

    let (status, _) = app.delete("/api/products/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(product::Entity::find().count(&app.db).await.unwrap(), 2);
    assert_eq!(product_media::Entity::find().count(&app.db).await.unwrap(), 2);
    assert_eq!(product_size::Entity::find().count(&app.db).await.unwrap(), 2);

    let (status, body) = app.delete(&format!("/api/products/{}", gone)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product deleted");

    let (status, _) = app.get(&format!("/api/products/{}", gone)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get(&format!("/api/products/{}", keep)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product_media::Entity::find().count(&app.db).await.unwrap(), 1);
    assert_eq!(product_size::Entity::find().count(&app.db).await.unwrap(), 1);
    // Rows go, files stay.
    assert!(gone_file.is_file());
}

#[tokio::test]
async fn writes_need_a_token_when_required() {
    let app = setup_with(true).await;

    let mut parts = shoe_form("Guarded", "[]");
    parts.push(image("g.png"));
    let (status, _) = app.create_product(&parts).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, registered) = app
        .post_json(
            "/api/admin/register",
            json!({"username": "admin", "password": "pw"}),
        )
        .await;
    let token = registered["token"].as_str().unwrap();

    let (status, body) = app
        .send_form(Method::POST, "/api/products", &parts, Some(token))
        .await;
    assert_eq!(status, StatusCode::OK);
    let id = body["id"].as_i64().unwrap();

    // Reads stay open.
    let (status, _) = app.get(&format!("/api/products/{}", id)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            Request::delete(format!("/api/products/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn openapi_document_lists_product_routes() {
    let app = setup().await;

    let (status, doc) = app.get("/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    let paths: &Value = &doc["paths"];
    assert!(paths.get("/api/products").is_some());
    assert!(paths.get("/api/products/{id}").is_some());
    assert!(paths.get("/api/admin/login").is_some());
}

#[tokio::test]
async fn blank_file_inputs_are_not_uploads() {
    let app = setup().await;

    let mut parts = shoe_form("Red Shoes", "[]");
    parts.push(blank_file());
    let (status, body) = app.create_product(&parts).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    assert!(body["error"].is_string());
    assert_eq!(product::Entity::find().count(&app.db).await.unwrap(), 0);
    assert_eq!(app.stored_file_count(), 0);

    let id = create_shoe(&app, "Red Shoes", "[]").await;
    let (_, before) = app.get(&format!("/api/products/{}", id)).await;
    let old_file = app.upload_path(before["media"][0]["file_url"].as_str().unwrap());

    let mut parts = shoe_form("Red Shoes", "[]");
    parts.push(blank_file());
    let (status, _) = app.update_product(id, &parts).await;
    assert_eq!(status, StatusCode::OK);

    let (_, after) = app.get(&format!("/api/products/{}", id)).await;
    assert!(after["media"].as_array().unwrap().is_empty());
    assert!(!old_file.exists());
    assert_eq!(app.stored_file_count(), 0);
}

#[tokio::test]
async fn failed_write_rolls_back_rows_and_staged_files() {
    let app = setup().await;
    app.db
        .execute_unprepared("DROP TABLE product_sizes")
        .await
        .unwrap();

    let mut parts = shoe_form("Doomed", r#"[{"size":"M","quantity":1}]"#);
    parts.push(image("doomed.png"));
    let (status, body) = app.create_product(&parts).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");

    assert_eq!(product::Entity::find().count(&app.db).await.unwrap(), 0);
    assert_eq!(product_category::Entity::find().count(&app.db).await.unwrap(), 0);
    assert_eq!(product_media::Entity::find().count(&app.db).await.unwrap(), 0);
    assert_eq!(app.stored_file_count(), 0);
}

#[tokio::test]
async fn more_than_ten_files_are_rejected() {
    let app = setup().await;

    let mut parts = shoe_form("Many", "[]");
    parts.extend((0..11).map(|_| image("many.png")));
    let (status, body) = app.create_product(&parts).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Too many files (max 10)");
    assert_eq!(product::Entity::find().count(&app.db).await.unwrap(), 0);
    assert_eq!(app.stored_file_count(), 0);
}

#[tokio::test]
async fn oversized_file_is_rejected() {
    let app = setup().await;

    let big = vec![0u8; 10 * 1024 * 1024 + 1];
    let mut parts = shoe_form("Huge", "[]");
    parts.push(Part::File {
        name: "files",
        filename: "huge.mp4",
        content_type: "video/mp4",
        data: &big,
    });
    let (status, body) = app.create_product(&parts).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("10 MiB"));
    assert_eq!(app.stored_file_count(), 0);
}

#[tokio::test]
async fn extractor_failures_use_the_error_body() {
    let app = setup().await;

    let (status, body) = app.get("/api/products/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{}", body);

    let (status, body) = app
        .send(
            Request::post("/api/products")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await;
    assert!(status.is_client_error(), "{}", status);
    assert!(body["error"].is_string(), "{}", body);
}
