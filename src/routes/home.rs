use axum::response::Json;
use serde::Serialize;

#[derive(Serialize, utoipa::ToSchema)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is up", body = RootResponse)
    ),
    tag = "General"
)]
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Success".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
