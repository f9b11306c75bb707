use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::routes::extract::AppJson;
use crate::services::token::AdminClaims;
use crate::state::AppState;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CredentialsRequest {
    username: Option<String>,
    password: Option<String>,
}

impl CredentialsRequest {
    fn into_parts(self) -> Result<(String, String), AppError> {
        match (self.username, self.password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Ok((username, password))
            }
            _ => Err(AppError::BadRequest(
                "Username and password are required".to_string(),
            )),
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TokenResponse {
    message: String,
    token: String,
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct VerifyTokenRequest {
    token: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct VerifyTokenResponse {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<AdminClaims>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl VerifyTokenResponse {
    fn rejected(error: &str) -> (StatusCode, Json<Self>) {
        (
            StatusCode::UNAUTHORIZED,
            Json(Self {
                valid: false,
                user: None,
                error: Some(error.to_string()),
            }),
        )
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Username or password missing"),
        (status = 401, description = "Unknown user or wrong password")
    ),
    tag = "Admin"
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CredentialsRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let (username, password) = payload.into_parts()?;
    let token = state.auth.login(&username, &password).await?;

    Ok(Json(TokenResponse {
        message: "Login successful".to_string(),
        token,
    }))
}

#[utoipa::path(
    post,
    path = "/api/admin/register",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Admin registered", body = TokenResponse),
        (status = 400, description = "Username or password missing"),
        (status = 409, description = "Username already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Admin"
)]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CredentialsRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    let (username, password) = payload.into_parts()?;
    let (_admin, token) = state.auth.register(&username, &password).await?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            message: "Admin registered successfully".to_string(),
            token,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/admin/verify-token",
    request_body = VerifyTokenRequest,
    responses(
        (status = 200, description = "Token is valid", body = VerifyTokenResponse),
        (status = 401, description = "Token missing, invalid or expired", body = VerifyTokenResponse)
    ),
    tag = "Admin"
)]
pub async fn verify_token(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, Json<VerifyTokenResponse>) {
    // A missing or malformed body is treated like a missing token.
    let payload: VerifyTokenRequest = serde_json::from_slice(&body).unwrap_or_default();
    let Some(token) = payload.token.filter(|t| !t.is_empty()) else {
        return VerifyTokenResponse::rejected("Token not provided");
    };

    match state.auth.tokens().verify(&token) {
        Ok(claims) => (
            StatusCode::OK,
            Json(VerifyTokenResponse {
                valid: true,
                user: Some(claims),
                error: None,
            }),
        ),
        Err(e) => {
            tracing::debug!("Token verification failed: {}", e);
            VerifyTokenResponse::rejected("Invalid or expired token")
        }
    }
}
