use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, HeaderValue},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::{
    pkg::{
        internal::auth::{AuthToken, User},
        server::state::AppState,
    },
    prelude::{Error, Result},
};

#[derive(Deserialize)]
pub struct SignupInput {
    pub email: String,
    pub name: String,
}

#[derive(Deserialize, Validate)]
pub struct VerifyInput {
    pub email: String,
    #[validate(length(equal = 6))]
    pub code: String,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupInput>,
) -> Result<Json<Value>> {
    let user = AuthToken::issue_user_token(&state, &input.email, &input.name).await?;
    tracing::info!("verification code issued for {}", &user.email);
    Ok(Json(json!({"message": "verification code sent"})))
}

pub async fn verify(
    State(state): State<AppState>,
    Json(input): Json<VerifyInput>,
) -> Result<(HeaderMap, Json<Value>)> {
    input
        .validate()
        .map_err(|e| Error::ValidationFailed(e.to_string()))?;
    let (user, token) = AuthToken::verify_code(&state, &input.email, &input.code).await?;
    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        HeaderValue::from_str(&format!("_Host_token={}; Path=/; HttpOnly", &token))?,
    );
    tracing::info!("user {} verified", &user.name);
    Ok((
        headers,
        Json(json!({
            "message": "verification successful",
            "name": user.name,
            "role": user.role
        })),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
) -> Result<Json<Value>> {
    AuthToken::expire_all(&state, &user.user_id).await?;
    tracing::info!("user {} logged out successfully", &user.name);
    Ok(Json(json!({"message": "logged out"})))
}
