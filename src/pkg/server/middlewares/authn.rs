use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::{
    pkg::{internal::auth::AuthToken, server::state::AppState},
    prelude::{Error, Result},
};

/// Resolves the session cookie to a `User` and injects it as a request
/// extension; guard evaluation downstream only ever sees id and role.
pub async fn authenticate(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let jar = CookieJar::from_headers(&headers);
    let maybe_cookie = jar.get("_Host_token").filter(|c| !c.value().is_empty());
    if let Some(cookie) = maybe_cookie {
        match AuthToken::check_token_validity(&state, cookie.value()).await {
            Ok(user) => {
                request.extensions_mut().insert(Arc::new(user));
                return Ok(next.run(request).await);
            }
            Err(err) => {
                tracing::warn!("session token rejected: {}", err);
            }
        }
    }
    tracing::warn!("token missing, authentication denied");
    Err(Error::Unauthorized)
}
