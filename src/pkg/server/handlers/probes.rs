use axum::extract::State;
use sqlx::query;

use crate::{pkg::server::state::AppState, prelude::Result};

pub async fn livez() -> Result<&'static str> {
    Ok("ok")
}

/// Healthy means we can reach the database.
pub async fn healthz(State(state): State<AppState>) -> Result<&'static str> {
    query("select 1").execute(&*state.db_pool).await?;
    Ok("ok")
}
