use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    pkg::{internal::auth::User, server::state::AppState},
    prelude::{Error, Result},
};

#[derive(Deserialize)]
pub struct SummaryInput {
    pub summary: String,
    pub target_role: Option<String>,
}

/// Rewrites the candidate's professional summary. Thin glue over the AI
/// collaborator; no workflow state is touched.
pub async fn summary(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Json(input): Json<SummaryInput>,
) -> Result<Json<Value>> {
    if input.summary.trim().is_empty() {
        return Err(Error::ValidationFailed("summary must not be empty".into()));
    }
    let prompt = format!(
        "Rewrite the following resume summary as 2-3 concise, impactful \
         sentences in the first person{}. Return only the rewritten summary, \
         no preamble and no markdown.\n\nSummary:\n{}",
        input
            .target_role
            .as_deref()
            .map(|r| format!(", tailored to a {r} role"))
            .unwrap_or_default(),
        input.summary
    );
    let content = state.ai_client.direct_query(&prompt, None).await?;
    tracing::debug!("generated summary for {}", &user.user_id);
    Ok(Json(json!({"content": content.trim()})))
}

#[derive(Deserialize)]
pub struct ExperienceInput {
    pub role: String,
    pub company: String,
}

/// Drafts achievement bullets for an experience entry.
pub async fn experience(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Json(input): Json<ExperienceInput>,
) -> Result<Json<Value>> {
    if input.role.trim().is_empty() || input.company.trim().is_empty() {
        return Err(Error::ValidationFailed(
            "role and company must not be empty".into(),
        ));
    }
    let prompt = format!(
        "Write 3 resume achievement bullet points for a {} at {}. Each bullet \
         starts with a strong action verb and quantifies impact where \
         plausible. Return only the bullets, one per line, no markdown.",
        input.role, input.company
    );
    let content = state.ai_client.direct_query(&prompt, None).await?;
    tracing::debug!("generated experience bullets for {}", &user.user_id);
    Ok(Json(json!({"content": content.trim()})))
}
