use std::sync::Arc;

use axum::{
    extract::{Path as AxumPath, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    pkg::{
        internal::{
            adaptors::resumes::{
                mutators::ResumeMutator, selectors::ResumeSelector, spec::ResumeRecord,
            },
            auth::User,
            workflow::{self, Operation, ResumeStatus},
        },
        server::state::{AppState, GetTxn},
    },
    prelude::{Error, Result},
};

pub(crate) async fn transition_by_id(
    state: &AppState,
    user: &User,
    id: &str,
    op: Operation,
    feedback: Option<&str>,
) -> Result<ResumeRecord> {
    // refuse ineligible roles before touching the database, otherwise the
    // not-found lookup would tell them which ids exist
    if !workflow::role_may_perform(user.role, op) {
        return Err(Error::InvalidTransition(format!(
            "operation {} is not permitted for role {}",
            op, user.role
        )));
    }
    let mut tx = state.db_pool.begin_txn().await?;
    let mut record = ResumeSelector::new(&mut tx)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("resume {id} does not exist")))?;
    let expected_version = record.version;
    workflow::apply(&mut record, op, user, feedback, Utc::now())?;
    let updated = ResumeMutator::new(&mut tx)
        .store_transition(&record, expected_version)
        .await?;
    tx.commit().await?;
    tracing::info!(
        "{} applied {} to resume {}, now {}",
        &user.name,
        op,
        &updated.id,
        updated.status
    );
    Ok(updated)
}

/// The review queue: every resume awaiting a first-pass decision.
pub async fn queue(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
) -> Result<Json<Vec<ResumeRecord>>> {
    if !user.is_reviewer() {
        return Err(Error::Forbidden);
    }
    let mut tx = state.db_pool.begin_txn().await?;
    let records = ResumeSelector::new(&mut tx)
        .list_by_status(ResumeStatus::PendingReview)
        .await?;
    Ok(Json(records))
}

#[derive(Deserialize)]
pub struct RequestChangesInput {
    pub feedback: String,
}

pub async fn request_changes(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    AxumPath(id): AxumPath<String>,
    Json(input): Json<RequestChangesInput>,
) -> Result<Json<ResumeRecord>> {
    let record = transition_by_id(
        &state,
        &user,
        &id,
        Operation::RequestChanges,
        Some(input.feedback.as_str()),
    )
    .await?;
    Ok(Json(record))
}

#[derive(Deserialize, Default)]
pub struct ForwardInput {
    pub feedback: Option<String>,
}

pub async fn forward(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    AxumPath(id): AxumPath<String>,
    Json(input): Json<ForwardInput>,
) -> Result<Json<ResumeRecord>> {
    let record = transition_by_id(
        &state,
        &user,
        &id,
        Operation::Forward,
        input.feedback.as_deref(),
    )
    .await?;
    Ok(Json(record))
}
