use std::sync::Arc;

use axum::{
    extract::{Path as AxumPath, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    pkg::{
        internal::{
            adaptors::{
                resumes::{
                    mutators::ResumeMutator,
                    selectors::ResumeSelector,
                    spec::{ResumeContent, ResumeRecord},
                },
                versions::{
                    mutators::VersionMutator, selectors::VersionSelector,
                    spec::ResumeVersionEntry,
                },
            },
            auth::User,
            workflow::{self, Operation},
        },
        server::state::{AppState, GetTxn},
    },
    prelude::{Error, Result},
};

/// Owner view: their own record, in any state.
pub async fn get_own(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
) -> Result<Json<ResumeRecord>> {
    let mut tx = state.db_pool.begin_txn().await?;
    let record = ResumeSelector::new(&mut tx)
        .get_by_owner(&user.user_id)
        .await?
        .ok_or_else(|| Error::NotFound("no resume saved yet".into()))?;
    Ok(Json(record))
}

/// Content upsert. The first save creates the record in `draft`; afterwards
/// edits are only accepted while the owner still controls the record.
pub async fn save(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Json(content): Json<ResumeContent>,
) -> Result<Json<ResumeRecord>> {
    let mut tx = state.db_pool.begin_txn().await?;
    let existing = ResumeSelector::new(&mut tx)
        .get_by_owner(&user.user_id)
        .await?;
    let record = match existing {
        None => {
            ResumeMutator::new(&mut tx)
                .create_draft(&user.user_id, &content)
                .await?
        }
        Some(current) => {
            if !workflow::can_edit_content(current.status) {
                return Err(Error::InvalidTransition(format!(
                    "content edits are not permitted while the resume is {}",
                    current.status
                )));
            }
            ResumeMutator::new(&mut tx)
                .update_content(&user.user_id, &content, current.version)
                .await?
        }
    };
    tx.commit().await?;
    Ok(Json(record))
}

async fn transition_own(state: &AppState, user: &User, op: Operation) -> Result<ResumeRecord> {
    let mut tx = state.db_pool.begin_txn().await?;
    let mut record = ResumeSelector::new(&mut tx)
        .get_by_owner(&user.user_id)
        .await?
        .ok_or_else(|| Error::NotFound("no resume saved yet".into()))?;
    let expected_version = record.version;
    workflow::apply(&mut record, op, user, None, Utc::now())?;
    let updated = ResumeMutator::new(&mut tx)
        .store_transition(&record, expected_version)
        .await?;
    tx.commit().await?;
    tracing::info!("resume {} is now {}", &updated.id, updated.status);
    Ok(updated)
}

pub async fn submit(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
) -> Result<Json<ResumeRecord>> {
    let record = transition_own(&state, &user, Operation::Submit).await?;
    Ok(Json(record))
}

pub async fn resubmit(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
) -> Result<Json<ResumeRecord>> {
    let record = transition_own(&state, &user, Operation::Resubmit).await?;
    Ok(Json(record))
}

#[derive(Deserialize)]
pub struct SaveVersionInput {
    pub name: String,
}

pub async fn save_version(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Json(input): Json<SaveVersionInput>,
) -> Result<Json<ResumeVersionEntry>> {
    if input.name.trim().is_empty() {
        return Err(Error::ValidationFailed(
            "version name must not be empty".into(),
        ));
    }
    let mut tx = state.db_pool.begin_txn().await?;
    let record = ResumeSelector::new(&mut tx)
        .get_by_owner(&user.user_id)
        .await?
        .ok_or_else(|| Error::NotFound("no resume saved yet".into()))?;
    let version = VersionMutator::new(&mut tx)
        .create(&record, input.name.trim())
        .await?;
    tx.commit().await?;
    Ok(Json(version))
}

pub async fn list_versions(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
) -> Result<Json<Vec<ResumeVersionEntry>>> {
    let mut tx = state.db_pool.begin_txn().await?;
    let versions = VersionSelector::new(&mut tx)
        .list_for_owner(&user.user_id)
        .await?;
    Ok(Json(versions))
}

pub async fn delete_version(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<Value>> {
    let mut tx = state.db_pool.begin_txn().await?;
    VersionMutator::new(&mut tx)
        .delete(&user.user_id, &id)
        .await?;
    tx.commit().await?;
    Ok(Json(json!({"message": "version deleted"})))
}
