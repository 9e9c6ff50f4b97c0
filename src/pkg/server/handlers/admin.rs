use std::sync::Arc;

use axum::{
    extract::{Path as AxumPath, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    pkg::{
        internal::{
            adaptors::resumes::{selectors::ResumeSelector, spec::ResumeRecord},
            auth::User,
            workflow::{Operation, ResumeStatus},
        },
        server::{
            handlers::review::transition_by_id,
            state::{AppState, GetTxn},
        },
    },
    prelude::{Error, Result},
};

/// Admin view: every record regardless of status.
pub async fn list_all(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
) -> Result<Json<Vec<ResumeRecord>>> {
    if !user.is_admin() {
        return Err(Error::Forbidden);
    }
    let mut tx = state.db_pool.begin_txn().await?;
    let records = ResumeSelector::new(&mut tx).list_all().await?;
    Ok(Json(records))
}

#[derive(Deserialize, Default)]
pub struct DecisionInput {
    pub feedback: Option<String>,
}

pub async fn hire(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    AxumPath(id): AxumPath<String>,
    Json(input): Json<DecisionInput>,
) -> Result<Json<ResumeRecord>> {
    let record = transition_by_id(
        &state,
        &user,
        &id,
        Operation::DecideHire,
        input.feedback.as_deref(),
    )
    .await?;
    Ok(Json(record))
}

pub async fn reject(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    AxumPath(id): AxumPath<String>,
    Json(input): Json<DecisionInput>,
) -> Result<Json<ResumeRecord>> {
    let record = transition_by_id(
        &state,
        &user,
        &id,
        Operation::DecideReject,
        input.feedback.as_deref(),
    )
    .await?;
    Ok(Json(record))
}

pub async fn return_to_queue(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<ResumeRecord>> {
    let record = transition_by_id(&state, &user, &id, Operation::ReturnToQueue, None).await?;
    Ok(Json(record))
}

#[derive(Serialize)]
pub struct SystemMetrics {
    pub total_users: i64,
    pub resumes_created: i64,
    pub pending_reviews: i64,
    pub hired: i64,
    pub rejected: i64,
}

pub async fn metrics(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
) -> Result<Json<SystemMetrics>> {
    if !user.is_admin() {
        return Err(Error::Forbidden);
    }
    let total_users = User::count(&state).await?;
    let mut tx = state.db_pool.begin_txn().await?;
    let mut selector = ResumeSelector::new(&mut tx);
    let metrics = SystemMetrics {
        total_users,
        resumes_created: selector.count_all().await?,
        pending_reviews: selector.count_by_status(ResumeStatus::PendingReview).await?,
        hired: selector.count_by_status(ResumeStatus::Hired).await?,
        rejected: selector.count_by_status(ResumeStatus::Rejected).await?,
    };
    Ok(Json(metrics))
}
