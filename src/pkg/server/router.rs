use axum::middleware::from_fn_with_state;
use axum::routing::{delete, post};
use axum::{routing::get, Router};

use super::handlers;
use super::handlers::auth::{logout, signup, verify};
use super::handlers::probes::{healthz, livez};
use super::middlewares::authn;
use super::state::AppState;
use crate::prelude::Result;

pub async fn build_routes() -> Result<Router> {
    let state = AppState::new().await?;
    let app = Router::new()
        .route(
            "/resume",
            get(handlers::resumes::get_own).put(handlers::resumes::save),
        )
        .route("/resume/submit", post(handlers::resumes::submit))
        .route("/resume/resubmit", post(handlers::resumes::resubmit))
        .route(
            "/resume/versions",
            get(handlers::resumes::list_versions).post(handlers::resumes::save_version),
        )
        .route(
            "/resume/versions/:id",
            delete(handlers::resumes::delete_version),
        )
        .route("/review/queue", get(handlers::review::queue))
        .route(
            "/review/:id/request-changes",
            post(handlers::review::request_changes),
        )
        .route("/review/:id/forward", post(handlers::review::forward))
        .route("/admin/resumes", get(handlers::admin::list_all))
        .route("/admin/resumes/:id/hire", post(handlers::admin::hire))
        .route("/admin/resumes/:id/reject", post(handlers::admin::reject))
        .route(
            "/admin/resumes/:id/return",
            post(handlers::admin::return_to_queue),
        )
        .route("/admin/metrics", get(handlers::admin::metrics))
        .route("/assist/summary", post(handlers::assist::summary))
        .route("/assist/experience", post(handlers::assist::experience))
        .route("/logout", post(logout))
        .layer(from_fn_with_state(state.clone(), authn::authenticate))
        .route("/signup", post(signup))
        .route("/verify", post(verify))
        .route("/healthz", get(healthz))
        .route("/livez", get(livez))
        .with_state(state);

    Ok(app)
}
