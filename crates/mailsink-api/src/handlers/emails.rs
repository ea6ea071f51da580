//! Email handlers
//!
//! Project callers are confined to their own project's emails; admin sees
//! everything and may filter by project.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use mailsink_common::types::{EmailId, ProjectId};
use mailsink_storage::{Email, EmailRepository, EmailRepositoryTrait, EmailSummary};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::{require_project_access, AppState, AuthContext};
use crate::error::ApiError;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 500;

/// List emails query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ListEmailsQuery {
    pub project_id: Option<ProjectId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Email list response
#[derive(Debug, Serialize)]
pub struct EmailListResponse {
    pub data: Vec<EmailSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// List emails, newest first
pub async fn list_emails(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListEmailsQuery>,
) -> Result<Json<EmailListResponse>, ApiError> {
    let project_id = match (query.project_id, auth.project_scope()) {
        (Some(requested), _) => {
            require_project_access(&auth, requested)?;
            Some(requested)
        }
        (None, scope) => scope,
    };

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = query.offset.unwrap_or(0).max(0);

    let repo = EmailRepository::new(state.db_pool.clone());
    let data = repo.list(project_id, limit, offset).await?;
    let total = repo.count(project_id).await?;

    Ok(Json(EmailListResponse {
        data,
        total,
        limit,
        offset,
    }))
}

/// Fetch one email, raw text included
async fn find_email(
    state: &AppState,
    auth: &AuthContext,
    email_id: EmailId,
) -> Result<Email, ApiError> {
    let repo = EmailRepository::new(state.db_pool.clone());
    let email = repo.get(email_id).await?.ok_or_else(|| {
        warn!("Email {} not found", email_id);
        StatusCode::NOT_FOUND
    })?;

    require_project_access(auth, email.project_id)?;
    Ok(email)
}

/// Get an email by ID
pub async fn get_email(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(email_id): Path<EmailId>,
) -> Result<Json<Email>, ApiError> {
    let email = find_email(&state, &auth, email_id).await?;
    Ok(Json(email))
}

/// Delete an email
pub async fn delete_email(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(email_id): Path<EmailId>,
) -> Result<StatusCode, ApiError> {
    find_email(&state, &auth, email_id).await?;

    let repo = EmailRepository::new(state.db_pool.clone());
    repo.delete(email_id).await?;
    info!("Email {} deleted", email_id);

    Ok(StatusCode::NO_CONTENT)
}
