//! Database statistics

use axum::{extract::State, Extension, Json};
use mailsink_common::types::ProjectId;
use mailsink_storage::{EmailRepository, EmailRepositoryTrait, ProjectRepository, ProjectRepositoryTrait};
use serde::Serialize;
use std::sync::Arc;

use crate::auth::{require_admin, AppState, AuthContext};
use crate::error::ApiError;

/// Per-project email count
#[derive(Debug, Serialize)]
pub struct ProjectStats {
    pub id: ProjectId,
    pub name: String,
    pub emails: i64,
}

/// Stats response
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub projects: i64,
    pub emails: i64,
    pub per_project: Vec<ProjectStats>,
}

/// Project and email counts (admin only)
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<StatsResponse>, ApiError> {
    require_admin(&auth)?;

    let projects = ProjectRepository::new(state.db_pool.clone());
    let emails = EmailRepository::new(state.db_pool.clone());

    let mut per_project = Vec::new();
    for project in projects.list().await? {
        per_project.push(ProjectStats {
            emails: emails.count(Some(project.id)).await?,
            id: project.id,
            name: project.name,
        });
    }

    Ok(Json(StatsResponse {
        projects: projects.count().await?,
        emails: emails.count(None).await?,
        per_project,
    }))
}
