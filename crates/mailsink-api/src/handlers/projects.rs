//! Project handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use mailsink_common::types::ProjectId;
use mailsink_storage::{
    CreateProject, EmailRepository, EmailRepositoryTrait, Project, ProjectRepository,
    ProjectRepositoryTrait,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::auth::{require_admin, require_project_access, AppState, AuthContext};
use crate::error::ApiError;

/// Purge result
#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub project_id: ProjectId,
    pub deleted: u64,
}

/// List all projects (admin only)
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<Project>>, ApiError> {
    require_admin(&auth)?;

    let repo = ProjectRepository::new(state.db_pool.clone());
    let projects = repo.list().await?;

    Ok(Json(projects))
}

/// Create a project (admin only)
///
/// The response carries the generated API key and the SMTP credentials.
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Json(input): Json<CreateProject>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    require_admin(&auth)?;

    let repo = ProjectRepository::new(state.db_pool.clone());
    let project = repo.create(input).await?;
    info!("Project {} ({}) created", project.id, project.name);

    Ok((StatusCode::CREATED, Json(project)))
}

/// Get a project by ID
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<ProjectId>,
) -> Result<Json<Project>, ApiError> {
    require_project_access(&auth, project_id)?;

    let repo = ProjectRepository::new(state.db_pool.clone());
    let project = repo
        .get(project_id)
        .await?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(project))
}

/// Delete a project and its emails (admin only)
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<ProjectId>,
) -> Result<StatusCode, ApiError> {
    require_admin(&auth)?;

    let repo = ProjectRepository::new(state.db_pool.clone());
    repo.delete(project_id).await?;
    info!("Project {} deleted", project_id);

    Ok(StatusCode::NO_CONTENT)
}

/// Delete every email of a project
pub async fn purge_project_emails(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<ProjectId>,
) -> Result<Json<PurgeResponse>, ApiError> {
    require_project_access(&auth, project_id)?;

    let projects = ProjectRepository::new(state.db_pool.clone());
    if projects.get(project_id).await?.is_none() {
        return Err(StatusCode::NOT_FOUND.into());
    }

    let emails = EmailRepository::new(state.db_pool.clone());
    let deleted = emails.purge(project_id).await?;
    info!("Purged {} emails of project {}", deleted, project_id);

    Ok(Json(PurgeResponse {
        project_id,
        deleted,
    }))
}
