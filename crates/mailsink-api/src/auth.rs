//! Authentication module
//!
//! Two kinds of callers: the operator, holding the configured admin token,
//! and a project, holding its own API key. Project callers only see their
//! own emails.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use mailsink_common::types::ProjectId;
use mailsink_storage::models::Project;
use mailsink_storage::{DatabasePool, ProjectRepository, ProjectRepositoryTrait};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: DatabasePool,
    /// Token granting admin access; admin routes are closed when unset
    pub admin_token: Option<String>,
}

/// Authenticated caller
#[derive(Debug, Clone)]
pub enum AuthContext {
    Admin,
    Project(Project),
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        matches!(self, AuthContext::Admin)
    }

    /// Project the caller is restricted to, `None` for admin
    pub fn project_scope(&self) -> Option<ProjectId> {
        match self {
            AuthContext::Admin => None,
            AuthContext::Project(project) => Some(project.id),
        }
    }

    /// Check if the caller may read or modify the given project's emails
    pub fn is_authorized_for_project(&self, project_id: ProjectId) -> bool {
        match self {
            AuthContext::Admin => true,
            AuthContext::Project(project) => project.id == project_id,
        }
    }
}

/// Extract API key from request
pub fn extract_api_key(req: &Request) -> Option<&str> {
    // Check Authorization header
    if let Some(auth) = req.headers().get("authorization") {
        if let Ok(auth_str) = auth.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.trim());
            }
        }
    }

    // Check X-API-Key header
    if let Some(key) = req.headers().get("x-api-key") {
        if let Ok(key_str) = key.to_str() {
            return Some(key_str.trim());
        }
    }

    None
}

/// Compare two secrets without an early exit on the first differing byte
fn tokens_match(expected: &str, presented: &str) -> bool {
    let (expected, presented) = (expected.as_bytes(), presented.as_bytes());
    if expected.len() != presented.len() {
        return false;
    }
    expected
        .iter()
        .zip(presented)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

/// Resolve a presented token to a caller
async fn authenticate(state: &AppState, token: &str) -> Result<AuthContext, StatusCode> {
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    if let Some(admin_token) = state.admin_token.as_deref() {
        if !admin_token.is_empty() && tokens_match(admin_token, token) {
            debug!("Admin token accepted");
            return Ok(AuthContext::Admin);
        }
    }

    let repo = ProjectRepository::new(state.db_pool.clone());
    let project = repo
        .get_by_api_key(token)
        .await
        .map_err(|e| {
            error!("Database error while looking up API key: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or_else(|| {
            warn!("Unknown API key");
            StatusCode::UNAUTHORIZED
        })?;

    debug!("API key authenticated for project {}", project.id);
    Ok(AuthContext::Project(project))
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_api_key(&request).ok_or_else(|| {
        warn!("Missing API key in request to {}", request.uri().path());
        StatusCode::UNAUTHORIZED
    })?;

    let auth_context = authenticate(&state, token).await?;

    // Store auth context in request extensions
    request.extensions_mut().insert(auth_context);

    Ok(next.run(request).await)
}

/// Require the admin token
pub fn require_admin(auth_context: &AuthContext) -> Result<(), StatusCode> {
    if !auth_context.is_admin() {
        warn!(
            "Admin access denied for project {:?}",
            auth_context.project_scope()
        );
        return Err(StatusCode::FORBIDDEN);
    }
    Ok(())
}

/// Check if the caller is authorized for a specific project
/// Returns an error if not authorized
pub fn require_project_access(
    auth_context: &AuthContext,
    project_id: ProjectId,
) -> Result<(), StatusCode> {
    if !auth_context.is_authorized_for_project(project_id) {
        warn!(
            "Project access denied: API key of project {:?} tried to access project {}",
            auth_context.project_scope(),
            project_id
        );
        return Err(StatusCode::FORBIDDEN);
    }
    Ok(())
}
