//! Collaborators consumed by SMTP sessions
//!
//! Sessions only look projects up and hand finished messages over; both
//! traits are shared by every concurrent session and must be safe for
//! concurrent calls.

use async_trait::async_trait;
use mailsink_common::types::EmailId;
use mailsink_common::Result;
use mailsink_storage::models::{CreateEmail, Project};
use mailsink_storage::repository::emails::{DbEmailRepository, EmailRepository};
use mailsink_storage::repository::projects::{DbProjectRepository, ProjectRepository};

/// Maps SMTP credentials to a project
#[async_trait]
pub trait ProjectResolver: Send + Sync {
    async fn resolve_project(&self, username: &str, password: &str) -> Result<Option<Project>>;
}

/// Durably stores a completed message
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn persist(&self, email: CreateEmail) -> Result<EmailId>;
}

#[async_trait]
impl ProjectResolver for DbProjectRepository {
    async fn resolve_project(&self, username: &str, password: &str) -> Result<Option<Project>> {
        self.find_by_smtp_credentials(username, password).await
    }
}

#[async_trait]
impl MessageSink for DbEmailRepository {
    async fn persist(&self, email: CreateEmail) -> Result<EmailId> {
        self.create(email).await
    }
}
