//! In-memory collaborators for session tests

use super::backend::{MessageSink, ProjectResolver};
use async_trait::async_trait;
use chrono::Utc;
use mailsink_common::types::{EmailId, ProjectId};
use mailsink_common::{Error, Result};
use mailsink_storage::models::{CreateEmail, Project};
use std::sync::Mutex;

pub(crate) fn project(id: ProjectId, smtp_user: &str, smtp_pass: &str) -> Project {
    Project {
        id,
        name: format!("project-{}", id),
        api_key: format!("key-{}", id),
        smtp_user: smtp_user.to_string(),
        smtp_pass: smtp_pass.to_string(),
        created_at: Utc::now(),
    }
}

#[derive(Default)]
pub(crate) struct MemoryBackend {
    projects: Vec<Project>,
    stored: Mutex<Vec<CreateEmail>>,
    fail_lookups: bool,
    fail_persist: bool,
}

impl MemoryBackend {
    pub(crate) fn with_projects(projects: Vec<Project>) -> Self {
        Self {
            projects,
            ..Default::default()
        }
    }

    pub(crate) fn failing_lookups() -> Self {
        Self {
            fail_lookups: true,
            ..Default::default()
        }
    }

    pub(crate) fn failing_persist(mut self) -> Self {
        self.fail_persist = true;
        self
    }

    pub(crate) fn stored(&self) -> Vec<CreateEmail> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProjectResolver for MemoryBackend {
    async fn resolve_project(&self, username: &str, password: &str) -> Result<Option<Project>> {
        if self.fail_lookups {
            return Err(Error::Database("lookup unavailable".to_string()));
        }
        Ok(self
            .projects
            .iter()
            .find(|p| p.smtp_user == username && p.smtp_pass == password)
            .cloned())
    }
}

#[async_trait]
impl MessageSink for MemoryBackend {
    async fn persist(&self, email: CreateEmail) -> Result<EmailId> {
        if self.fail_persist {
            return Err(Error::Database("disk full".to_string()));
        }
        let mut stored = self.stored.lock().unwrap();
        stored.push(email);
        Ok(stored.len() as EmailId)
    }
}
