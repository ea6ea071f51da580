//! Database models

use chrono::{DateTime, Utc};
use mailsink_common::types::{EmailId, ProjectId};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// Project model
///
/// The tenant identity behind one SMTP credential pair. `smtp_user` is unique
/// across projects.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub api_key: String,
    pub smtp_user: String,
    pub smtp_pass: String,
    pub created_at: DateTime<Utc>,
}

/// Create project input
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub smtp_user: String,
    pub smtp_pass: String,
}

impl CreateProject {
    /// Trim every field and reject empty ones
    pub fn normalized(&self) -> mailsink_common::Result<Self> {
        let name = self.name.trim();
        let smtp_user = self.smtp_user.trim();
        let smtp_pass = self.smtp_pass.trim();

        for (field, value) in [
            ("name", name),
            ("smtp_user", smtp_user),
            ("smtp_pass", smtp_pass),
        ] {
            if value.is_empty() {
                return Err(mailsink_common::Error::Validation(format!(
                    "{} must not be empty",
                    field
                )));
            }
        }

        Ok(Self {
            name: name.to_string(),
            smtp_user: smtp_user.to_string(),
            smtp_pass: smtp_pass.to_string(),
        })
    }
}

/// Captured email model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Email {
    pub id: EmailId,
    pub project_id: ProjectId,
    pub from_address: String,
    pub to_addresses: Json<Vec<String>>,
    pub subject: String,
    pub body: String,
    pub raw: String,
    pub received_at: DateTime<Utc>,
}

impl Email {
    /// Envelope recipients in RCPT TO order
    pub fn recipients(&self) -> &[String] {
        &self.to_addresses.0
    }
}

/// Email listing row (no body or raw text)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct EmailSummary {
    pub id: EmailId,
    pub project_id: ProjectId,
    pub from_address: String,
    pub to_addresses: Json<Vec<String>>,
    pub subject: String,
    pub received_at: DateTime<Utc>,
}

/// A message assembled at the end of an eligible DATA phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEmail {
    pub project_id: ProjectId,
    pub from_address: String,
    pub to_addresses: Vec<String>,
    pub subject: String,
    pub body: String,
    pub raw: String,
    /// Capture time, not the delivery time claimed by the client
    pub received_at: DateTime<Utc>,
}
