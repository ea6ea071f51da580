//! SMTP Session state
//!
//! Per-connection record consulted by the command dispatcher. Gating is done
//! on field values: `authenticated` opens MAIL/RCPT/DATA, and a complete
//! envelope makes a DATA phase eligible for storage.

use super::data::MessageAccumulator;
use chrono::{DateTime, Duration, Utc};
use mailsink_common::types::Envelope;
use mailsink_storage::models::{CreateEmail, Project};
use uuid::Uuid;

/// SMTP Session
#[derive(Debug)]
pub struct SmtpSession {
    /// Session ID (short, for log correlation)
    pub id: String,
    /// Set once by a successful AUTH; never cleared
    authenticated: bool,
    /// Project bound by the last successful AUTH
    project: Option<Project>,
    /// Sender and recipients
    ///
    /// Not cleared after DATA or on a new MAIL FROM, so a second
    /// transaction inherits earlier recipients.
    envelope: Envelope,
    /// Text of the current DATA phase
    data: MessageAccumulator,
    started_at: DateTime<Utc>,
}

impl SmtpSession {
    /// Create a new session
    pub fn new() -> Self {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(8);
        Self {
            id,
            authenticated: false,
            project: None,
            envelope: Envelope::default(),
            data: MessageAccumulator::new(),
            started_at: Utc::now(),
        }
    }

    /// Time since the connection was accepted
    pub fn elapsed(&self) -> Duration {
        Utc::now() - self.started_at
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    /// Bind the session to a resolved project
    pub fn authenticate(&mut self, project: Project) {
        self.authenticated = true;
        self.project = Some(project);
    }

    /// Record the MAIL FROM address, replacing any earlier one
    pub fn set_from(&mut self, address: String) {
        self.envelope.from = address;
    }

    /// Record one RCPT TO address
    pub fn add_recipient(&mut self, address: String) {
        self.envelope.recipients.push(address);
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Start a fresh DATA phase
    pub fn begin_data(&mut self) {
        self.data.reset();
    }

    pub fn data(&self) -> &MessageAccumulator {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut MessageAccumulator {
        &mut self.data
    }

    /// Build the message for the DATA phase just finished
    ///
    /// Returns `None` unless the session is authenticated and the envelope
    /// has both a sender and at least one recipient.
    pub fn assemble_message(&self) -> Option<CreateEmail> {
        if !self.authenticated || !self.envelope.is_complete() {
            return None;
        }
        let project = self.project.as_ref()?;

        Some(CreateEmail {
            project_id: project.id,
            from_address: self.envelope.from.clone(),
            to_addresses: self.envelope.recipients.clone(),
            subject: self.data.subject().to_string(),
            body: self.data.body().to_string(),
            raw: self.data.raw().to_string(),
            received_at: Utc::now(),
        })
    }
}

impl Default for SmtpSession {
    fn default() -> Self {
        Self::new()
    }
}
