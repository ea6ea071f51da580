//! Common types for mailsink

use serde::{Deserialize, Serialize};

/// Unique identifier for projects
pub type ProjectId = i64;

/// Unique identifier for stored emails
pub type EmailId = i64;

/// Message envelope (SMTP level)
///
/// Addresses are kept as the client sent them, minus any angle brackets.
/// An empty `from` means no transaction has been opened yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Sender (last accepted MAIL FROM)
    pub from: String,

    /// Recipients (every accepted RCPT TO, in order)
    pub recipients: Vec<String>,
}

impl Envelope {
    /// Whether both a sender and at least one recipient are present
    pub fn is_complete(&self) -> bool {
        !self.from.is_empty() && !self.recipients.is_empty()
    }
}

/// Strip surrounding whitespace and any `<`/`>` wrapper from an address argument
pub fn strip_address(arg: &str) -> &str {
    arg.trim().trim_matches(|c| c == '<' || c == '>')
}
