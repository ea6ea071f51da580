//! mailsink Core - SMTP session engine
//!
//! Accepts SMTP connections, authenticates each session against the
//! credentials of a project and records completed messages instead of
//! relaying them.

pub mod smtp;

pub use smtp::{MessageSink, ProjectResolver, SmtpHandler, SmtpServer};
