//! DATA phase accumulation
//!
//! Lines are stored exactly as received, line endings included. No
//! dot-unstuffing is performed.

use super::command::has_prefix_ignore_case;

const SUBJECT_HEADER: &str = "Subject:";

/// Outcome of feeding one line to the accumulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataLine {
    /// The bare `.` line; the DATA phase is over
    Terminator,
    /// A content line, now part of the body
    Content,
}

/// Message text collected during one DATA phase
#[derive(Debug, Clone, Default)]
pub struct MessageAccumulator {
    subject: String,
    body: String,
    raw: String,
}

impl MessageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything collected so far
    pub fn reset(&mut self) {
        self.subject.clear();
        self.body.clear();
        self.raw.clear();
    }

    /// Feed one line, as read from the connection
    ///
    /// Every line goes to `raw`. The terminator is kept out of `body`, and
    /// the first `Subject:` line (case-insensitive) sets the subject.
    pub fn push_line(&mut self, line: &str) -> DataLine {
        self.raw.push_str(line);

        if line.trim() == "." {
            return DataLine::Terminator;
        }

        if self.subject.is_empty() && has_prefix_ignore_case(line, SUBJECT_HEADER) {
            self.subject = line[SUBJECT_HEADER.len()..].trim().to_string();
        }
        self.body.push_str(line);

        DataLine::Content
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }
}
