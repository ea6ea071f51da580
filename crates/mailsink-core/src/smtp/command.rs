//! SMTP Command definitions
//!
//! Classifies one trimmed input line. Keywords match ASCII-case-insensitively
//! by prefix, in the order listed on [`SmtpParser::parse`], except `DATA` and
//! `QUIT`, which must match exactly.

use mailsink_common::types::strip_address;

/// SMTP Command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmtpCommand {
    /// HELO / EHLO - Identify the client, answered with the capability banner
    Hello,
    /// AUTH PLAIN [initial-response]
    AuthPlain {
        initial_response: Option<String>,
    },
    /// AUTH LOGIN - Username and password follow as separate challenges
    AuthLogin,
    /// MAIL FROM:<address>
    MailFrom {
        address: String,
    },
    /// RCPT TO:<address>
    RcptTo {
        address: String,
    },
    /// DATA - Start the message body
    Data,
    /// QUIT - End session
    Quit,
    /// Anything else
    Unknown {
        command: String,
    },
}

/// SMTP Command Parser
pub struct SmtpParser;

impl SmtpParser {
    /// Parse an SMTP command line
    ///
    /// Priority: `HELO`/`EHLO`, `AUTH PLAIN`, `AUTH LOGIN`, `MAIL FROM:`,
    /// `RCPT TO:`, then `DATA` and `QUIT`, which must be the whole line in
    /// upper case.
    pub fn parse(line: &str) -> SmtpCommand {
        let line = line.trim();

        if has_prefix_ignore_case(line, "HELO") || has_prefix_ignore_case(line, "EHLO") {
            return SmtpCommand::Hello;
        }

        if has_prefix_ignore_case(line, "AUTH PLAIN") {
            let parts: Vec<&str> = line.split_whitespace().collect();
            let initial_response = if parts.len() == 3 {
                Some(parts[2].to_string())
            } else {
                None
            };
            return SmtpCommand::AuthPlain { initial_response };
        }

        if has_prefix_ignore_case(line, "AUTH LOGIN") {
            return SmtpCommand::AuthLogin;
        }

        if has_prefix_ignore_case(line, "MAIL FROM:") {
            return SmtpCommand::MailFrom {
                address: strip_address(&line["MAIL FROM:".len()..]).to_string(),
            };
        }

        if has_prefix_ignore_case(line, "RCPT TO:") {
            return SmtpCommand::RcptTo {
                address: strip_address(&line["RCPT TO:".len()..]).to_string(),
            };
        }

        if line == "DATA" {
            return SmtpCommand::Data;
        }

        if line == "QUIT" {
            return SmtpCommand::Quit;
        }

        SmtpCommand::Unknown {
            command: line.to_string(),
        }
    }
}

/// ASCII-case-insensitive `starts_with`
pub(crate) fn has_prefix_ignore_case(line: &str, prefix: &str) -> bool {
    line.len() >= prefix.len()
        && line.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}
