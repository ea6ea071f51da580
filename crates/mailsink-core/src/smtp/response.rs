//! SMTP Response generation
//!
//! Reply texts are fixed; clients and tests compare them literally.

use super::auth::{login_challenge_password, login_challenge_username};

/// SMTP Response builder
pub struct SmtpResponse;

impl SmtpResponse {
    /// Server greeting, the first line written on every connection
    pub fn greeting(hostname: &str) -> String {
        format!("220 {} SMTP Service Ready\n", hostname)
    }

    /// HELO/EHLO capability banner
    pub fn capabilities(hostname: &str) -> String {
        format!("250-{}\n250-AUTH LOGIN PLAIN\n250 OK\n", hostname)
    }

    /// Empty challenge for the two-step AUTH PLAIN exchange
    pub fn plain_challenge() -> String {
        "334 \n".to_string()
    }

    /// AUTH LOGIN username challenge
    pub fn username_challenge() -> String {
        format!("334 {}\n", login_challenge_username())
    }

    /// AUTH LOGIN password challenge
    pub fn password_challenge() -> String {
        format!("334 {}\n", login_challenge_password())
    }

    pub fn auth_succeeded() -> String {
        "235 2.7.0 Authentication successful\n".to_string()
    }

    pub fn auth_failed() -> String {
        "535 5.7.8 Authentication failed\n".to_string()
    }

    pub fn auth_required() -> String {
        "530 5.7.0 Authentication required\n".to_string()
    }

    pub fn sender_ok() -> String {
        "250 2.1.0 Ok\n".to_string()
    }

    pub fn recipient_ok() -> String {
        "250 2.1.5 Ok\n".to_string()
    }

    pub fn start_data() -> String {
        "354 End data with <CR><LF>.<CR><LF>\n".to_string()
    }

    /// Sent after every DATA phase, whether or not the message is stored
    pub fn queued() -> String {
        "250 2.0.0 Ok: queued\n".to_string()
    }

    pub fn bye() -> String {
        "221 2.0.0 Bye\n".to_string()
    }

    pub fn unknown_command() -> String {
        "500 5.5.1 Unknown command\n".to_string()
    }
}
