//! SMTP server module

mod auth;
mod backend;
mod command;
mod data;
mod handler;
mod response;
mod server;
mod session;

pub use auth::{
    decode_login, decode_plain, login_challenge_password, login_challenge_username, AuthResult,
    Credentials, SmtpAuthenticator,
};
pub use backend::{MessageSink, ProjectResolver};
pub use command::{SmtpCommand, SmtpParser};
pub use data::{DataLine, MessageAccumulator};
pub use handler::SmtpHandler;
pub use response::SmtpResponse;
pub use server::SmtpServer;
pub use session::SmtpSession;

#[cfg(test)]
pub(crate) mod testing;
