//! SMTP session handler
//!
//! Drives one connection from greeting to close: reads a line, dispatches
//! it against the session state and writes the reply. AUTH and DATA read
//! further lines of their own before returning to the command loop.

use super::auth::{decode_login, decode_plain, Credentials, SmtpAuthenticator};
use super::backend::{MessageSink, ProjectResolver};
use super::command::{SmtpCommand, SmtpParser};
use super::data::DataLine;
use super::response::SmtpResponse;
use super::session::SmtpSession;
use anyhow::Result;
use mailsink_common::config::SmtpConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter,
};
use tracing::{debug, info, trace, warn};

/// What the command loop does after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Close,
}

/// SMTP session handler
pub struct SmtpHandler {
    hostname: String,
    authenticator: SmtpAuthenticator,
    sink: Arc<dyn MessageSink>,
    peer_addr: SocketAddr,
}

impl SmtpHandler {
    /// Create a new handler
    pub fn new(
        config: &SmtpConfig,
        resolver: Arc<dyn ProjectResolver>,
        sink: Arc<dyn MessageSink>,
        peer_addr: SocketAddr,
    ) -> Self {
        Self {
            hostname: config.hostname.clone(),
            authenticator: SmtpAuthenticator::new(resolver),
            sink,
            peer_addr,
        }
    }

    /// Handle an SMTP session
    ///
    /// Returns once the client quits, the stream ends or a read fails. A
    /// failed write is returned as an error.
    pub async fn handle<S>(self, stream: S) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let (reader, writer) = tokio::io::split(stream);
        let mut reader = BufReader::new(reader);
        let mut writer = BufWriter::new(writer);

        let mut session = SmtpSession::new();
        info!("[{}] SMTP session from {}", session.id, self.peer_addr);

        self.send_response(&mut writer, &SmtpResponse::greeting(&self.hostname))
            .await?;

        loop {
            let line = match read_line(&mut reader).await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!("[{}] Client {} disconnected", session.id, self.peer_addr);
                    break;
                }
                Err(e) => {
                    warn!("[{}] Read error from {}: {}", session.id, self.peer_addr, e);
                    break;
                }
            };

            let line = line.trim();
            debug!("[{}] SMTP from {}: {}", session.id, self.peer_addr, line);

            let command = SmtpParser::parse(line);
            let flow = self
                .dispatch(command, &mut session, &mut reader, &mut writer)
                .await?;

            if flow == Flow::Close {
                break;
            }
        }

        info!(
            "[{}] SMTP session from {} closed after {} ms",
            session.id,
            self.peer_addr,
            session.elapsed().num_milliseconds()
        );
        Ok(())
    }

    /// Execute one command against the session
    async fn dispatch<R, W>(
        &self,
        command: SmtpCommand,
        session: &mut SmtpSession,
        reader: &mut R,
        writer: &mut BufWriter<W>,
    ) -> Result<Flow>
    where
        R: AsyncBufRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send,
    {
        match command {
            SmtpCommand::Hello => {
                self.send_response(writer, &SmtpResponse::capabilities(&self.hostname))
                    .await?;
            }

            SmtpCommand::AuthPlain { initial_response } => {
                let payload = match initial_response {
                    Some(payload) => payload,
                    None => {
                        self.send_response(writer, &SmtpResponse::plain_challenge())
                            .await?;
                        match self.read_continuation(session, reader).await {
                            Some(line) => line,
                            None => return Ok(Flow::Close),
                        }
                    }
                };

                let credentials = decode_plain(&payload);
                self.complete_auth(session, writer, &credentials).await?;
            }

            SmtpCommand::AuthLogin => {
                self.send_response(writer, &SmtpResponse::username_challenge())
                    .await?;
                let Some(username) = self.read_continuation(session, reader).await else {
                    return Ok(Flow::Close);
                };

                self.send_response(writer, &SmtpResponse::password_challenge())
                    .await?;
                let Some(password) = self.read_continuation(session, reader).await else {
                    return Ok(Flow::Close);
                };

                let credentials = Credentials::new(decode_login(&username), decode_login(&password));
                self.complete_auth(session, writer, &credentials).await?;
            }

            SmtpCommand::MailFrom { address } => {
                if !session.is_authenticated() {
                    self.send_response(writer, &SmtpResponse::auth_required())
                        .await?;
                    return Ok(Flow::Continue);
                }
                session.set_from(address);
                self.send_response(writer, &SmtpResponse::sender_ok()).await?;
            }

            SmtpCommand::RcptTo { address } => {
                if !session.is_authenticated() {
                    self.send_response(writer, &SmtpResponse::auth_required())
                        .await?;
                    return Ok(Flow::Continue);
                }
                session.add_recipient(address);
                self.send_response(writer, &SmtpResponse::recipient_ok())
                    .await?;
            }

            SmtpCommand::Data => {
                if !session.is_authenticated() {
                    self.send_response(writer, &SmtpResponse::auth_required())
                        .await?;
                    return Ok(Flow::Continue);
                }
                return self.handle_data(session, reader, writer).await;
            }

            SmtpCommand::Quit => {
                self.send_response(writer, &SmtpResponse::bye()).await?;
                return Ok(Flow::Close);
            }

            SmtpCommand::Unknown { command } => {
                debug!("[{}] Unknown command: {}", session.id, command);
                self.send_response(writer, &SmtpResponse::unknown_command())
                    .await?;
            }
        }

        Ok(Flow::Continue)
    }

    /// Resolve credentials and reply 235 or 535
    async fn complete_auth<W>(
        &self,
        session: &mut SmtpSession,
        writer: &mut BufWriter<W>,
        credentials: &Credentials,
    ) -> Result<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let result = self.authenticator.authenticate(credentials).await;

        match result.project {
            Some(project) if result.success => {
                info!(
                    "[{}] Authenticated {} for project {} ({})",
                    session.id, credentials.username, project.id, project.name
                );
                session.authenticate(project);
                self.send_response(writer, &SmtpResponse::auth_succeeded())
                    .await
            }
            _ => {
                warn!(
                    "[{}] Authentication failed for {:?} from {}",
                    session.id, credentials.username, self.peer_addr
                );
                self.send_response(writer, &SmtpResponse::auth_failed())
                    .await
            }
        }
    }

    /// Read the client's answer to a 334 challenge
    ///
    /// `None` means the stream ended or failed; the session closes without
    /// a reply.
    async fn read_continuation<R>(&self, session: &SmtpSession, reader: &mut R) -> Option<String>
    where
        R: AsyncBufRead + Unpin + Send,
    {
        match read_line(reader).await {
            Ok(Some(line)) => Some(line),
            Ok(None) => {
                debug!("[{}] Client {} disconnected during AUTH", session.id, self.peer_addr);
                None
            }
            Err(e) => {
                warn!("[{}] Read error during AUTH from {}: {}", session.id, self.peer_addr, e);
                None
            }
        }
    }

    /// Run the DATA phase
    async fn handle_data<R, W>(
        &self,
        session: &mut SmtpSession,
        reader: &mut R,
        writer: &mut BufWriter<W>,
    ) -> Result<Flow>
    where
        R: AsyncBufRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send,
    {
        self.send_response(writer, &SmtpResponse::start_data()).await?;
        session.begin_data();

        let completed = loop {
            match read_line(reader).await {
                Ok(Some(line)) => {
                    trace!("[{}] DATA: {}", session.id, line.trim_end());
                    if session.data_mut().push_line(&line) == DataLine::Terminator {
                        break true;
                    }
                }
                Ok(None) => {
                    warn!("[{}] Client {} disconnected during DATA", session.id, self.peer_addr);
                    break false;
                }
                Err(e) => {
                    warn!("[{}] Read error during DATA from {}: {}", session.id, self.peer_addr, e);
                    break false;
                }
            }
        };

        if !completed {
            // The peer may already be gone; the lines that did arrive are kept.
            warn!("[{}] DATA phase ended without terminator", session.id);
            if let Err(e) = self.send_response(writer, &SmtpResponse::queued()).await {
                debug!("[{}] Could not acknowledge aborted DATA: {}", session.id, e);
            }
            self.store_message(session).await;
            return Ok(Flow::Close);
        }

        self.send_response(writer, &SmtpResponse::queued()).await?;
        self.store_message(session).await;

        Ok(Flow::Continue)
    }

    /// Hand an eligible message to the sink; failures are only logged
    async fn store_message(&self, session: &SmtpSession) {
        let Some(email) = session.assemble_message() else {
            warn!(
                "[{}] Message not stored (authenticated: {}, from set: {}, recipients: {})",
                session.id,
                session.is_authenticated(),
                !session.envelope().from.is_empty(),
                session.envelope().recipients.len()
            );
            return;
        };

        debug!(
            "[{}] Storing message from {} to {:?}, subject {:?}, body {} bytes, raw {} bytes",
            session.id,
            email.from_address,
            email.to_addresses,
            email.subject,
            email.body.len(),
            email.raw.len()
        );

        let project_id = email.project_id;
        match self.sink.persist(email).await {
            Ok(id) => info!("[{}] Stored email {} for project {}", session.id, id, project_id),
            Err(e) => warn!("[{}] Failed to store email for project {}: {}", session.id, project_id, e),
        }
    }

    /// Send a response
    async fn send_response<W: AsyncWrite + Unpin>(
        &self,
        writer: &mut BufWriter<W>,
        response: &str,
    ) -> Result<()> {
        writer.write_all(response.as_bytes()).await?;
        writer.flush().await?;
        debug!("SMTP to {}: {}", self.peer_addr, response.trim_end());
        Ok(())
    }
}

/// Read one `\n`-terminated line, decoding invalid UTF-8 lossily
///
/// `Ok(None)` means end of stream. A trailing fragment cut off by the end
/// of stream is not a line and is discarded.
async fn read_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> std::io::Result<Option<String>> {
    let mut buf = Vec::new();
    reader.read_until(b'\n', &mut buf).await?;
    if buf.last() != Some(&b'\n') {
        if !buf.is_empty() {
            trace!("Discarding {} bytes without line terminator", buf.len());
        }
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smtp::testing::{project, MemoryBackend};
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use pretty_assertions::assert_eq;
    use tokio::io::{DuplexStream, ReadHalf, WriteHalf};
    use tokio::task::JoinHandle;

    const GREETING: &str = "220 smtp.localhost SMTP Service Ready\n";

    struct TestClient {
        reader: BufReader<ReadHalf<DuplexStream>>,
        writer: WriteHalf<DuplexStream>,
    }

    impl TestClient {
        async fn send(&mut self, line: &str) {
            self.writer
                .write_all(format!("{}\r\n", line).as_bytes())
                .await
                .unwrap();
        }

        async fn recv(&mut self) -> String {
            let mut line = String::new();
            self.reader.read_line(&mut line).await.unwrap();
            line
        }

        async fn command(&mut self, line: &str) -> String {
            self.send(line).await;
            self.recv().await
        }

        async fn assert_closed(&mut self) {
            let mut rest = String::new();
            let n = self.reader.read_line(&mut rest).await.unwrap();
            assert_eq!(n, 0, "unexpected data after close: {:?}", rest);
        }

        async fn login(&mut self, user: &str, pass: &str) -> String {
            let payload = BASE64.encode(format!("\0{}\0{}", user, pass));
            self.command(&format!("AUTH PLAIN {}", payload)).await
        }
    }

    fn backend() -> Arc<MemoryBackend> {
        Arc::new(MemoryBackend::with_projects(vec![
            project(1, "alpha", "secret"),
            project(2, "beta", "hunter2"),
        ]))
    }

    async fn connect(backend: Arc<MemoryBackend>) -> (TestClient, JoinHandle<Result<()>>) {
        let (client, server) = tokio::io::duplex(64 * 1024);
        let handler = SmtpHandler::new(
            &SmtpConfig::default(),
            backend.clone(),
            backend,
            "127.0.0.1:40000".parse().unwrap(),
        );
        let task = tokio::spawn(handler.handle(server));

        let (reader, writer) = tokio::io::split(client);
        let mut client = TestClient {
            reader: BufReader::new(reader),
            writer,
        };
        assert_eq!(client.recv().await, GREETING);
        (client, task)
    }

    #[tokio::test]
    async fn test_greeting_is_first() {
        let (client, server) = tokio::io::duplex(1024);
        let backend = backend();
        let handler = SmtpHandler::new(
            &SmtpConfig::default(),
            backend.clone(),
            backend,
            "127.0.0.1:40000".parse().unwrap(),
        );
        let task = tokio::spawn(handler.handle(server));

        let mut reader = BufReader::new(client);
        let mut first = String::new();
        reader.read_line(&mut first).await.unwrap();
        assert_eq!(first, GREETING);

        drop(reader);
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_hello_capabilities() {
        let (mut client, task) = connect(backend()).await;
        client.send("EHLO client.example").await;
        assert_eq!(client.recv().await, "250-smtp.localhost\n");
        assert_eq!(client.recv().await, "250-AUTH LOGIN PLAIN\n");
        assert_eq!(client.recv().await, "250 OK\n");

        assert_eq!(client.command("QUIT").await, "221 2.0.0 Bye\n");
        client.assert_closed().await;
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_commands_require_auth() {
        let backend = backend();
        let (mut client, task) = connect(backend.clone()).await;

        assert_eq!(client.command("MAIL FROM:<a@x>").await, "530 5.7.0 Authentication required\n");
        assert_eq!(client.command("RCPT TO:<b@y>").await, "530 5.7.0 Authentication required\n");
        assert_eq!(client.command("DATA").await, "530 5.7.0 Authentication required\n");

        // Nothing was recorded before AUTH, so RCPT alone is not enough
        assert_eq!(client.login("alpha", "secret").await, "235 2.7.0 Authentication successful\n");
        assert_eq!(client.command("MAIL FROM:<c@x>").await, "250 2.1.0 Ok\n");
        assert_eq!(client.command("DATA").await, "354 End data with <CR><LF>.<CR><LF>\n");
        assert_eq!(client.command(".").await, "250 2.0.0 Ok: queued\n");

        client.command("QUIT").await;
        task.await.unwrap().unwrap();
        assert!(backend.stored().is_empty());
    }

    #[tokio::test]
    async fn test_auth_plain_inline() {
        let (mut client, task) = connect(backend()).await;
        assert_eq!(client.login("alpha", "secret").await, "235 2.7.0 Authentication successful\n");
        client.command("QUIT").await;
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_auth_plain_two_step() {
        let (mut client, task) = connect(backend()).await;
        assert_eq!(client.command("AUTH PLAIN").await, "334 \n");
        let payload = BASE64.encode(b"\0beta\0hunter2");
        assert_eq!(client.command(&payload).await, "235 2.7.0 Authentication successful\n");
        assert_eq!(client.command("MAIL FROM:<a@x>").await, "250 2.1.0 Ok\n");
        client.command("QUIT").await;
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_auth_login() {
        let (mut client, task) = connect(backend()).await;
        assert_eq!(client.command("AUTH LOGIN").await, "334 VXNlcm5hbWU6\n");
        assert_eq!(client.command(&BASE64.encode("alpha")).await, "334 UGFzc3dvcmQ6\n");
        assert_eq!(
            client.command(&BASE64.encode("secret")).await,
            "235 2.7.0 Authentication successful\n"
        );
        client.command("QUIT").await;
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_auth_failures_keep_session_open() {
        let (mut client, task) = connect(backend()).await;

        // Wrong password, unknown user, credentials of another project
        assert_eq!(client.login("alpha", "wrong").await, "535 5.7.8 Authentication failed\n");
        assert_eq!(client.login("nobody", "secret").await, "535 5.7.8 Authentication failed\n");
        assert_eq!(client.login("alpha", "hunter2").await, "535 5.7.8 Authentication failed\n");

        // Malformed payloads
        assert_eq!(client.command("AUTH PLAIN !!!").await, "535 5.7.8 Authentication failed\n");
        let two_fields = BASE64.encode(b"alpha\0secret");
        assert_eq!(
            client.command(&format!("AUTH PLAIN {}", two_fields)).await,
            "535 5.7.8 Authentication failed\n"
        );

        client.command("AUTH LOGIN").await;
        client.command("not-base64").await;
        assert_eq!(client.command(&BASE64.encode("secret")).await, "535 5.7.8 Authentication failed\n");

        assert_eq!(client.command("MAIL FROM:<a@x>").await, "530 5.7.0 Authentication required\n");

        // Retry succeeds
        assert_eq!(client.login("alpha", "secret").await, "235 2.7.0 Authentication successful\n");
        client.command("QUIT").await;
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_lookup_error_reported_as_auth_failure() {
        let (mut client, task) = connect(Arc::new(MemoryBackend::failing_lookups())).await;
        assert_eq!(client.login("alpha", "secret").await, "535 5.7.8 Authentication failed\n");
        client.command("QUIT").await;
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_full_transaction() {
        let backend = backend();
        let (mut client, task) = connect(backend.clone()).await;

        client.login("alpha", "secret").await;
        assert_eq!(client.command("MAIL FROM:<a@x>").await, "250 2.1.0 Ok\n");
        assert_eq!(client.command("RCPT TO:<b@y>").await, "250 2.1.5 Ok\n");
        assert_eq!(client.command("DATA").await, "354 End data with <CR><LF>.<CR><LF>\n");
        client.send("Subject: Hi").await;
        client.send("Hello").await;
        assert_eq!(client.command(".").await, "250 2.0.0 Ok: queued\n");
        assert_eq!(client.command("QUIT").await, "221 2.0.0 Bye\n");
        client.assert_closed().await;
        task.await.unwrap().unwrap();

        let stored = backend.stored();
        assert_eq!(stored.len(), 1);
        let email = &stored[0];
        assert_eq!(email.project_id, 1);
        assert_eq!(email.from_address, "a@x");
        assert_eq!(email.to_addresses, vec!["b@y"]);
        assert_eq!(email.subject, "Hi");
        assert_eq!(email.body, "Subject: Hi\r\nHello\r\n");
        assert_eq!(email.raw, "Subject: Hi\r\nHello\r\n.\r\n");
    }

    #[tokio::test]
    async fn test_data_without_recipients_not_stored() {
        let backend = backend();
        let (mut client, task) = connect(backend.clone()).await;

        client.login("alpha", "secret").await;
        client.command("MAIL FROM:<a@x>").await;
        client.command("DATA").await;
        client.send("Hello").await;
        assert_eq!(client.command(".").await, "250 2.0.0 Ok: queued\n");
        client.command("QUIT").await;
        task.await.unwrap().unwrap();

        assert!(backend.stored().is_empty());
    }

    #[tokio::test]
    async fn test_envelope_carries_over_between_transactions() {
        let backend = backend();
        let (mut client, task) = connect(backend.clone()).await;

        client.login("alpha", "secret").await;
        client.command("MAIL FROM:<a@x>").await;
        client.command("RCPT TO:<b@y>").await;
        client.command("DATA").await;
        client.send("Subject: First").await;
        client.command(".").await;

        // No new envelope: the previous one is reused
        client.command("DATA").await;
        client.send("no subject here").await;
        client.command(".").await;

        // A new RCPT appends to the old list
        client.command("RCPT TO:<c@z>").await;
        client.command("DATA").await;
        client.command(".").await;

        client.command("QUIT").await;
        task.await.unwrap().unwrap();

        let stored = backend.stored();
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[0].subject, "First");
        assert_eq!(stored[1].subject, "");
        assert_eq!(stored[1].to_addresses, vec!["b@y"]);
        assert_eq!(stored[2].to_addresses, vec!["b@y", "c@z"]);
        assert_eq!(stored[2].body, "");
        assert_eq!(stored[2].raw, ".\r\n");
    }

    #[tokio::test]
    async fn test_persist_failure_is_invisible() {
        let backend = Arc::new(
            MemoryBackend::with_projects(vec![project(1, "alpha", "secret")]).failing_persist(),
        );
        let (mut client, task) = connect(backend.clone()).await;

        client.login("alpha", "secret").await;
        client.command("MAIL FROM:<a@x>").await;
        client.command("RCPT TO:<b@y>").await;
        client.command("DATA").await;
        assert_eq!(client.command(".").await, "250 2.0.0 Ok: queued\n");
        assert_eq!(client.command("MAIL FROM:<d@x>").await, "250 2.1.0 Ok\n");
        assert_eq!(client.command("QUIT").await, "221 2.0.0 Bye\n");
        task.await.unwrap().unwrap();

        assert!(backend.stored().is_empty());
    }

    #[tokio::test]
    async fn test_eof_during_data_keeps_received_lines() {
        let backend = backend();
        let (mut client, task) = connect(backend.clone()).await;

        client.login("alpha", "secret").await;
        client.command("MAIL FROM:<a@x>").await;
        client.command("RCPT TO:<b@y>").await;
        client.command("DATA").await;
        client.send("Subject: Partial").await;
        client.send("body").await;
        client.writer.write_all(b"cut off").await.unwrap();
        client.writer.shutdown().await.unwrap();

        assert_eq!(client.recv().await, "250 2.0.0 Ok: queued\n");
        client.assert_closed().await;
        task.await.unwrap().unwrap();

        let stored = backend.stored();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].subject, "Partial");
        assert_eq!(stored[0].body, "Subject: Partial\r\nbody\r\n");
        assert_eq!(stored[0].raw, "Subject: Partial\r\nbody\r\n");
    }

    #[tokio::test]
    async fn test_eof_during_data_without_envelope_stores_nothing() {
        let backend = backend();
        let (mut client, task) = connect(backend.clone()).await;

        client.login("alpha", "secret").await;
        client.command("DATA").await;
        client.send("Hello").await;
        client.writer.shutdown().await.unwrap();

        assert_eq!(client.recv().await, "250 2.0.0 Ok: queued\n");
        client.assert_closed().await;
        task.await.unwrap().unwrap();

        assert!(backend.stored().is_empty());
    }

    #[tokio::test]
    async fn test_unterminated_command_is_ignored() {
        let (mut client, task) = connect(backend()).await;
        client.writer.write_all(b"QUIT").await.unwrap();
        client.writer.shutdown().await.unwrap();

        client.assert_closed().await;
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_eof_during_auth_closes_silently() {
        let (mut client, task) = connect(backend()).await;
        assert_eq!(client.command("AUTH LOGIN").await, "334 VXNlcm5hbWU6\n");
        client.writer.shutdown().await.unwrap();

        client.assert_closed().await;
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let backend = backend();
        let (mut client, task) = connect(backend.clone()).await;

        assert_eq!(client.command("FOO").await, "500 5.5.1 Unknown command\n");
        assert_eq!(client.command("RSET").await, "500 5.5.1 Unknown command\n");
        assert_eq!(client.command("").await, "500 5.5.1 Unknown command\n");

        client.login("alpha", "secret").await;
        client.command("MAIL FROM:<a@x>").await;
        client.command("RCPT TO:<b@y>").await;
        assert_eq!(client.command("NOOP").await, "500 5.5.1 Unknown command\n");
        client.command("DATA").await;
        client.command(".").await;
        client.command("QUIT").await;
        task.await.unwrap().unwrap();

        let stored = backend.stored();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].from_address, "a@x");
        assert_eq!(stored[0].to_addresses, vec!["b@y"]);
    }

    #[tokio::test]
    async fn test_quit_before_auth() {
        let (mut client, task) = connect(backend()).await;
        assert_eq!(client.command("quit").await, "500 5.5.1 Unknown command\n");
        assert_eq!(client.command("QUIT").await, "221 2.0.0 Bye\n");
        client.assert_closed().await;
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_client_disconnect_ends_session() {
        let (client, task) = connect(backend()).await;
        drop(client);
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_tolerated() {
        let (mut client, task) = connect(backend()).await;
        client.writer.write_all(b"\xff\xfe\r\n").await.unwrap();
        assert_eq!(client.recv().await, "500 5.5.1 Unknown command\n");
        client.command("QUIT").await;
        task.await.unwrap().unwrap();
    }
}
