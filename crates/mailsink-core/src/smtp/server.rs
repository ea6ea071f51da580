//! SMTP server implementation

use super::backend::{MessageSink, ProjectResolver};
use super::handler::SmtpHandler;
use anyhow::Result;
use mailsink_common::config::SmtpConfig;
use mailsink_storage::db::DatabasePool;
use mailsink_storage::repository::{EmailRepository, ProjectRepository};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// SMTP Server
///
/// One task per accepted connection, no connection limit. The collaborators
/// are shared by every session.
pub struct SmtpServer {
    config: SmtpConfig,
    resolver: Arc<dyn ProjectResolver>,
    sink: Arc<dyn MessageSink>,
}

impl SmtpServer {
    /// Create a new SMTP server
    pub fn new(
        config: SmtpConfig,
        resolver: Arc<dyn ProjectResolver>,
        sink: Arc<dyn MessageSink>,
    ) -> Self {
        Self {
            config,
            resolver,
            sink,
        }
    }

    /// Create a server backed by the project and email tables
    pub fn with_database(config: SmtpConfig, db_pool: DatabasePool) -> Self {
        Self::new(
            config,
            Arc::new(ProjectRepository::new(db_pool.clone())),
            Arc::new(EmailRepository::new(db_pool)),
        )
    }

    /// Bind the configured address and serve forever
    pub async fn run(&self) -> Result<()> {
        let addr = self.config.bind_address();
        let listener = TcpListener::bind(&addr).await?;
        info!("SMTP server listening on {}", addr);
        self.serve(listener).await
    }

    /// Accept connections on an already bound listener
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        loop {
            match listener.accept().await {
                Ok((stream, peer_addr)) => {
                    let handler = SmtpHandler::new(
                        &self.config,
                        self.resolver.clone(),
                        self.sink.clone(),
                        peer_addr,
                    );

                    tokio::spawn(async move {
                        if let Err(e) = handler.handle(stream).await {
                            error!("SMTP session error from {}: {}", peer_addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept SMTP connection: {}", e);
                }
            }
        }
    }
}
