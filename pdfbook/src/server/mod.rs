//! HTTP upload service.
//!
//! A small axum application that appends a blank page to uploaded PDFs.
//! Each request is processed on its own blocking task; the only shared
//! state is the immutable [`ServerConfig`].
//!
//! # Examples
//!
//! ```no_run
//! use pdfbook::config::ServerConfig;
//! use pdfbook::server::HttpServer;
//!
//! # async fn example() -> pdfbook::Result<()> {
//! HttpServer::with_config(ServerConfig::default()).start().await?;
//! # Ok(())
//! # }
//! ```

pub mod routes;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{PdfBookError, Result};

/// HTTP server for the upload endpoint.
pub struct HttpServer {
    config: ServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    /// Create a server with a custom configuration.
    pub fn with_config(config: ServerConfig) -> Self {
        let router = routes::router(&config);
        Self { config, router }
    }

    /// Address the server binds to.
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing).
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until the process is stopped.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the address
    /// cannot be bound.
    pub async fn start(self) -> Result<()> {
        self.config
            .validate()
            .map_err(|e| PdfBookError::invalid_config(e.to_string()))?;

        let listener = TcpListener::bind(self.config.socket_addr()).await?;
        let addr = listener.local_addr()?;

        log::info!("Listening on http://{addr}");
        log::info!(
            "Upload limit: {} bytes, endpoint: POST /process-pdf",
            self.config.max_upload_bytes
        );

        axum::serve(listener, self.router).await?;
        Ok(())
    }
}

impl Default for HttpServer {
    fn default() -> Self {
        Self::new()
    }
}
