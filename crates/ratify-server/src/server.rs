//! HTTP server.
//!
//! Binds the port derived from the configured base URL and feeds every
//! request on every connection through a shared [`Dispatcher`]. Requests
//! are independent; each connection runs on its own Tokio task.
//!
//! # Example
//!
//! ```rust,no_run
//! use ratify_core::Field;
//! use ratify_router::SegmentChain;
//! use ratify_server::{serve, AppError, Reply, Request, ResponseSpec, Route, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ratify_server::ServerError> {
//!     let hello = Route::get(SegmentChain::root().literal("/hello"))
//!         .response(ResponseSpec::data(Field::string()))
//!         .handler(|_: Request| async { Ok::<_, AppError>(Reply::new("hello")) });
//!
//!     serve(ServerConfig::default(), [hello]).await
//! }
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use http::Request;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};

use crate::config::ServerConfig;
use crate::dispatcher::Dispatcher;
use crate::route::Route;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Errors that stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The base URL does not name a port.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// The configured URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// The address that was tried.
        addr: SocketAddr,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Other I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Creates an invalid base URL error.
    #[must_use]
    pub fn invalid_base_url(url: &str, reason: impl Into<String>) -> Self {
        Self::InvalidBaseUrl {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

/// An HTTP/1 server over a [`Dispatcher`].
#[derive(Debug, Clone)]
pub struct Server {
    dispatcher: Dispatcher,
}

impl Server {
    /// Creates a server for `routes`.
    pub fn new(config: ServerConfig, routes: impl IntoIterator<Item = Route>) -> Self {
        Self::from_dispatcher(Dispatcher::new(config, routes))
    }

    /// Creates a server around an existing dispatcher.
    #[must_use]
    pub fn from_dispatcher(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Returns the dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Serves until SIGTERM or SIGINT.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the port cannot be
    /// bound.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(ShutdownSignal::with_os_signals()).await
    }

    /// Serves until `shutdown` is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the port cannot be
    /// bound.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self.dispatcher.config().socket_addr()?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        self.run_on(listener, shutdown).await
    }

    /// Serves connections from an already bound listener until `shutdown`
    /// is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener's address cannot be read.
    pub async fn run_on(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let local = listener.local_addr()?;
        tracing::info!(
            addr = %local,
            base_url = self.dispatcher.config().base_url(),
            routes = self.dispatcher.routes().len(),
            "listening"
        );

        let dispatcher = Arc::new(self.dispatcher);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote)) => {
                        let dispatcher = Arc::clone(&dispatcher);
                        let token = tracker.open();
                        let shutdown = shutdown.clone();
                        tokio::spawn(async move {
                            if let Err(e) = serve_connection(dispatcher, stream, shutdown).await {
                                tracing::debug!(remote = %remote, error = %e, "connection error");
                            }
                            drop(token);
                        });
                    }
                    Err(e) => tracing::warn!(error = %e, "failed to accept connection"),
                },
                () = shutdown.recv() => {
                    tracing::info!("shutdown requested, no longer accepting connections");
                    break;
                }
            }
        }

        let timeout = dispatcher.config().shutdown_timeout();
        if tokio::time::timeout(timeout, tracker.drained()).await.is_err() {
            tracing::warn!(
                open = tracker.open_connections(),
                "shutdown timeout reached with connections still open"
            );
        }
        tracing::info!("server stopped");
        Ok(())
    }
}

/// Serves `routes` until SIGTERM or SIGINT.
///
/// # Errors
///
/// See [`Server::run`].
pub async fn serve(config: ServerConfig, routes: impl IntoIterator<Item = Route>) -> Result<(), ServerError> {
    Server::new(config, routes).run().await
}

/// Serves `routes` until `shutdown` is triggered.
///
/// # Errors
///
/// See [`Server::run_with_shutdown`].
pub async fn serve_with_shutdown(
    config: ServerConfig,
    routes: impl IntoIterator<Item = Route>,
    shutdown: ShutdownSignal,
) -> Result<(), ServerError> {
    Server::new(config, routes).run_with_shutdown(shutdown).await
}

async fn serve_connection(
    dispatcher: Arc<Dispatcher>,
    stream: TcpStream,
    shutdown: ShutdownSignal,
) -> Result<(), hyper::Error> {
    let service = service_fn(move |request: Request<Incoming>| {
        let dispatcher = Arc::clone(&dispatcher);
        async move { Ok::<_, Infallible>(dispatcher.dispatch(request).await.into_response()) }
    });

    let connection = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
    tokio::pin!(connection);

    tokio::select! {
        result = connection.as_mut() => result,
        () = shutdown.recv() => {
            connection.as_mut().graceful_shutdown();
            connection.await
        }
    }
}
