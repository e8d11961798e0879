//! TCP server for the message service.
//!
//! Each accepted connection gets its own task and may send any number of
//! newline-delimited requests.  Requests are handled on the blocking pool
//! because password verification is CPU-bound.  A background task sweeps
//! the store for expired and consumed records.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::Settings;
use crate::errors::{LockitError, Result};
use crate::service::{MessageService, Request, Response};
use crate::transport::{frame_limit, read_frame, write_message};
use crate::vault::VaultStore;

/// Runtime options for `Server`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub max_connections: usize,
    pub sweep_interval: Option<Duration>,
}

impl ServerConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            bind_address: settings.bind_address.clone(),
            max_connections: settings.max_connections,
            sweep_interval: settings.sweep_interval(),
        }
    }
}

/// A bound, not yet running, server.
pub struct Server {
    listener: TcpListener,
    service: MessageService,
    config: ServerConfig,
}

impl Server {
    /// Bind the listening socket.
    pub async fn bind(config: ServerConfig, service: MessageService) -> Result<Self> {
        let listener = TcpListener::bind(&config.bind_address).await.map_err(|e| {
            LockitError::Server(format!("failed to bind {}: {e}", config.bind_address))
        })?;
        Ok(Self {
            listener,
            service,
            config,
        })
    }

    /// Address the server is listening on.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Serve until `shutdown` completes.
    ///
    /// Connections already accepted keep running on their own tasks.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let sweeper = self
            .config
            .sweep_interval
            .map(|period| spawn_sweeper(Arc::clone(self.service.store()), period));

        let connections = Arc::new(Semaphore::new(self.config.max_connections));
        let max_frame = frame_limit(self.service.limits().max_payload_bytes);

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!("shutdown requested");
                    break;
                }
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            tracing::warn!(error = %e, "accept failed");
                            continue;
                        }
                    };

                    let Ok(permit) = Arc::clone(&connections).try_acquire_owned() else {
                        tracing::warn!(%peer, "connection limit reached, dropping connection");
                        continue;
                    };

                    let service = self.service.clone();
                    tokio::spawn(async move {
                        tracing::debug!(%peer, "connection opened");
                        match handle_connection(stream, service, max_frame).await {
                            Ok(()) => tracing::debug!(%peer, "connection closed"),
                            Err(e) => {
                                tracing::debug!(%peer, error = %e, "connection ended with error")
                            }
                        }
                        drop(permit);
                    });
                }
            }
        }

        if let Some(sweeper) = sweeper {
            sweeper.abort();
        }
        Ok(())
    }
}

/// Serve one connection until the peer hangs up.
async fn handle_connection(
    stream: TcpStream,
    service: MessageService,
    max_frame: usize,
) -> Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    loop {
        let frame = match read_frame(&mut reader, max_frame).await {
            Ok(Some(frame)) => frame,
            Ok(None) => return Ok(()),
            Err(e @ LockitError::Validation(_)) => {
                // The rest of the oversized frame is still in the socket;
                // answer once and hang up.
                write_message(&mut write_half, &Response::error(&e)).await?;
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        if frame.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let response = match serde_json::from_slice::<Request>(&frame) {
            Ok(request) => dispatch(&service, request).await,
            Err(e) => {
                tracing::warn!(error = %e, "malformed request");
                Response::error(&LockitError::Validation(format!("malformed request: {e}")))
            }
        };

        write_message(&mut write_half, &response).await?;
    }
}

/// Run a request on the blocking pool.
async fn dispatch(service: &MessageService, request: Request) -> Response {
    let service = service.clone();
    match tokio::task::spawn_blocking(move || service.handle(request)).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "request handler panicked");
            Response::error(&LockitError::Server(e.to_string()))
        }
    }
}

/// Periodically reclaim expired and consumed records.
fn spawn_sweeper(store: Arc<VaultStore>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let reclaimed = store.sweep();
            if reclaimed > 0 {
                tracing::info!(reclaimed, remaining = store.len(), "swept dead messages");
            }
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
