//! `ParlorServer` builder and server loop.
//!
//! This is the entry point for running a Parlor game server. It ties the
//! layers together: transport → protocol → dispatcher → namespaces.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parlor_room::Game;
use parlor_transport::{Connection, Pending, Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{Catalogue, Dispatcher, GameDescriptor, ParlorError, ServerConfig};

/// How long an accepted socket may take to complete the WebSocket upgrade.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Builder for configuring and starting a Parlor server.
///
/// # Example
///
/// ```rust,ignore
/// use parlor::prelude::*;
///
/// let server = ParlorServer::builder()
///     .bind("0.0.0.0:3000")
///     .catalogue(Catalogue::standard())
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct ParlorServerBuilder {
    config: ServerConfig,
    catalogue: Catalogue,
}

impl ParlorServerBuilder {
    /// Creates a builder with the default config and no games.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            catalogue: Catalogue::new(),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets the inbox size of each namespace actor.
    pub fn command_buffer(mut self, size: usize) -> Self {
        self.config.command_buffer = size;
        self
    }

    /// Installs game `G` under `route_key`.
    pub fn game<G: Game>(mut self, display_name: &str, route_key: &str) -> Self {
        self.catalogue.register(GameDescriptor::of::<G>(display_name, route_key));
        self
    }

    /// Installs every game of `catalogue`.
    pub fn catalogue(mut self, catalogue: Catalogue) -> Self {
        for descriptor in catalogue.descriptors() {
            self.catalogue.register(descriptor.clone());
        }
        self
    }

    /// Binds the listener and starts one namespace actor per game.
    pub async fn build(self) -> Result<ParlorServer, ParlorError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;
        let dispatcher = Arc::new(Dispatcher::install(&self.catalogue, self.config.command_buffer));

        Ok(ParlorServer {
            transport,
            dispatcher,
            catalogue: self.catalogue,
            connected: Arc::new(AtomicUsize::new(0)),
        })
    }
}

impl Default for ParlorServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Parlor game server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ParlorServer {
    transport: WebSocketTransport,
    dispatcher: Arc<Dispatcher>,
    catalogue: Catalogue,
    connected: Arc<AtomicUsize>,
}

impl ParlorServer {
    pub fn builder() -> ParlorServerBuilder {
        ParlorServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    /// Runs the accept loop. Each accepted socket is upgraded and handled
    /// in its own task. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), ParlorError> {
        tracing::info!(
            addr = ?self.transport.local_addr().ok(),
            games = self.catalogue.len(),
            "Parlor server running"
        );

        loop {
            match self.transport.accept().await {
                Ok(pending) => {
                    let dispatcher = Arc::clone(&self.dispatcher);
                    let connected = Arc::clone(&self.connected);
                    tokio::spawn(async move {
                        let addr = pending.peer_addr();
                        let conn = match tokio::time::timeout(HANDSHAKE_TIMEOUT, pending.upgrade()).await {
                            Ok(Ok(conn)) => conn,
                            Ok(Err(e)) => {
                                tracing::debug!(%addr, error = %e, "handshake failed");
                                return;
                            }
                            Err(_) => {
                                tracing::debug!(%addr, "handshake timed out");
                                return;
                            }
                        };

                        let conn_id = conn.id();
                        let n = connected.fetch_add(1, Ordering::Relaxed) + 1;
                        tracing::info!(%conn_id, connected = n, "connected");

                        handle_connection(conn, dispatcher).await;

                        let n = connected.fetch_sub(1, Ordering::Relaxed) - 1;
                        tracing::info!(%conn_id, connected = n, "disconnected");
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
