//! Transport abstraction layer for Parlor.
//!
//! Provides the [`Transport`] and [`Connection`] traits that the game
//! server is written against, plus the [`ConnectionId`] every other layer
//! uses as the opaque identity of a socket.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{PendingWebSocket, WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

/// Opaque identifier for a connection.
///
/// Stable for the lifetime of one socket. A client that reconnects gets a
/// fresh id; nothing ties the two together.
///
/// Serialized as a plain number so it can sit in game state (seat holders,
/// player maps) and travel in patches.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
///
/// `accept` only takes the socket off the listener. The protocol
/// handshake happens in [`Pending::upgrade`], which must run outside the
/// accept loop.
pub trait Transport: Send + Sync + 'static {
    /// A socket that has been accepted but not yet upgraded.
    type Pending: Pending<Error = Self::Error>;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming socket.
    async fn accept(&mut self) -> Result<Self::Pending, Self::Error>;

    /// Gracefully shuts down the transport, stopping new connections.
    async fn shutdown(&self) -> Result<(), Self::Error>;
}

/// An accepted socket waiting for its handshake.
pub trait Pending: Send + 'static {
    /// The connection produced once the handshake succeeds.
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    /// Remote address of the peer.
    fn peer_addr(&self) -> SocketAddr;

    /// Runs the handshake and returns the ready connection.
    async fn upgrade(self) -> Result<Self::Connection, Self::Error>;
}

/// A single connection that can send and receive bytes.
///
/// `send` and `recv` may be called concurrently from different tasks:
/// a writer task drains the outbound queue while the reader loop waits
/// for the next client frame.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends data to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next message from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
