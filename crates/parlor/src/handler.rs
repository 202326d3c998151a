//! Per-connection handler: frame decoding and routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Spawn a writer task draining the connection's outbound frames
//!   2. Loop: receive bytes → decode a client frame → hand it to the dispatcher
//!   3. On close, detach the connection from every namespace it reached

use std::sync::Arc;

use parlor_protocol::{ClientFrame, Codec, JsonCodec, ServerFrame};
use parlor_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::dispatcher::{Dispatcher, Link};

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(conn: WebSocketConnection, dispatcher: Arc<Dispatcher>) {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    let codec = JsonCodec;

    let (tx, rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_frames(Arc::clone(&conn), rx, codec));
    let mut link = Link::new(conn_id, tx);

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let frame: ClientFrame = match codec.decode(&data) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode frame");
                continue;
            }
        };

        dispatcher.deliver(&mut link, frame).await;
    }

    dispatcher.disconnect(&mut link).await;
    writer.abort();
}

/// Drains outbound frames onto the socket until the channel closes or a
/// send fails.
async fn write_frames(
    conn: Arc<WebSocketConnection>,
    mut rx: mpsc::UnboundedReceiver<ServerFrame>,
    codec: JsonCodec,
) {
    let conn_id = conn.id();
    while let Some(frame) = rx.recv().await {
        let bytes = match codec.encode(&frame) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "failed to encode frame");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%conn_id, error = %e, "send failed");
            break;
        }
    }
}
