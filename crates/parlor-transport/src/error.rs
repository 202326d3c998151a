/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Binding the listening socket failed.
    #[error("bind failed: {0}")]
    BindFailed(#[source] std::io::Error),

    /// Accepting a TCP connection failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// The WebSocket upgrade handshake was rejected or broke off.
    #[error("websocket handshake failed: {0}")]
    Handshake(String),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}
