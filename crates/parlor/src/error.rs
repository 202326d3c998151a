//! Unified error type for the Parlor server.

use parlor_protocol::ProtocolError;
use parlor_room::RoomError;
use parlor_transport::TransportError;

use crate::ConfigError;

/// Top-level error that wraps every crate-specific error.
///
/// The `#[from]` attribute on each variant generates the `From` impls so
/// `?` converts sub-crate errors on the way up.
#[derive(Debug, thiserror::Error)]
pub enum ParlorError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame couldn't be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room or namespace operation failed.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The environment held an unusable setting.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::SendFailed("gone".into());
        let parlor_err: ParlorError = err.into();
        assert!(matches!(parlor_err, ParlorError::Transport(_)));
        assert!(parlor_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidArguments {
            event: "move".into(),
            reason: "bad".into(),
        };
        let parlor_err: ParlorError = err.into();
        assert!(matches!(parlor_err, ParlorError::Protocol(_)));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::NotFound("lobby".into());
        let parlor_err: ParlorError = err.into();
        assert!(matches!(parlor_err, ParlorError::Room(_)));
        assert!(parlor_err.to_string().contains("lobby"));
    }

    #[test]
    fn test_from_config_error() {
        let err = ConfigError::Invalid {
            key: "PORT",
            value: "x".into(),
        };
        let parlor_err: ParlorError = err.into();
        assert!(matches!(parlor_err, ParlorError::Config(_)));
    }
}
