//! Codec trait and implementations for serializing/deserializing frames.
//!
//! A codec converts between Rust types and raw bytes. The server loop
//! doesn't care how frames are serialized, it just needs something that
//! implements [`Codec`]. [`JsonCodec`] is the only implementation: the
//! browser client speaks JSON.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because the codec is shared by every
/// connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use parlor_protocol::{ClientFrame, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let frame: ClientFrame =
///     codec.decode(br#"{"nsp":"chess","event":"join","room":"r1"}"#).unwrap();
/// assert_eq!(frame.nsp, "chess");
///
/// let bytes = codec.encode(&frame).unwrap();
/// let again: ClientFrame = codec.decode(&bytes).unwrap();
/// assert_eq!(frame, again);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
