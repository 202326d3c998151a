//! Wire protocol for Parlor.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Frames** ([`ClientFrame`], [`ServerFrame`]): the JSON messages
//!   that travel on a socket. A client frame names a namespace (one per
//!   installed game), an event, an optional room, positional arguments,
//!   and an optional ack id for request/response calls.
//! - **Commands** ([`ClientFrame::command_value`]): how a frame's event
//!   and arguments are folded into a value a game's command enum can be
//!   deserialized from.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how frames are turned
//!   into bytes and back.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (bytes) → Protocol (frames) → Room (commands, patches)
//! ```

mod codec;
mod error;
mod frame;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use frame::{ClientFrame, ServerFrame, events};
