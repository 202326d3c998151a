//! Frames: the JSON messages that travel on a socket.

use parlor_patch::Patch;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::ProtocolError;

/// Event names shared by every namespace.
pub mod events {
    /// Client → server: attach to (or create) a room.
    pub const JOIN: &str = "join";
    /// Client → server: detach from a room.
    pub const LEAVE: &str = "leave";
    /// Client → server (with ack): full snapshot of the room's state.
    pub const GET_INITIAL_STATE: &str = "get_initial_state";
    /// Client → server (with ack, root namespace): catalogue lookups.
    pub const REQUEST_DATA: &str = "request_data";
    /// Server → client: one patch to replay against the local replica.
    pub const APPLY_PATCHES: &str = "apply_patches";
}

/// A frame sent by a client.
///
/// ```json
/// { "nsp": "chess", "event": "move", "room": "lobby", "args": [52, 36] }
/// ```
///
/// - `nsp` picks the game namespace; the empty string is the root
///   namespace (catalogue requests).
/// - `room` is required by every room-scoped event.
/// - `args` are the event's positional arguments.
/// - `ack`, when present, asks the server to answer this frame once with
///   a [`ServerFrame::Ack`] carrying the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientFrame {
    #[serde(default)]
    pub nsp: String,
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ack: Option<u64>,
}

impl ClientFrame {
    /// Creates a frame with no room, arguments, or ack.
    pub fn new(nsp: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            nsp: nsp.into(),
            event: event.into(),
            room: None,
            args: Vec::new(),
            ack: None,
        }
    }

    pub fn in_room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }

    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    pub fn with_ack(mut self, id: u64) -> Self {
        self.ack = Some(id);
        self
    }

    /// Folds the event name and arguments into an adjacently tagged value
    /// (`{"event": .., "args": ..}`).
    ///
    /// Zero arguments leave `args` out (unit variants), one argument is
    /// passed bare (newtype variants), more are passed as an array (tuple
    /// variants). A game command enum declared with
    /// `#[serde(tag = "event", content = "args", rename_all = "snake_case")]`
    /// deserializes straight from the result.
    pub fn command_value(&self) -> Value {
        match self.args.as_slice() {
            [] => json!({ "event": self.event }),
            [single] => json!({ "event": self.event, "args": single }),
            many => json!({ "event": self.event, "args": many }),
        }
    }

    /// Decodes this frame as a game command.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidArguments`] if the event is unknown
    /// to `C` or the arguments have the wrong shape.
    pub fn decode_command<C: DeserializeOwned>(&self) -> Result<C, ProtocolError> {
        serde_json::from_value(self.command_value()).map_err(|e| {
            ProtocolError::InvalidArguments {
                event: self.event.clone(),
                reason: e.to_string(),
            }
        })
    }
}

/// A frame sent by the server.
///
/// Internally tagged by `type`:
///
/// ```json
/// { "type": "event", "nsp": "chess", "event": "apply_patches", "data": [..] }
/// { "type": "ack", "id": 4, "data": { "board": [..] } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// A named event pushed to the client.
    Event {
        nsp: String,
        event: String,
        data: Value,
    },
    /// The one-time answer to a client frame that carried an ack id.
    Ack { id: u64, data: Value },
}

impl ServerFrame {
    pub fn event(nsp: impl Into<String>, event: impl Into<String>, data: Value) -> Self {
        Self::Event {
            nsp: nsp.into(),
            event: event.into(),
            data,
        }
    }

    pub fn ack(id: u64, data: Value) -> Self {
        Self::Ack { id, data }
    }

    /// An `apply_patches` broadcast for one state revision.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if the patch can't be turned into
    /// JSON (it always can, patch values are already JSON).
    pub fn apply_patches(nsp: impl Into<String>, patch: &Patch) -> Result<Self, ProtocolError> {
        let data = serde_json::to_value(patch).map_err(ProtocolError::Encode)?;
        Ok(Self::event(nsp, events::APPLY_PATCHES, data))
    }
}

#[cfg(test)]
mod tests {
    use parlor_patch::PatchOp;

    use super::*;

    #[derive(Debug, PartialEq, Deserialize)]
    #[serde(tag = "event", content = "args", rename_all = "snake_case")]
    enum Sample {
        ChooseSide(u8),
        Move(usize, usize),
        DonePlacing,
    }

    fn frame(event: &str, args: Vec<Value>) -> ClientFrame {
        ClientFrame::new("escampe", event).in_room("r").with_args(args)
    }

    #[test]
    fn test_client_frame_defaults_when_fields_missing() {
        let frame: ClientFrame =
            serde_json::from_str(r#"{"event":"request_data","args":["AVAILABLE_GAMES"],"ack":1}"#)
                .unwrap();
        assert_eq!(frame.nsp, "");
        assert!(frame.room.is_none());
        assert_eq!(frame.ack, Some(1));
    }

    #[test]
    fn test_single_argument_decodes_newtype_variant() {
        let cmd: Sample = frame("choose_side", vec![json!(1)]).decode_command().unwrap();
        assert_eq!(cmd, Sample::ChooseSide(1));
    }

    #[test]
    fn test_many_arguments_decode_tuple_variant() {
        let cmd: Sample = frame("move", vec![json!(3), json!(9)]).decode_command().unwrap();
        assert_eq!(cmd, Sample::Move(3, 9));
    }

    #[test]
    fn test_no_arguments_decode_unit_variant() {
        let cmd: Sample = frame("done_placing", vec![]).decode_command().unwrap();
        assert_eq!(cmd, Sample::DonePlacing);
    }

    #[test]
    fn test_wrong_argument_type_is_invalid_arguments() {
        let err = frame("choose_side", vec![json!("zero")])
            .decode_command::<Sample>()
            .unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidArguments { ref event, .. } if event == "choose_side"));
    }

    #[test]
    fn test_unknown_event_is_invalid_arguments() {
        assert!(frame("fly", vec![]).decode_command::<Sample>().is_err());
    }

    #[test]
    fn test_server_event_json_format() {
        let json = serde_json::to_value(ServerFrame::event("solitaire", "spectators", json!(2))).unwrap();
        assert_eq!(
            json,
            json!({ "type": "event", "nsp": "solitaire", "event": "spectators", "data": 2 })
        );
    }

    #[test]
    fn test_server_ack_json_format() {
        let json = serde_json::to_value(ServerFrame::ack(9, json!({ "turn": 0 }))).unwrap();
        assert_eq!(json, json!({ "type": "ack", "id": 9, "data": { "turn": 0 } }));
    }

    #[test]
    fn test_apply_patches_frame_carries_ops() {
        let patch = Patch::from(vec![PatchOp::replace(vec!["turn".into()], json!(1))]);
        let frame = ServerFrame::apply_patches("chess", &patch).unwrap();
        match frame {
            ServerFrame::Event { event, data, .. } => {
                assert_eq!(event, events::APPLY_PATCHES);
                assert_eq!(data[0]["op"], "replace");
            }
            other => panic!("expected event frame, got {other:?}"),
        }
    }
}
