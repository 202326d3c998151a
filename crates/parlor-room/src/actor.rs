//! Namespace actor: an isolated Tokio task that owns every room of one game.
//!
//! The dispatcher talks to it through a [`NamespaceHandle`]; frames for
//! the game are processed one at a time in the order they arrive, which
//! is what makes each room's revision sequence well defined.

use std::collections::HashMap;

use parlor_patch::Patch;
use parlor_protocol::{ClientFrame, ServerFrame, events};
use parlor_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};
use tracing::Instrument;

use crate::{CommandError, Game, JoinOutcome, RoomError, RoomRegistry};

/// Channel sender for delivering server frames to one connection.
pub type FrameSender = mpsc::UnboundedSender<ServerFrame>;

/// Commands sent to a namespace actor through its channel.
enum NamespaceCommand {
    /// A connection entered this namespace.
    Attach {
        conn: ConnectionId,
        sender: FrameSender,
    },

    /// A connection went away; remove it from every room.
    Detach { conn: ConnectionId },

    /// A client frame addressed to this namespace.
    Frame {
        conn: ConnectionId,
        frame: ClientFrame,
    },

    /// Request namespace metadata.
    Info {
        reply: oneshot::Sender<NamespaceInfo>,
    },

    Shutdown,
}

/// A snapshot of namespace metadata (not any room state).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceInfo {
    pub route_key: String,
    /// Connections currently attached.
    pub connections: usize,
    /// Rooms currently alive.
    pub rooms: usize,
}

/// Handle to a running namespace actor.
///
/// Cheap to clone. The dispatcher holds one per installed game.
#[derive(Debug, Clone)]
pub struct NamespaceHandle {
    route_key: String,
    sender: mpsc::Sender<NamespaceCommand>,
}

impl NamespaceHandle {
    pub fn route_key(&self) -> &str {
        &self.route_key
    }

    /// Registers `conn` with the namespace. Server frames for it go to
    /// `sender`.
    pub async fn attach(&self, conn: ConnectionId, sender: FrameSender) -> Result<(), RoomError> {
        self.send(NamespaceCommand::Attach { conn, sender }).await
    }

    /// Removes `conn` from the namespace and from every room it occupies.
    pub async fn detach(&self, conn: ConnectionId) -> Result<(), RoomError> {
        self.send(NamespaceCommand::Detach { conn }).await
    }

    /// Delivers a client frame (fire-and-forget).
    pub async fn deliver(&self, conn: ConnectionId, frame: ClientFrame) -> Result<(), RoomError> {
        self.send(NamespaceCommand::Frame { conn, frame }).await
    }

    pub async fn info(&self) -> Result<NamespaceInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(NamespaceCommand::Info { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(NamespaceCommand::Shutdown).await
    }

    async fn send(&self, cmd: NamespaceCommand) -> Result<(), RoomError> {
        self.sender.send(cmd).await.map_err(|_| self.unavailable())
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.route_key.clone())
    }
}

/// Spawns the actor for game `G` under `route_key` and returns its handle.
///
/// `channel_size` bounds the actor's inbox; senders wait when it's full.
pub fn spawn_namespace<G: Game>(route_key: impl Into<String>, channel_size: usize) -> NamespaceHandle {
    let route_key = route_key.into();
    let (tx, rx) = mpsc::channel(channel_size.max(1));
    let actor = NamespaceActor::<G> {
        route_key: route_key.clone(),
        registry: RoomRegistry::new(),
        senders: HashMap::new(),
        receiver: rx,
    };
    let span = tracing::info_span!("namespace", game = %route_key);
    tokio::spawn(actor.run().instrument(span));

    NamespaceHandle {
        route_key,
        sender: tx,
    }
}

struct NamespaceActor<G: Game> {
    route_key: String,
    registry: RoomRegistry<G>,
    /// Per-connection outbound channels.
    senders: HashMap<ConnectionId, FrameSender>,
    receiver: mpsc::Receiver<NamespaceCommand>,
}

impl<G: Game> NamespaceActor<G> {
    async fn run(mut self) {
        tracing::info!("namespace actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                NamespaceCommand::Attach { conn, sender } => {
                    self.senders.insert(conn, sender);
                    tracing::info!(%conn, connections = self.senders.len(), "attached");
                }
                NamespaceCommand::Detach { conn } => self.handle_detach(conn),
                NamespaceCommand::Frame { conn, frame } => self.handle_frame(conn, frame),
                NamespaceCommand::Info { reply } => {
                    let _ = reply.send(self.info());
                }
                NamespaceCommand::Shutdown => {
                    tracing::info!("namespace shutting down");
                    break;
                }
            }
        }

        tracing::info!("namespace actor stopped");
    }

    fn info(&self) -> NamespaceInfo {
        NamespaceInfo {
            route_key: self.route_key.clone(),
            connections: self.senders.len(),
            rooms: self.registry.room_count(),
        }
    }

    fn handle_detach(&mut self, conn: ConnectionId) {
        self.senders.remove(&conn);
        for (room, departure) in self.registry.disconnect(conn) {
            self.broadcast_patch(&room, &departure.remaining, &departure.patch);
        }
        tracing::info!(%conn, connections = self.senders.len(), "detached");
    }

    fn handle_frame(&mut self, conn: ConnectionId, frame: ClientFrame) {
        let Some(room) = frame.room.clone() else {
            tracing::debug!(%conn, event = %frame.event, "frame without a room dropped");
            return;
        };

        let result = match frame.event.as_str() {
            events::JOIN => self.handle_join(conn, &room),
            events::LEAVE => self.handle_leave(conn, &room),
            events::GET_INITIAL_STATE => {
                self.handle_initial_state(conn, &room, frame.ack);
                Ok(())
            }
            _ => self.handle_command(conn, &room, &frame),
        };

        if let Err(e) = result {
            tracing::debug!(room = %room, %conn, event = %frame.event, error = %e, "frame rejected");
        }
    }

    fn handle_join(&mut self, conn: ConnectionId, room: &str) -> Result<(), RoomError> {
        if let JoinOutcome::Joined {
            notice: Some(notice),
        } = self.registry.join(conn, room)?
        {
            let frame = ServerFrame::event(&self.route_key, notice.event, notice.data);
            let others: Vec<ConnectionId> = self
                .registry
                .occupants(room)
                .unwrap_or_default()
                .iter()
                .copied()
                .filter(|c| *c != conn)
                .collect();
            self.broadcast(&others, &frame);
        }
        Ok(())
    }

    fn handle_leave(&mut self, conn: ConnectionId, room: &str) -> Result<(), RoomError> {
        let departure = self.registry.leave(conn, room)?;
        self.broadcast_patch(room, &departure.remaining, &departure.patch);
        Ok(())
    }

    fn handle_initial_state(&self, conn: ConnectionId, room: &str, ack: Option<u64>) {
        let (Some(id), Some(state)) = (ack, self.registry.state(conn, room)) else {
            return;
        };
        match serde_json::to_value(state) {
            Ok(data) => self.send_to(conn, ServerFrame::ack(id, data)),
            Err(e) => tracing::warn!(room, %conn, error = %e, "failed to serialize state"),
        }
    }

    fn handle_command(
        &mut self,
        conn: ConnectionId,
        room: &str,
        frame: &ClientFrame,
    ) -> Result<(), RoomError> {
        let command = frame
            .decode_command::<G::Command>()
            .map_err(|e| CommandError::malformed(e.to_string()))?;
        tracing::trace!(room, %conn, ?command, "command");

        let patch = self.registry.command(conn, room, command)?;
        let occupants = self.registry.occupants(room).unwrap_or_default().to_vec();
        self.broadcast_patch(room, &occupants, &patch);
        Ok(())
    }

    fn broadcast_patch(&self, room: &str, to: &[ConnectionId], patch: &Patch) {
        if patch.is_empty() || to.is_empty() {
            return;
        }
        match ServerFrame::apply_patches(&self.route_key, patch) {
            Ok(frame) => self.broadcast(to, &frame),
            Err(e) => tracing::warn!(room, error = %e, "failed to encode patch"),
        }
    }

    fn broadcast(&self, to: &[ConnectionId], frame: &ServerFrame) {
        for conn in to {
            self.send_to(*conn, frame.clone());
        }
    }

    fn send_to(&self, conn: ConnectionId, frame: ServerFrame) {
        if let Some(sender) = self.senders.get(&conn) {
            // A closed channel means the connection is going away; its
            // detach is already queued.
            let _ = sender.send(frame);
        }
    }
}
