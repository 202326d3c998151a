//! Namespace dispatcher: routes each client frame to its game's namespace.
//!
//! The dispatcher holds one [`NamespaceHandle`] per installed game and no
//! game state. A connection is attached to a namespace the first time it
//! sends a frame there, and detached from all of them when it goes away,
//! so events for one game never reach another.

use std::collections::HashSet;

use parlor_protocol::{ClientFrame, ServerFrame, events};
use parlor_room::{FrameSender, NamespaceHandle};
use parlor_transport::ConnectionId;
use serde_json::{Value, json};

use crate::Catalogue;

/// Route key of the root namespace, which answers catalogue lookups.
pub const ROOT_NAMESPACE: &str = "";

/// `request_data` key listing the installed route keys.
pub const AVAILABLE_GAMES: &str = "AVAILABLE_GAMES";

/// Dispatcher-side view of one connection.
#[derive(Debug)]
pub struct Link {
    conn: ConnectionId,
    sender: FrameSender,
    attached: HashSet<String>,
}

impl Link {
    pub fn new(conn: ConnectionId, sender: FrameSender) -> Self {
        Self {
            conn,
            sender,
            attached: HashSet::new(),
        }
    }

    pub fn conn(&self) -> ConnectionId {
        self.conn
    }

    pub fn is_attached(&self, route_key: &str) -> bool {
        self.attached.contains(route_key)
    }
}

pub struct Dispatcher {
    namespaces: Vec<NamespaceHandle>,
}

impl Dispatcher {
    /// Starts one namespace actor per catalogue entry.
    pub fn install(catalogue: &Catalogue, command_buffer: usize) -> Self {
        let namespaces = catalogue
            .descriptors()
            .iter()
            .map(|game| {
                tracing::info!(game = %game.route_key, name = %game.display_name, "installing game");
                (game.install)(&game.route_key, command_buffer)
            })
            .collect();
        Self { namespaces }
    }

    pub fn namespace(&self, route_key: &str) -> Option<&NamespaceHandle> {
        self.namespaces.iter().find(|ns| ns.route_key() == route_key)
    }

    pub fn route_keys(&self) -> Vec<&str> {
        self.namespaces.iter().map(NamespaceHandle::route_key).collect()
    }

    /// Routes one client frame.
    pub async fn deliver(&self, link: &mut Link, frame: ClientFrame) {
        if frame.nsp == ROOT_NAMESPACE {
            self.handle_root(link, &frame);
            return;
        }

        let Some(namespace) = self.namespace(&frame.nsp) else {
            tracing::debug!(conn = %link.conn, nsp = %frame.nsp, "frame for unknown namespace dropped");
            return;
        };

        if !link.attached.contains(&frame.nsp) {
            if let Err(e) = namespace.attach(link.conn, link.sender.clone()).await {
                tracing::warn!(conn = %link.conn, error = %e, "attach failed");
                return;
            }
            link.attached.insert(frame.nsp.clone());
        }

        if let Err(e) = namespace.deliver(link.conn, frame).await {
            tracing::warn!(conn = %link.conn, error = %e, "delivery failed");
        }
    }

    /// Detaches the connection from every namespace it reached.
    pub async fn disconnect(&self, link: &mut Link) {
        for route_key in link.attached.drain() {
            let Some(namespace) = self.namespace(&route_key) else {
                continue;
            };
            if let Err(e) = namespace.detach(link.conn).await {
                tracing::warn!(conn = %link.conn, error = %e, "detach failed");
            }
        }
    }

    /// Stops every namespace actor.
    pub async fn shutdown(&self) {
        for namespace in &self.namespaces {
            let _ = namespace.shutdown().await;
        }
    }

    fn handle_root(&self, link: &Link, frame: &ClientFrame) {
        if frame.event != events::REQUEST_DATA {
            tracing::debug!(conn = %link.conn, event = %frame.event, "unknown root event");
            return;
        }
        let Some(id) = frame.ack else {
            return;
        };
        match self.requestable(frame.args.first()) {
            Some(data) => {
                let _ = link.sender.send(ServerFrame::ack(id, data));
            }
            None => tracing::debug!(conn = %link.conn, key = ?frame.args.first(), "unknown data key"),
        }
    }

    fn requestable(&self, key: Option<&Value>) -> Option<Value> {
        match key.and_then(Value::as_str) {
            Some(AVAILABLE_GAMES) => Some(json!(self.route_keys())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::mpsc;

    use super::*;

    fn link(id: u64) -> (Link, mpsc::UnboundedReceiver<ServerFrame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Link::new(ConnectionId::new(id), tx), rx)
    }

    async fn next(rx: &mut mpsc::UnboundedReceiver<ServerFrame>) -> ServerFrame {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timed out")
            .expect("channel closed")
    }

    #[tokio::test]
    async fn test_available_games_ack() {
        let dispatcher = Dispatcher::install(&Catalogue::standard(), 8);
        let (mut link, mut rx) = link(1);

        let frame = ClientFrame::new("", events::REQUEST_DATA)
            .with_args(vec![json!(AVAILABLE_GAMES)])
            .with_ack(3);
        dispatcher.deliver(&mut link, frame).await;

        assert_eq!(
            next(&mut rx).await,
            ServerFrame::ack(3, json!(["chess", "escampe", "solitaire", "petitbac"]))
        );
        assert!(link.attached.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_data_key_gets_no_ack() {
        let dispatcher = Dispatcher::install(&Catalogue::standard(), 8);
        let (mut link, mut rx) = link(1);

        let frame = ClientFrame::new("", events::REQUEST_DATA)
            .with_args(vec![json!("RULES")])
            .with_ack(1);
        dispatcher.deliver(&mut link, frame).await;
        dispatcher
            .deliver(&mut link, ClientFrame::new("", events::REQUEST_DATA).with_args(vec![json!(AVAILABLE_GAMES)]))
            .await;

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_first_frame_attaches_and_disconnect_detaches() {
        let dispatcher = Dispatcher::install(&Catalogue::standard(), 8);
        let (mut link, _rx) = link(1);

        dispatcher
            .deliver(&mut link, ClientFrame::new("chess", events::JOIN).in_room("r"))
            .await;
        assert!(link.is_attached("chess"));
        assert!(!link.is_attached("escampe"));

        let chess = dispatcher.namespace("chess").unwrap();
        let info = chess.info().await.unwrap();
        assert_eq!((info.connections, info.rooms), (1, 1));

        dispatcher.disconnect(&mut link).await;
        let info = chess.info().await.unwrap();
        assert_eq!((info.connections, info.rooms), (0, 0));
    }

    #[tokio::test]
    async fn test_unknown_namespace_is_dropped() {
        let dispatcher = Dispatcher::install(&Catalogue::standard(), 8);
        let (mut link, mut rx) = link(1);

        dispatcher
            .deliver(&mut link, ClientFrame::new("bataille", events::JOIN).in_room("r"))
            .await;
        assert!(link.attached.is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_namespaces_are_isolated() {
        let dispatcher = Dispatcher::install(&Catalogue::standard(), 8);
        let (mut a, mut rx_a) = link(1);
        let (mut b, mut rx_b) = link(2);

        // Same room name in two games.
        dispatcher.deliver(&mut a, ClientFrame::new("chess", events::JOIN).in_room("r")).await;
        dispatcher.deliver(&mut b, ClientFrame::new("escampe", events::JOIN).in_room("r")).await;

        let choose = ClientFrame::new("chess", "choose_side")
            .in_room("r")
            .with_args(vec![json!(0)]);
        dispatcher.deliver(&mut a, choose).await;

        match next(&mut rx_a).await {
            ServerFrame::Event { nsp, event, .. } => {
                assert_eq!(nsp, "chess");
                assert_eq!(event, events::APPLY_PATCHES);
            }
            other => panic!("unexpected frame {other:?}"),
        }

        // Round-trip through the escampe actor so anything it sent has arrived.
        dispatcher.namespace("escampe").unwrap().info().await.unwrap();
        assert!(rx_b.try_recv().is_err());
    }
}
