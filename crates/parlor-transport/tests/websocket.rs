//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener on an OS-assigned port and talk to it
//! with a tokio-tungstenite client.

#[cfg(feature = "websocket")]
mod websocket {
    use std::sync::Arc;

    use futures_util::{SinkExt, StreamExt};
    use parlor_transport::{Connection, Pending, Transport, WebSocketConnection, WebSocketTransport};
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn connect_client(addr: &str) -> ClientWs {
        let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("client should connect");
        ws
    }

    async fn bound_transport() -> (WebSocketTransport, String) {
        let transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("local addr").to_string();
        (transport, addr)
    }

    async fn accept(transport: &mut WebSocketTransport) -> WebSocketConnection {
        transport
            .accept()
            .await
            .expect("should accept")
            .upgrade()
            .await
            .expect("should upgrade")
    }

    #[tokio::test]
    async fn test_accept_returns_before_handshake() {
        let (mut transport, addr) = bound_transport().await;

        // A raw TCP peer that never sends the upgrade request.
        let _silent = tokio::net::TcpStream::connect(&addr).await.unwrap();
        let silent = tokio::time::timeout(
            std::time::Duration::from_secs(2),
            transport.accept(),
        )
        .await
        .expect("accept must not wait for the handshake")
        .expect("should accept");
        assert!(silent.peer_addr().ip().is_loopback());

        let server_handle = tokio::spawn(async move { accept(&mut transport).await });
        let _client = connect_client(&addr).await;
        let conn = server_handle.await.unwrap();
        assert!(conn.id().into_inner() > 0);
    }

    #[tokio::test]
    async fn test_websocket_accept_and_send_receive() {
        let (mut transport, addr) = bound_transport().await;

        let server_handle = tokio::spawn(async move {
            accept(&mut transport).await
        });
        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.expect("task should complete");

        assert!(server_conn.id().into_inner() > 0);

        // JSON payloads go out as text frames.
        server_conn
            .send(br#"{"hello":"client"}"#)
            .await
            .expect("send should succeed");
        let msg = client_ws.next().await.unwrap().unwrap();
        assert!(msg.is_text());
        assert_eq!(msg.into_data().as_ref(), br#"{"hello":"client"}"#);

        client_ws
            .send(Message::Text(r#"{"hello":"server"}"#.into()))
            .await
            .unwrap();
        let received = server_conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, br#"{"hello":"server"}"#);

        server_conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_send_while_recv_pending() {
        let (mut transport, addr) = bound_transport().await;

        let server_handle = tokio::spawn(async move {
            accept(&mut transport).await
        });
        let mut client_ws = connect_client(&addr).await;
        let server_conn = Arc::new(server_handle.await.unwrap());

        // Park a reader on the connection, then send from another task.
        let reader = {
            let conn = Arc::clone(&server_conn);
            tokio::spawn(async move { conn.recv().await })
        };
        tokio::time::timeout(
            std::time::Duration::from_secs(2),
            server_conn.send(b"not blocked"),
        )
        .await
        .expect("send must not wait for the pending recv")
        .expect("send should succeed");

        let msg = client_ws.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"not blocked");

        client_ws.send(Message::Close(None)).await.unwrap();
        let result = reader.await.unwrap().expect("recv should not error");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let (mut transport, addr) = bound_transport().await;

        let server_handle = tokio::spawn(async move {
            accept(&mut transport).await
        });
        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.unwrap();

        client_ws.send(Message::Close(None)).await.unwrap();

        let result = server_conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_websocket_connection_ids_are_unique() {
        let (mut transport, addr) = bound_transport().await;

        let server_handle = tokio::spawn(async move {
            let a = accept(&mut transport).await;
            let b = accept(&mut transport).await;
            (a.id(), b.id())
        });
        let _c1 = connect_client(&addr).await;
        let _c2 = connect_client(&addr).await;

        let (a, b) = server_handle.await.unwrap();
        assert_ne!(a, b);
    }
}
