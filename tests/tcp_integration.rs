// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests over real loopback TCP sockets.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use parcelbox::{
    BoxState, Command, CommandError, CommandResponse, ConnectionState, ControllerConfig,
    DeviceController, DeviceEvent, PackageState, ProtocolConnection, ProtocolError,
};
use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

// ============================================================================
// Scripted box
// ============================================================================

/// Box simulator accepting one client at a time on a loopback port.
#[derive(Clone)]
struct ScriptedBox {
    addr: SocketAddr,
    replies: Arc<Mutex<HashMap<u8, &'static [u8]>>>,
    received: Arc<Mutex<Vec<u8>>>,
    hang_up_on: Arc<Mutex<Option<u8>>>,
}

impl ScriptedBox {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let replies: HashMap<u8, &'static [u8]> =
            HashMap::from([(b'c', &b"ACK\n"[..]), (b's', b"CLS\n"), (b'p', b"NO \n")]);
        let scripted = Self {
            addr,
            replies: Arc::new(Mutex::new(replies)),
            received: Arc::new(Mutex::new(Vec::new())),
            hang_up_on: Arc::new(Mutex::new(None)),
        };

        let server = scripted.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                server.serve(stream).await;
            }
        });

        scripted
    }

    async fn serve(&self, mut stream: TcpStream) {
        let mut frame = [0u8; 2];
        while stream.read_exact(&mut frame).await.is_ok() {
            assert_eq!(frame[1], b'>');
            self.received.lock().push(frame[0]);
            if *self.hang_up_on.lock() == Some(frame[0]) {
                return;
            }
            let reply = self.replies.lock().get(&frame[0]).copied();
            if let Some(reply) = reply
                && stream.write_all(reply).await.is_err()
            {
                return;
            }
        }
    }

    fn set_reply(&self, letter: u8, reply: &'static [u8]) {
        self.replies.lock().insert(letter, reply);
    }

    fn hang_up_on(&self, letter: u8) {
        *self.hang_up_on.lock() = Some(letter);
    }

    fn received(&self) -> String {
        String::from_utf8(self.received.lock().clone()).unwrap()
    }

    fn port(&self) -> String {
        self.addr.port().to_string()
    }
}

/// Returns a loopback port nothing listens on.
async fn closed_port() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port.to_string()
}

fn test_config() -> ControllerConfig {
    ControllerConfig::default()
        .with_poll_interval(Duration::from_secs(3600))
        .with_response_timeout(Duration::from_millis(500))
        .with_connect_timeout(Duration::from_secs(1))
}

// ============================================================================
// ProtocolConnection Tests
// ============================================================================

mod protocol_connection {
    use super::*;

    #[tokio::test]
    async fn open_sends_probe_and_queries_state() {
        let scripted = ScriptedBox::start().await;
        let mut connection = ProtocolConnection::new();

        connection.open("127.0.0.1", &scripted.port()).await.unwrap();
        assert!(connection.is_connected());

        let reply = connection.execute(Command::BoxState).await.unwrap();
        assert_eq!(reply, CommandResponse::Payload("CLS".to_string()));

        let reply = connection.execute(Command::PackageState).await.unwrap();
        assert_eq!(reply.payload(), Some("NO"));

        assert_eq!(scripted.received(), "csp");
        connection.close().await.unwrap();
        assert!(!connection.is_connected());
    }

    #[tokio::test]
    async fn unlock_does_not_wait_for_reply() {
        let scripted = ScriptedBox::start().await;
        let mut connection = ProtocolConnection::new();
        connection.open("127.0.0.1", &scripted.port()).await.unwrap();

        let reply = connection.execute(Command::Unlock).await.unwrap();
        assert_eq!(reply, CommandResponse::Sent);

        // The next exchange stays aligned with its own reply.
        scripted.set_reply(b's', b"OPN\n");
        let reply = connection.execute(Command::BoxState).await.unwrap();
        assert_eq!(reply.payload(), Some("OPN"));
    }

    #[tokio::test]
    async fn open_on_closed_port_fails() {
        let port = closed_port().await;
        let mut connection = ProtocolConnection::new();

        let err = connection.open("127.0.0.1", &port).await.unwrap_err();

        assert!(matches!(err, ProtocolError::ConnectionFailed(_)));
        assert!(!connection.is_open());
    }

    #[tokio::test]
    async fn missing_reply_times_out() {
        let scripted = ScriptedBox::start().await;
        scripted.set_reply(b's', b"");
        let mut connection =
            ProtocolConnection::new().with_response_timeout(Duration::from_millis(100));
        connection.open("127.0.0.1", &scripted.port()).await.unwrap();

        let err = connection.execute(Command::BoxState).await.unwrap_err();

        assert!(matches!(err, CommandError::Timeout(100)));
        assert!(connection.is_open());
    }

    #[tokio::test]
    async fn peer_hang_up_is_a_short_read() {
        let scripted = ScriptedBox::start().await;
        let mut connection = ProtocolConnection::new();
        connection.open("127.0.0.1", &scripted.port()).await.unwrap();
        scripted.hang_up_on(b'p');

        let err = connection.execute(Command::PackageState).await.unwrap_err();

        assert!(matches!(err, CommandError::ShortRead { received: 0 }));
        assert!(connection.is_open());
    }
}

// ============================================================================
// DeviceController Tests
// ============================================================================

mod device_controller {
    use super::*;

    #[tokio::test]
    async fn full_session() {
        let scripted = ScriptedBox::start().await;
        let controller = DeviceController::with_config(test_config());
        let mut events = controller.subscribe();

        assert!(controller.connect("127.0.0.1", &scripted.port()).await);
        assert_eq!(controller.connection_state(), ConnectionState::Connected);
        assert_eq!(controller.box_state(), BoxState::Closed);
        assert_eq!(controller.package_state(), PackageState::Empty);

        scripted.set_reply(b's', b"OPN\n");
        scripted.set_reply(b'p', b"YES\n");
        controller.unlock().await;
        assert_eq!(controller.box_state(), BoxState::Open);
        assert_eq!(controller.package_state(), PackageState::Empty);

        controller.refresh(true).await;
        assert_eq!(controller.package_state(), PackageState::Present);

        controller.close().await;
        assert!(!controller.is_connected());
        assert_eq!(scripted.received(), "cspussp");

        let mut kinds = Vec::new();
        while let Ok(event) = events.try_recv() {
            kinds.push(match event {
                DeviceEvent::Refreshed { .. } => "refreshed",
                DeviceEvent::Connected { .. } => "connected",
                DeviceEvent::Disconnected => "disconnected",
                DeviceEvent::ConnectFailed { .. } => "connect_failed",
            });
        }
        assert_eq!(
            kinds,
            ["refreshed", "connected", "refreshed", "refreshed", "disconnected"]
        );
    }

    #[tokio::test]
    async fn reconnect_after_close() {
        let scripted = ScriptedBox::start().await;
        let controller = DeviceController::with_config(test_config());

        assert!(controller.connect("127.0.0.1", &scripted.port()).await);
        controller.close().await;
        assert!(controller.connect("127.0.0.1", &scripted.port()).await);

        assert!(controller.query_connection_state().await);
        assert_eq!(scripted.received(), "cspcsp");
    }

    #[tokio::test]
    async fn connect_to_closed_port_reports_failure() {
        let port = closed_port().await;
        let controller = DeviceController::with_config(test_config());
        let mut events = controller.subscribe();

        assert!(!controller.connect("127.0.0.1", &port).await);

        assert!(!controller.is_connected());
        assert!(matches!(
            events.try_recv(),
            Ok(DeviceEvent::ConnectFailed { .. })
        ));
    }

    #[tokio::test]
    async fn polling_keeps_status_current() {
        let scripted = ScriptedBox::start().await;
        let config = test_config().with_poll_interval(Duration::from_millis(50));
        let controller = DeviceController::with_config(config);
        let mut watcher = controller.watch_status();

        assert!(controller.connect("127.0.0.1", &scripted.port()).await);
        watcher.borrow_and_update();
        scripted.set_reply(b'p', b"YES\n");

        tokio::time::timeout(
            Duration::from_secs(2),
            watcher.wait_for(|status| status.package_state() == &PackageState::Present),
        )
        .await
        .unwrap()
        .unwrap();

        controller.close().await;
    }
}
