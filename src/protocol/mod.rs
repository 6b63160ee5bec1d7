// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire protocol for talking to a delivery box.
//!
//! The box speaks a minimal ASCII protocol over a long-lived TCP stream:
//!
//! - outbound: one command letter followed by `>`
//! - inbound: exactly 4 bytes, the first 3 are the payload and the last is a
//!   terminator that is always discarded
//!
//! [`ProtocolConnection`] owns the stream and implements framing. The stream
//! itself is produced by a [`Connector`], which is [`TcpConnector`] in
//! production and can be swapped for an in-memory transport in tests.

mod connection;
mod frame;
#[cfg(test)]
pub(crate) mod testing;

pub use connection::ProtocolConnection;
pub use frame::{RESPONSE_FRAME_LEN, decode_response};

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use crate::types::Endpoint;

/// Outcome of a successful command exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResponse {
    /// Decoded, trimmed 3-byte payload.
    Payload(String),
    /// A fire-and-forget command was handed to the transport.
    Sent,
}

impl CommandResponse {
    /// Returns the payload text, if any.
    #[must_use]
    pub fn payload(&self) -> Option<&str> {
        match self {
            Self::Payload(text) => Some(text),
            Self::Sent => None,
        }
    }
}

/// Byte stream a [`ProtocolConnection`] can run over.
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send + 'static {
    /// Returns whether the underlying transport still reports an
    /// established connection.
    ///
    /// This is a local check. It does not probe the peer.
    fn is_established(&self) -> bool;
}

impl Transport for TcpStream {
    fn is_established(&self) -> bool {
        self.peer_addr().is_ok()
    }
}

/// Factory for transports.
pub trait Connector: Send + Sync + 'static {
    /// The stream type produced by this connector.
    type Stream: Transport;

    /// Opens a stream to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error of the failed connect attempt.
    fn connect(
        &self,
        endpoint: &Endpoint,
    ) -> impl Future<Output = io::Result<Self::Stream>> + Send;
}

/// Connects over TCP with a bounded connect time.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    connect_timeout: Duration,
}

impl TcpConnector {
    /// Default connect timeout.
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates a connector with the given connect timeout.
    #[must_use]
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    /// Returns the connect timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CONNECT_TIMEOUT)
    }
}

impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, endpoint: &Endpoint) -> io::Result<TcpStream> {
        let addr = endpoint.socket_addr();
        let stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "connect timed out"))??;

        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(error = %e, "Failed to set TCP_NODELAY");
        }

        Ok(stream)
    }
}
