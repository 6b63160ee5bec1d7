// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Long-lived connection to a delivery box.

use std::io;
use std::pin::Pin;
use std::task::Poll;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt, ReadBuf};

use crate::command::Command;
use crate::error::{CommandError, ProtocolError};
use crate::protocol::frame::{RESPONSE_FRAME_LEN, decode_response};
use crate::protocol::{CommandResponse, Connector, TcpConnector, Transport};
use crate::types::Endpoint;

/// Framed request/response connection to a delivery box.
///
/// The connection starts closed. [`open`](Self::open) validates the
/// endpoint, connects and sends the connect probe. Commands are executed one
/// at a time with [`execute_command`](Self::execute_command); a failed
/// command never closes the connection, so a dead peer is only noticed
/// through [`is_connected`](Self::is_connected) or by failing commands.
///
/// The connection holds at most one request in flight and performs no
/// retries. It takes `&mut self` for every I/O operation, so sharing it
/// between callers requires a single owner (see
/// [`DeviceController`](crate::DeviceController)).
///
/// # Examples
///
/// ```no_run
/// use parcelbox::command::Command;
/// use parcelbox::protocol::ProtocolConnection;
///
/// # async fn example() -> parcelbox::Result<()> {
/// let mut connection = ProtocolConnection::new();
/// connection.open("192.168.1.40", "5000").await?;
///
/// let reply = connection.execute(Command::BoxState).await?;
/// println!("box replied {:?}", reply.payload());
///
/// connection.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct ProtocolConnection<C: Connector = TcpConnector> {
    connector: C,
    stream: Option<C::Stream>,
    endpoint: Option<Endpoint>,
    response_timeout: Duration,
}

impl<C: Connector> std::fmt::Debug for ProtocolConnection<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolConnection")
            .field("endpoint", &self.endpoint)
            .field("open", &self.is_open())
            .field("response_timeout", &self.response_timeout)
            .finish_non_exhaustive()
    }
}

impl ProtocolConnection<TcpConnector> {
    /// Creates an unconnected TCP connection with default timeouts.
    #[must_use]
    pub fn new() -> Self {
        Self::with_connector(TcpConnector::default())
    }
}

impl Default for ProtocolConnection<TcpConnector> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Connector> ProtocolConnection<C> {
    /// Default time to wait for a complete response frame.
    pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(2);

    /// Creates an unconnected connection using a custom connector.
    #[must_use]
    pub fn with_connector(connector: C) -> Self {
        Self {
            connector,
            stream: None,
            endpoint: None,
            response_timeout: Self::DEFAULT_RESPONSE_TIMEOUT,
        }
    }

    /// Sets the time to wait for a response frame.
    #[must_use]
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Returns the response timeout.
    #[must_use]
    pub fn response_timeout(&self) -> Duration {
        self.response_timeout
    }

    /// Returns the endpoint of the last successful open.
    #[must_use]
    pub fn endpoint(&self) -> Option<Endpoint> {
        self.endpoint
    }

    /// Returns true if a stream is held, whether or not it is still alive.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Returns true if a stream is held and the transport still reports it
    /// established.
    ///
    /// This is a point-in-time check, not a ping: a peer that silently
    /// stopped answering is reported as connected until I/O fails.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.stream.as_ref().is_some_and(Transport::is_established)
    }

    /// Validates `address`/`port` and opens the connection.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::InvalidEndpoint`] if the input is malformed; no
    ///   connect is attempted
    /// - [`ProtocolError::AlreadyConnected`] if a stream is already held
    /// - [`ProtocolError::ConnectionFailed`] if the connect itself fails
    pub async fn open(&mut self, address: &str, port: &str) -> Result<(), ProtocolError> {
        let endpoint = Endpoint::parse(address, port)?;
        self.open_endpoint(endpoint).await
    }

    /// Opens the connection to an already validated endpoint.
    ///
    /// On success the connect probe is sent and its reply discarded. A
    /// failing probe is logged and does not undo the open.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::AlreadyConnected`] if a stream is already
    /// held, or [`ProtocolError::ConnectionFailed`] if connecting fails.
    pub async fn open_endpoint(&mut self, endpoint: Endpoint) -> Result<(), ProtocolError> {
        if self.stream.is_some() {
            tracing::warn!(%endpoint, "Open requested on an already open connection");
            return Err(ProtocolError::AlreadyConnected);
        }

        tracing::info!(%endpoint, "Connecting to box");

        let stream = self.connector.connect(&endpoint).await.map_err(|e| {
            tracing::warn!(%endpoint, error = %e, "Connect failed");
            ProtocolError::ConnectionFailed(e.to_string())
        })?;

        self.stream = Some(stream);
        self.endpoint = Some(endpoint);

        if let Err(e) = self.execute(Command::ConnectProbe).await {
            tracing::warn!(%endpoint, error = %e, "Connect probe failed");
        }

        tracing::info!(%endpoint, "Connected to box");
        Ok(())
    }

    /// Shuts the stream down and releases it.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::NotConnected`] if no stream is held.
    pub async fn close(&mut self) -> Result<(), ProtocolError> {
        let mut stream = self.stream.take().ok_or(ProtocolError::NotConnected)?;

        if let Err(e) = stream.shutdown().await {
            tracing::debug!(error = %e, "Stream shutdown failed");
        }

        tracing::info!(endpoint = ?self.endpoint, "Connection closed");
        Ok(())
    }

    /// Executes `command` with its default response expectation.
    ///
    /// # Errors
    ///
    /// See [`execute_command`](Self::execute_command).
    pub async fn execute(&mut self, command: Command) -> Result<CommandResponse, CommandError> {
        self.execute_command(command, command.expects_response()).await
    }

    /// Sends `command` and, if `expect_response`, waits for its reply.
    ///
    /// Inbound bytes already waiting on the stream are discarded before the
    /// frame is written, so a reply that missed its timeout is never read
    /// as the answer to a later command.
    ///
    /// Fire-and-forget commands (`expect_response == false`) always return
    /// [`CommandResponse::Sent`], even when the send failed; the failure is
    /// only logged. Connection state is never changed by this method.
    ///
    /// # Errors
    ///
    /// - [`CommandError::NotConnected`] if no stream is held
    /// - [`CommandError::Io`] if sending or receiving failed
    /// - [`CommandError::ShortRead`] if the stream ended mid-frame
    /// - [`CommandError::Timeout`] if no full frame arrived in time
    pub async fn execute_command(
        &mut self,
        command: Command,
        expect_response: bool,
    ) -> Result<CommandResponse, CommandError> {
        let timeout = self.response_timeout;
        let result = match self.stream.as_mut() {
            Some(stream) => exchange(stream, command, expect_response, timeout).await,
            None => Err(CommandError::NotConnected),
        };

        match result {
            Ok(response) => Ok(response),
            Err(e) if !expect_response => {
                tracing::warn!(%command, error = %e, "Fire-and-forget command not delivered");
                Ok(CommandResponse::Sent)
            }
            Err(CommandError::NotConnected) => {
                tracing::debug!(%command, "Command issued without an open connection");
                Err(CommandError::NotConnected)
            }
            Err(e) => {
                tracing::warn!(%command, error = %e, "Command failed");
                Err(e)
            }
        }
    }
}

async fn exchange<S: Transport>(
    stream: &mut S,
    command: Command,
    expect_response: bool,
    timeout: Duration,
) -> Result<CommandResponse, CommandError> {
    let discarded = discard_pending(stream).await?;
    if discarded > 0 {
        tracing::debug!(%command, discarded, "Discarded stale inbound bytes");
    }

    let frame = command.frame();
    tracing::debug!(%command, "Sending frame");

    let write = async {
        stream.write_all(&frame).await?;
        stream.flush().await
    };
    tokio::time::timeout(timeout, write)
        .await
        .map_err(|_| CommandError::Timeout(millis(timeout)))??;

    if !expect_response {
        return Ok(CommandResponse::Sent);
    }

    let response = tokio::time::timeout(timeout, read_frame(stream))
        .await
        .map_err(|_| CommandError::Timeout(millis(timeout)))??;

    let payload = decode_response(&response);
    tracing::debug!(%command, payload = %payload, "Received frame");
    Ok(CommandResponse::Payload(payload))
}

/// Drains whatever the peer already sent, such as a reply that arrived after
/// its timeout, so the next frame read belongs to the next command.
///
/// Never waits: returns as soon as a read would block or the stream ends.
async fn discard_pending<S: Transport>(stream: &mut S) -> io::Result<usize> {
    let mut scratch = [0u8; 64];
    let mut discarded = 0;

    loop {
        let ready = std::future::poll_fn(|cx| {
            let mut buf = ReadBuf::new(&mut scratch);
            Poll::Ready(match Pin::new(&mut *stream).poll_read(cx, &mut buf) {
                Poll::Ready(Ok(())) => Some(Ok(buf.filled().len())),
                Poll::Ready(Err(e)) => Some(Err(e)),
                Poll::Pending => None,
            })
        })
        .await;

        match ready {
            None | Some(Ok(0)) => return Ok(discarded),
            Some(Ok(n)) => discarded += n,
            Some(Err(e)) => return Err(e),
        }
    }
}

async fn read_frame<S: Transport>(
    stream: &mut S,
) -> Result<[u8; RESPONSE_FRAME_LEN], CommandError> {
    let mut frame = [0u8; RESPONSE_FRAME_LEN];
    let mut received = 0;

    while received < RESPONSE_FRAME_LEN {
        let n = stream.read(&mut frame[received..]).await?;
        if n == 0 {
            return Err(CommandError::ShortRead { received });
        }
        received += n;
    }

    Ok(frame)
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
