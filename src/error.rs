// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `parcelbox` library.
//!
//! The hierarchy follows the three failure classes of the box protocol:
//! endpoint validation (rejected before any I/O), connection management, and
//! per-command transport failures.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// The endpoint could not be validated.
    #[error("endpoint error: {0}")]
    Endpoint(#[from] EndpointError),

    /// Error occurred while managing the connection.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A single command failed on the wire.
    #[error("command error: {0}")]
    Command(#[from] CommandError),
}

/// Errors raised while validating an address/port pair.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EndpointError {
    /// The address is not a dotted-quad IPv4 literal.
    #[error("invalid IPv4 address: {0:?}")]
    InvalidAddress(String),

    /// The port is not a number in `[0, 65535]`.
    #[error("invalid port: {0:?}")]
    InvalidPort(String),
}

/// Errors related to the connection lifecycle.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The endpoint was rejected before any socket was created.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[from] EndpointError),

    /// The transport-level connect failed (unreachable, refused, timed out).
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// `open` was called on a connection that is already open.
    #[error("connection is already open")]
    AlreadyConnected,

    /// The operation requires an open connection.
    #[error("connection is not open")]
    NotConnected,

    /// Internal channel to the controller worker was closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),
}

/// Errors of a single request/response exchange.
///
/// These never close the connection. The controller folds them into status
/// fields as [`CommandError::SENTINEL`].
#[derive(Debug, Error)]
pub enum CommandError {
    /// No stream is open.
    #[error("connection is not open")]
    NotConnected,

    /// Sending or receiving failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the stream before a full response frame arrived.
    #[error("short read: received {received} of 4 bytes")]
    ShortRead {
        /// Number of bytes received before end of stream.
        received: usize,
    },

    /// No complete response arrived in time.
    #[error("response timed out after {0} ms")]
    Timeout(u64),
}

impl CommandError {
    /// Text stored in a status field when a query failed.
    pub const SENTINEL: &'static str = "error";
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_error_display() {
        let err = EndpointError::InvalidAddress("10.0.0".to_string());
        assert_eq!(err.to_string(), "invalid IPv4 address: \"10.0.0\"");
    }

    #[test]
    fn protocol_error_from_endpoint_error() {
        let err: ProtocolError = EndpointError::InvalidPort("70000".to_string()).into();
        assert!(matches!(
            err,
            ProtocolError::InvalidEndpoint(EndpointError::InvalidPort(_))
        ));
    }

    #[test]
    fn command_error_display() {
        let err = CommandError::ShortRead { received: 2 };
        assert_eq!(err.to_string(), "short read: received 2 of 4 bytes");
        assert_eq!(
            CommandError::Timeout(250).to_string(),
            "response timed out after 250 ms"
        );
    }

    #[test]
    fn error_from_command_error() {
        let err: Error = CommandError::NotConnected.into();
        assert!(matches!(err, Error::Command(CommandError::NotConnected)));
    }
}
