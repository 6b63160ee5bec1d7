// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Validated network endpoint of a delivery box.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use serde::{Deserialize, Serialize};

use crate::error::EndpointError;

/// IPv4 address and TCP port of a delivery box controller.
///
/// An `Endpoint` can only be built from input that passed validation, so
/// holding one means no further checks are needed before connecting.
///
/// # Examples
///
/// ```
/// use parcelbox::types::Endpoint;
///
/// let endpoint = Endpoint::parse("192.168.1.40", "5000").unwrap();
/// assert_eq!(endpoint.port(), 5000);
/// assert_eq!(endpoint.to_string(), "192.168.1.40:5000");
///
/// assert!(Endpoint::parse("192.168.1.256", "5000").is_err());
/// assert!(Endpoint::parse("192.168.1.40", "port").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    address: Ipv4Addr,
    port: u16,
}

impl Endpoint {
    /// Creates an endpoint from already typed parts.
    #[must_use]
    pub const fn new(address: Ipv4Addr, port: u16) -> Self {
        Self { address, port }
    }

    /// Parses and validates textual address and port input.
    ///
    /// The address must be a strict dotted quad: exactly four octets, each
    /// made of one to three ASCII digits with a value of at most 255. The
    /// port must be a decimal number in `[0, 65535]`.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::InvalidAddress`] or
    /// [`EndpointError::InvalidPort`] for malformed input.
    pub fn parse(address: &str, port: &str) -> Result<Self, EndpointError> {
        let address = parse_dotted_quad(address)
            .ok_or_else(|| EndpointError::InvalidAddress(address.to_string()))?;
        let port = parse_port(port).ok_or_else(|| EndpointError::InvalidPort(port.to_string()))?;
        Ok(Self { address, port })
    }

    /// Returns the IPv4 address.
    #[must_use]
    pub const fn address(&self) -> Ipv4Addr {
        self.address
    }

    /// Returns the TCP port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the socket address to connect to.
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.address, self.port))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

impl From<SocketAddrV4> for Endpoint {
    fn from(addr: SocketAddrV4) -> Self {
        Self::new(*addr.ip(), addr.port())
    }
}

fn parse_dotted_quad(input: &str) -> Option<Ipv4Addr> {
    let mut octets = [0u8; 4];
    let mut parts = input.split('.');

    for octet in &mut octets {
        let part = parts.next()?;
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *octet = part.parse().ok()?;
    }

    if parts.next().is_some() {
        return None;
    }

    Some(Ipv4Addr::from(octets))
}

fn parse_port(input: &str) -> Option<u16> {
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    input.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_endpoint() {
        let endpoint = Endpoint::parse("10.0.0.7", "8080").unwrap();
        assert_eq!(endpoint.address(), Ipv4Addr::new(10, 0, 0, 7));
        assert_eq!(endpoint.port(), 8080);
    }

    #[test]
    fn parse_accepts_port_bounds() {
        assert_eq!(Endpoint::parse("127.0.0.1", "0").unwrap().port(), 0);
        assert_eq!(Endpoint::parse("127.0.0.1", "65535").unwrap().port(), 65535);
    }

    #[test]
    fn parse_accepts_padded_octets() {
        let endpoint = Endpoint::parse("010.000.000.001", "1").unwrap();
        assert_eq!(endpoint.address(), Ipv4Addr::new(10, 0, 0, 1));
    }

    #[test]
    fn parse_rejects_malformed_addresses() {
        for address in [
            "",
            "10.0.0",
            "10.0.0.1.5",
            "10.0.0.256",
            "300.1.1.1",
            "10..0.1",
            "10.0.0.1 ",
            " 10.0.0.1",
            "a.b.c.d",
            "10.0.0.-1",
            "10.0.0.+1",
            "1000.0.0.1",
            "localhost",
            "::1",
        ] {
            let result = Endpoint::parse(address, "5000");
            assert_eq!(
                result,
                Err(EndpointError::InvalidAddress(address.to_string())),
                "address {address:?} should be rejected"
            );
        }
    }

    #[test]
    fn parse_rejects_bad_ports() {
        for port in ["", "65536", "70000", "-1", "+80", "80a", "port", " 80", "99999999999"] {
            let result = Endpoint::parse("10.0.0.1", port);
            assert_eq!(
                result,
                Err(EndpointError::InvalidPort(port.to_string())),
                "port {port:?} should be rejected"
            );
        }
    }

    #[test]
    fn address_is_checked_before_port() {
        let result = Endpoint::parse("nope", "nope");
        assert!(matches!(result, Err(EndpointError::InvalidAddress(_))));
    }

    #[test]
    fn display_and_socket_addr() {
        let endpoint = Endpoint::new(Ipv4Addr::new(192, 168, 1, 40), 5000);
        assert_eq!(endpoint.to_string(), "192.168.1.40:5000");
        assert_eq!(endpoint.socket_addr().to_string(), "192.168.1.40:5000");
    }
}
