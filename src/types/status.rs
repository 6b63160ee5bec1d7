// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Semantic status values derived from device replies.
//!
//! Replies outside the known vocabulary are kept verbatim in an `Unknown`
//! variant so that garbled or unexpected device output reaches observers
//! instead of being dropped.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether the controller currently holds a live connection to the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConnectionState {
    /// A stream is open and the transport reports it established.
    Connected,
    /// No usable stream.
    #[default]
    Disconnected,
}

impl ConnectionState {
    /// Returns true if connected.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns a human readable label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "Connected",
            Self::Disconnected => "Disconnected",
        }
    }
}

impl From<bool> for ConnectionState {
    fn from(connected: bool) -> Self {
        if connected {
            Self::Connected
        } else {
            Self::Disconnected
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lock state of the box door.
///
/// # Examples
///
/// ```
/// use parcelbox::types::BoxState;
///
/// assert_eq!(BoxState::from_reply("CLS"), BoxState::Closed);
/// assert_eq!(BoxState::from_reply("OPN"), BoxState::Open);
/// assert_eq!(BoxState::from_reply("ERR"), BoxState::Unknown("ERR".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoxState {
    /// The door is closed and locked.
    Closed,
    /// The door is open.
    Open,
    /// Any other reply, kept verbatim.
    Unknown(String),
}

impl BoxState {
    /// Reply payload reporting a closed door.
    pub const CLOSED_REPLY: &'static str = "CLS";
    /// Reply payload reporting an open door.
    pub const OPEN_REPLY: &'static str = "OPN";

    /// Maps a decoded reply payload to a box state.
    #[must_use]
    pub fn from_reply(reply: &str) -> Self {
        match reply {
            Self::CLOSED_REPLY => Self::Closed,
            Self::OPEN_REPLY => Self::Open,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Returns the display text of this state.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Closed => "Closed",
            Self::Open => "Open",
            Self::Unknown(raw) => raw,
        }
    }
}

impl Default for BoxState {
    fn default() -> Self {
        Self::Unknown(String::new())
    }
}

impl fmt::Display for BoxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a package is sitting in the box.
///
/// # Examples
///
/// ```
/// use parcelbox::types::PackageState;
///
/// assert_eq!(PackageState::from_reply("YES"), PackageState::Present);
/// assert_eq!(PackageState::from_reply("NO"), PackageState::Empty);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PackageState {
    /// A package is present.
    Present,
    /// The box is empty.
    Empty,
    /// Any other reply, kept verbatim.
    Unknown(String),
}

impl PackageState {
    /// Reply payload reporting a package.
    pub const PRESENT_REPLY: &'static str = "YES";
    /// Reply payload reporting an empty box.
    pub const EMPTY_REPLY: &'static str = "NO";

    /// Maps a decoded reply payload to a package state.
    #[must_use]
    pub fn from_reply(reply: &str) -> Self {
        match reply {
            Self::PRESENT_REPLY => Self::Present,
            Self::EMPTY_REPLY => Self::Empty,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Returns the display text of this state.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Present => "Present",
            Self::Empty => "Empty",
            Self::Unknown(raw) => raw,
        }
    }
}

impl Default for PackageState {
    fn default() -> Self {
        Self::Unknown(String::new())
    }
}

impl fmt::Display for PackageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
