// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Controller event types.

use serde::{Deserialize, Serialize};

use crate::state::DeviceStatus;
use crate::types::Endpoint;

/// Events emitted by a device controller.
///
/// # Examples
///
/// ```
/// use parcelbox::event::DeviceEvent;
/// use parcelbox::state::DeviceStatus;
///
/// let event = DeviceEvent::refreshed(DeviceStatus::new());
/// assert!(event.is_refresh());
/// assert!(event.status().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceEvent {
    /// A connection was opened and the initial refresh completed.
    Connected {
        /// The endpoint that was connected.
        endpoint: Endpoint,
        /// Status after the initial refresh.
        status: DeviceStatus,
    },

    /// A refresh cycle completed.
    ///
    /// Exactly one of these is emitted per refresh, whether it was requested
    /// directly, triggered by the poll timer or by an unlock.
    Refreshed {
        /// Status after the refresh.
        status: DeviceStatus,
    },

    /// The connection was closed by the caller.
    Disconnected,

    /// A connect attempt failed.
    ConnectFailed {
        /// Why the attempt failed.
        reason: String,
    },
}

impl DeviceEvent {
    /// Creates a connected event.
    #[must_use]
    pub fn connected(endpoint: Endpoint, status: DeviceStatus) -> Self {
        Self::Connected { endpoint, status }
    }

    /// Creates a refresh event.
    #[must_use]
    pub fn refreshed(status: DeviceStatus) -> Self {
        Self::Refreshed { status }
    }

    /// Creates a connect-failed event.
    #[must_use]
    pub fn connect_failed(reason: impl Into<String>) -> Self {
        Self::ConnectFailed {
            reason: reason.into(),
        }
    }

    /// Returns `true` if this is a refresh notification.
    #[must_use]
    pub fn is_refresh(&self) -> bool {
        matches!(self, Self::Refreshed { .. })
    }

    /// Returns `true` if this is a connection lifecycle event.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            Self::Connected { .. } | Self::Disconnected | Self::ConnectFailed { .. }
        )
    }

    /// Returns the status carried by this event, if any.
    #[must_use]
    pub fn status(&self) -> Option<&DeviceStatus> {
        match self {
            Self::Connected { status, .. } | Self::Refreshed { status } => Some(status),
            Self::Disconnected | Self::ConnectFailed { .. } => None,
        }
    }
}
