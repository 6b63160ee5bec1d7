// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Status snapshot of a delivery box.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{BoxState, ConnectionState, PackageState};

/// Last known status of a delivery box.
///
/// The controller owns the authoritative copy and publishes clones after
/// every refresh. Fields keep their previous value until the corresponding
/// query runs again, so a lock-only refresh leaves `package_state` as it was.
///
/// # Examples
///
/// ```
/// use parcelbox::state::DeviceStatus;
/// use parcelbox::types::ConnectionState;
///
/// let status = DeviceStatus::new();
/// assert_eq!(status.connection(), ConnectionState::Disconnected);
/// assert!(status.refreshed_at().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatus {
    connection: ConnectionState,
    box_state: BoxState,
    package_state: PackageState,
    refreshed_at: Option<DateTime<Utc>>,
}

impl DeviceStatus {
    /// Creates a status that has never been refreshed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the connection state.
    #[must_use]
    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    /// Returns true if the last connection check succeeded.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Returns the door lock state.
    #[must_use]
    pub fn box_state(&self) -> &BoxState {
        &self.box_state
    }

    /// Returns the package state.
    #[must_use]
    pub fn package_state(&self) -> &PackageState {
        &self.package_state
    }

    /// Returns when the last refresh completed.
    #[must_use]
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    pub(crate) fn set_connection(&mut self, connection: ConnectionState) {
        self.connection = connection;
    }

    pub(crate) fn set_box_state(&mut self, state: BoxState) {
        self.box_state = state;
    }

    pub(crate) fn set_package_state(&mut self, state: PackageState) {
        self.package_state = state;
    }

    pub(crate) fn mark_refreshed(&mut self) {
        self.refreshed_at = Some(Utc::now());
    }
}
