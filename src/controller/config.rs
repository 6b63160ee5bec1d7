// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Controller configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for a [`DeviceController`](crate::DeviceController).
///
/// Durations are (de)serialized as whole milliseconds, and missing fields
/// take their default values.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use parcelbox::controller::ControllerConfig;
///
/// let config = ControllerConfig::default()
///     .with_poll_interval(Duration::from_millis(500))
///     .with_response_timeout(Duration::from_secs(1));
///
/// assert_eq!(config.poll_interval(), Duration::from_millis(500));
/// assert_eq!(config.connect_timeout(), ControllerConfig::DEFAULT_CONNECT_TIMEOUT);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    #[serde(rename = "poll_interval_ms", with = "millis")]
    poll_interval: Duration,
    #[serde(rename = "response_timeout_ms", with = "millis")]
    response_timeout: Duration,
    #[serde(rename = "connect_timeout_ms", with = "millis")]
    connect_timeout: Duration,
    event_capacity: usize,
}

impl ControllerConfig {
    /// Default interval between poll cycles.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);
    /// Default time to wait for a response frame.
    pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(2);
    /// Default time to wait for the TCP connect.
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
    /// Default event channel capacity.
    pub const DEFAULT_EVENT_CAPACITY: usize = 64;

    /// Sets the interval between poll cycles.
    ///
    /// A zero interval is raised to one millisecond.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the time to wait for a response frame.
    #[must_use]
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Sets the time to wait for the TCP connect.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the capacity of the event channel.
    ///
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Returns the poll interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval.max(Duration::from_millis(1))
    }

    /// Returns the response timeout.
    #[must_use]
    pub fn response_timeout(&self) -> Duration {
        self.response_timeout
    }

    /// Returns the connect timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the event channel capacity.
    #[must_use]
    pub fn event_capacity(&self) -> usize {
        self.event_capacity.max(1)
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            response_timeout: Self::DEFAULT_RESPONSE_TIMEOUT,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            event_capacity: Self::DEFAULT_EVENT_CAPACITY,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        duration: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
