// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for controller subscriptions.
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`CallbackRegistry`] - Registry for storing and dispatching callbacks

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::state::DeviceStatus;

/// Unique identifier for a subscription.
///
/// IDs are unique within one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Callback receiving a status snapshot.
type StatusCallback = Arc<dyn Fn(&DeviceStatus) + Send + Sync>;

/// Callback for the disconnected event.
type DisconnectedCallback = Arc<dyn Fn() + Send + Sync>;

/// Registry for controller subscription callbacks.
///
/// Uses `parking_lot::RwLock` for interior mutability so callbacks can be
/// registered from any task while the controller worker dispatches.
///
/// Callbacks run synchronously on the controller worker. A slow callback
/// delays the next command, so heavy work should be handed off. A callback
/// that panics is logged and skipped; the remaining callbacks still run.
pub struct CallbackRegistry {
    next_id: AtomicU64,
    refreshed_callbacks: RwLock<HashMap<SubscriptionId, StatusCallback>>,
    connected_callbacks: RwLock<HashMap<SubscriptionId, StatusCallback>>,
    disconnected_callbacks: RwLock<HashMap<SubscriptionId, DisconnectedCallback>>,
}

impl CallbackRegistry {
    /// Creates a new empty callback registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            refreshed_callbacks: RwLock::new(HashMap::new()),
            connected_callbacks: RwLock::new(HashMap::new()),
            disconnected_callbacks: RwLock::new(HashMap::new()),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Registers a callback run after every refresh.
    pub fn on_refreshed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceStatus) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.refreshed_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback run when a connection is established.
    ///
    /// The callback receives the status after the initial refresh.
    pub fn on_connected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceStatus) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.connected_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback run when the connection is closed.
    pub fn on_disconnected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.disconnected_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Unregisters a callback by its subscription ID.
    ///
    /// Returns `true` if a callback was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.refreshed_callbacks.write().remove(&id).is_some()
            || self.connected_callbacks.write().remove(&id).is_some()
            || self.disconnected_callbacks.write().remove(&id).is_some()
    }

    /// Clears all callbacks.
    pub fn clear(&self) {
        self.refreshed_callbacks.write().clear();
        self.connected_callbacks.write().clear();
        self.disconnected_callbacks.write().clear();
    }

    // =========================================================================
    // Dispatch methods
    // =========================================================================

    // Callbacks are cloned out of the lock so a callback may subscribe or
    // unsubscribe without deadlocking.

    /// Dispatches a refresh notification.
    pub fn dispatch_refreshed(&self, status: &DeviceStatus) {
        let callbacks = snapshot(&self.refreshed_callbacks);
        for (id, callback) in callbacks {
            invoke(id, "refreshed", || callback(status));
        }
    }

    /// Dispatches the connected event with the initial status.
    pub fn dispatch_connected(&self, status: &DeviceStatus) {
        let callbacks = snapshot(&self.connected_callbacks);
        for (id, callback) in callbacks {
            invoke(id, "connected", || callback(status));
        }
    }

    /// Dispatches the disconnected event.
    pub fn dispatch_disconnected(&self) {
        let callbacks = snapshot(&self.disconnected_callbacks);
        for (id, callback) in callbacks {
            invoke(id, "disconnected", &*callback);
        }
    }

    /// Returns the total number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.refreshed_callbacks.read().len()
            + self.connected_callbacks.read().len()
            + self.disconnected_callbacks.read().len()
    }

    /// Returns `true` if there are no registered callbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callback_count() == 0
    }
}

type Entries<T> = Vec<(SubscriptionId, T)>;

fn snapshot<T: Clone>(callbacks: &RwLock<HashMap<SubscriptionId, T>>) -> Entries<T> {
    callbacks
        .read()
        .iter()
        .map(|(id, callback)| (*id, callback.clone()))
        .collect()
}

fn invoke(id: SubscriptionId, event: &'static str, call: impl FnOnce()) {
    if panic::catch_unwind(AssertUnwindSafe(call)).is_err() {
        tracing::warn!(subscription = %id, event, "Callback panicked");
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}
