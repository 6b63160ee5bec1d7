// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscribable trait for types that emit status callbacks.

use crate::state::DeviceStatus;
use crate::subscription::SubscriptionId;

/// Trait for types that support callback subscriptions.
///
/// Callbacks run on the task that produces the notification, one after
/// another. A callback that panics is logged at `warn` and skipped; it stays
/// registered and the other callbacks still run.
///
/// # Examples
///
/// ```no_run
/// use parcelbox::{DeviceController, Subscribable};
///
/// # async fn example() {
/// let controller = DeviceController::new();
///
/// let sub_id = controller.on_refreshed(|status| {
///     println!("box {} / package {}", status.box_state(), status.package_state());
/// });
///
/// controller.connect("192.168.1.40", "5000").await;
///
/// // Later, unsubscribe
/// controller.unsubscribe(sub_id);
/// # }
/// ```
pub trait Subscribable {
    /// Subscribes to refresh notifications.
    ///
    /// Called exactly once per refresh with the updated status.
    fn on_refreshed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceStatus) + Send + Sync + 'static;

    /// Subscribes to connection events.
    ///
    /// The callback receives the status after the initial refresh.
    fn on_connected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceStatus) + Send + Sync + 'static;

    /// Subscribes to disconnection events.
    fn on_disconnected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static;

    /// Unsubscribes a callback by its subscription ID.
    ///
    /// Returns `true` if the subscription was found and removed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
