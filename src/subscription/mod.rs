// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback-based subscriptions to controller notifications.
//!
//! - [`SubscriptionId`] - identifies a subscription, used to unsubscribe
//! - [`CallbackRegistry`] - stores callbacks and dispatches notifications
//! - [`Subscribable`] - trait implemented by
//!   [`DeviceController`](crate::DeviceController)
//!
//! Callbacks are an alternative to the broadcast channel returned by
//! [`DeviceController::subscribe`](crate::DeviceController::subscribe); both
//! see the same notifications.

mod callback;
mod subscribable;

pub use callback::{CallbackRegistry, SubscriptionId};
pub use subscribable::Subscribable;
