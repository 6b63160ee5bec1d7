// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for controller notifications.
//!
//! The [`EventBus`] uses tokio's broadcast channel so any number of
//! observers can follow connection changes and refresh cycles.
//!
//! # Examples
//!
//! ```
//! use parcelbox::event::{DeviceEvent, EventBus};
//! use parcelbox::state::DeviceStatus;
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(DeviceEvent::refreshed(DeviceStatus::new()));
//! assert!(rx.try_recv().unwrap().is_refresh());
//! ```

mod device_event;
mod event_bus;

pub use device_event::DeviceEvent;
pub use event_bus::EventBus;
