// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device controller.
//!
//! [`DeviceController`] sits on top of a
//! [`ProtocolConnection`](crate::protocol::ProtocolConnection). It translates
//! raw replies into a [`DeviceStatus`](crate::state::DeviceStatus), polls the
//! box on a fixed interval while connected and notifies observers through
//! events and callbacks.

mod config;
mod device_controller;
mod worker;

pub use config::ControllerConfig;
pub use device_controller::DeviceController;
