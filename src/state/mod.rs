// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device status tracking.
//!
//! [`DeviceStatus`] is the snapshot a controller publishes to observers after
//! each refresh.

mod device_status;

pub use device_status::DeviceStatus;
