// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types used by the box protocol.
//!
//! - [`Endpoint`]: validated IPv4 address and port
//! - [`ConnectionState`], [`BoxState`], [`PackageState`]: status fields
//!   derived from device replies

mod endpoint;
mod status;

pub use endpoint::Endpoint;
pub use status::{BoxState, ConnectionState, PackageState};
