// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `parcelbox` - A Rust library to remote-control package delivery boxes.
//!
//! A delivery box is a networked mailbox with an electronic door lock and a
//! package sensor. It listens on a TCP port and answers single-letter
//! commands with fixed-size ASCII replies.
//!
//! # Layers
//!
//! - [`ProtocolConnection`]: owns the TCP stream, frames commands and reads
//!   the 4-byte replies with bounded timeouts
//! - [`DeviceController`]: connects, polls the box while connected, keeps a
//!   [`DeviceStatus`] and notifies observers after each refresh
//!
//! # Quick Start
//!
//! ```no_run
//! use parcelbox::{BoxState, DeviceController, PackageState};
//!
//! #[tokio::main]
//! async fn main() {
//!     let controller = DeviceController::new();
//!
//!     if !controller.connect("192.168.1.40", "5000").await {
//!         eprintln!("box unreachable");
//!         return;
//!     }
//!
//!     if controller.package_state() == PackageState::Present {
//!         controller.unlock().await;
//!     }
//!
//!     if controller.box_state() == BoxState::Open {
//!         println!("door open");
//!     }
//!
//!     controller.close().await;
//! }
//! ```
//!
//! ## Callbacks
//!
//! ```no_run
//! use parcelbox::{DeviceController, Subscribable};
//!
//! # async fn example() {
//! let controller = DeviceController::new();
//!
//! controller.on_refreshed(|status| {
//!     println!(
//!         "{} / box {} / package {}",
//!         status.connection(),
//!         status.box_state(),
//!         status.package_state()
//!     );
//! });
//!
//! controller.connect("192.168.1.40", "5000").await;
//! # }
//! ```
//!
//! ## Raw protocol access
//!
//! ```no_run
//! use parcelbox::{Command, ProtocolConnection};
//!
//! # async fn example() -> parcelbox::Result<()> {
//! let mut connection = ProtocolConnection::new();
//! connection.open("192.168.1.40", "5000").await?;
//!
//! let reply = connection.execute(Command::BoxState).await?;
//! println!("raw reply: {:?}", reply.payload());
//!
//! connection.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod controller;
pub mod error;
pub mod event;
pub mod protocol;
pub mod state;
pub mod subscription;
pub mod types;

pub use command::Command;
pub use controller::{ControllerConfig, DeviceController};
pub use error::{CommandError, EndpointError, Error, ProtocolError, Result};
pub use event::{DeviceEvent, EventBus};
pub use protocol::{CommandResponse, Connector, ProtocolConnection, TcpConnector, Transport};
pub use state::DeviceStatus;
pub use subscription::{CallbackRegistry, Subscribable, SubscriptionId};
pub use types::{BoxState, ConnectionState, Endpoint, PackageState};
