// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Controller handle for a single delivery box.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot, watch};

use crate::error::{EndpointError, ProtocolError};
use crate::event::{DeviceEvent, EventBus};
use crate::protocol::{Connector, ProtocolConnection, TcpConnector};
use crate::state::DeviceStatus;
use crate::subscription::{CallbackRegistry, Subscribable, SubscriptionId};
use crate::types::{BoxState, ConnectionState, Endpoint, PackageState};

use super::config::ControllerConfig;
use super::worker::{Request, Worker};

/// Capacity of the request queue between handles and the worker.
const REQUEST_QUEUE_CAPACITY: usize = 32;

/// Controller for one delivery box.
///
/// The controller turns raw protocol replies into a [`DeviceStatus`], polls
/// the box once per [`poll interval`](ControllerConfig::poll_interval) while
/// connected and notifies observers after every refresh.
///
/// # Ownership
///
/// Creating a controller spawns a worker task that exclusively owns the
/// connection. The controller itself is a cheap handle: clone it to hand it
/// to collaborators. All clones talk to the same box, and their commands
/// are executed one after another. The worker stops and the connection is
/// dropped when the last handle is dropped.
///
/// # Failure handling
///
/// Connect failures are logged and reported as `false`. Command failures
/// never surface as errors: they are folded into the status fields as the
/// text `"error"`, next to any unexpected reply text, so observers always
/// have something to show.
///
/// # Examples
///
/// ```no_run
/// use parcelbox::DeviceController;
///
/// #[tokio::main]
/// async fn main() {
///     let controller = DeviceController::new();
///     let mut events = controller.subscribe();
///
///     if !controller.connect("192.168.1.40", "5000").await {
///         eprintln!("box unreachable");
///         return;
///     }
///
///     controller.unlock().await;
///     println!("door is now {}", controller.box_state());
///
///     while let Ok(event) = events.recv().await {
///         if let Some(status) = event.status() {
///             println!("package: {}", status.package_state());
///         }
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DeviceController {
    requests: mpsc::Sender<Request>,
    status_rx: watch::Receiver<DeviceStatus>,
    events: EventBus,
    callbacks: Arc<CallbackRegistry>,
}

impl DeviceController {
    /// Creates a TCP controller with the default configuration.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ControllerConfig::default())
    }

    /// Creates a TCP controller with a custom configuration.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    #[must_use]
    pub fn with_config(config: ControllerConfig) -> Self {
        let connector = TcpConnector::new(config.connect_timeout());
        Self::with_connector(config, connector)
    }

    /// Creates a controller using a custom connector.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    #[must_use]
    pub fn with_connector<C: Connector>(config: ControllerConfig, connector: C) -> Self {
        let connection = ProtocolConnection::with_connector(connector)
            .with_response_timeout(config.response_timeout());
        let (requests, requests_rx) = mpsc::channel(REQUEST_QUEUE_CAPACITY);
        let (status_tx, status_rx) = watch::channel(DeviceStatus::new());
        let events = EventBus::with_capacity(config.event_capacity());
        let callbacks = Arc::new(CallbackRegistry::new());

        let worker = Worker::new(
            connection,
            status_tx,
            events.clone(),
            Arc::clone(&callbacks),
            config.poll_interval(),
        );
        tokio::spawn(worker.run(requests_rx));

        Self {
            requests,
            status_rx,
            events,
            callbacks,
        }
    }

    // =========================================================================
    // Connection Management
    // =========================================================================

    /// Validates `address`/`port` and connects to the box.
    ///
    /// Returns `false` without side effects if already connected, and
    /// `false` after logging and publishing [`DeviceEvent::ConnectFailed`]
    /// if validation or the connect fails. On success the full status is
    /// refreshed, polling starts and [`DeviceEvent::Connected`] is
    /// published.
    pub async fn connect(&self, address: &str, port: &str) -> bool {
        self.send_connect(Endpoint::parse(address, port)).await
    }

    /// Connects to an already validated endpoint.
    ///
    /// See [`connect`](Self::connect).
    pub async fn connect_endpoint(&self, endpoint: Endpoint) -> bool {
        self.send_connect(Ok(endpoint)).await
    }

    async fn send_connect(&self, endpoint: Result<Endpoint, EndpointError>) -> bool {
        self.request(|reply| Request::Connect { endpoint, reply })
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Connect request failed");
                false
            })
    }

    /// Stops polling and closes the connection.
    ///
    /// Does nothing if no connection is open.
    pub async fn close(&self) {
        if let Err(e) = self.request(|reply| Request::Close { reply }).await {
            tracing::warn!(error = %e, "Close request failed");
        }
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Sends the unlock command and refreshes the lock state.
    ///
    /// Unlock is fire-and-forget; whatever the transport outcome, a
    /// refresh without the package query follows.
    pub async fn unlock(&self) {
        if let Err(e) = self.request(|reply| Request::Unlock { reply }).await {
            tracing::warn!(error = %e, "Unlock request failed");
        }
    }

    /// Re-evaluates the status and emits one refresh notification.
    ///
    /// The connection and box state are always queried; the package state
    /// only when `check_package` is true.
    pub async fn refresh(&self, check_package: bool) {
        if let Err(e) = self
            .request(|reply| Request::Refresh {
                check_package,
                reply,
            })
            .await
        {
            tracing::warn!(error = %e, "Refresh request failed");
        }
    }

    /// Checks connectivity and updates the connection field.
    pub async fn query_connection_state(&self) -> bool {
        self.request(|reply| Request::QueryConnection { reply })
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Connection query failed");
                self.is_connected()
            })
    }

    /// Queries the lock state and updates the box field.
    pub async fn query_box_state(&self) -> BoxState {
        self.request(|reply| Request::QueryBoxState { reply })
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Box state query failed");
                self.box_state()
            })
    }

    /// Queries package presence and updates the package field.
    pub async fn query_package_state(&self) -> PackageState {
        self.request(|reply| Request::QueryPackageState { reply })
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Package state query failed");
                self.package_state()
            })
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Request,
    ) -> Result<T, ProtocolError> {
        let (reply, reply_rx) = oneshot::channel();
        self.requests
            .send(make(reply))
            .await
            .map_err(|_| ProtocolError::ChannelClosed("controller worker stopped".to_string()))?;
        reply_rx.await.map_err(|_| {
            ProtocolError::ChannelClosed("controller worker dropped the request".to_string())
        })
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Returns a snapshot of the current status.
    #[must_use]
    pub fn status(&self) -> DeviceStatus {
        self.status_rx.borrow().clone()
    }

    /// Returns the last observed connection state.
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.status_rx.borrow().connection()
    }

    /// Returns true if the last connection check succeeded.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connection_state().is_connected()
    }

    /// Returns the last observed lock state.
    #[must_use]
    pub fn box_state(&self) -> BoxState {
        self.status_rx.borrow().box_state().clone()
    }

    /// Returns the last observed package state.
    #[must_use]
    pub fn package_state(&self) -> PackageState {
        self.status_rx.borrow().package_state().clone()
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Subscribes to controller events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.events.subscribe()
    }

    /// Returns a watch receiver that always holds the latest status.
    #[must_use]
    pub fn watch_status(&self) -> watch::Receiver<DeviceStatus> {
        self.status_rx.clone()
    }
}

impl Default for DeviceController {
    fn default() -> Self {
        Self::new()
    }
}

impl Subscribable for DeviceController {
    fn on_refreshed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceStatus) + Send + Sync + 'static,
    {
        self.callbacks.on_refreshed(callback)
    }

    fn on_connected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceStatus) + Send + Sync + 'static,
    {
        self.callbacks.on_connected(callback)
    }

    fn on_disconnected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callbacks.on_disconnected(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.callbacks.unsubscribe(id)
    }
}
