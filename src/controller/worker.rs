// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Worker task owning the connection and the status.
//!
//! Every socket operation runs here, one at a time: requests from
//! controller handles arrive over an `mpsc` queue and poll ticks are
//! selected on in the same loop, so a poll cycle can never interleave with a
//! command on the wire.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::command::Command;
use crate::error::{CommandError, EndpointError, ProtocolError};
use crate::event::{DeviceEvent, EventBus};
use crate::protocol::{Connector, ProtocolConnection};
use crate::state::DeviceStatus;
use crate::subscription::CallbackRegistry;
use crate::types::{BoxState, ConnectionState, Endpoint, PackageState};

/// A request submitted by a controller handle.
pub(crate) enum Request {
    Connect {
        endpoint: Result<Endpoint, EndpointError>,
        reply: oneshot::Sender<bool>,
    },
    Close {
        reply: oneshot::Sender<()>,
    },
    Unlock {
        reply: oneshot::Sender<()>,
    },
    Refresh {
        check_package: bool,
        reply: oneshot::Sender<()>,
    },
    QueryConnection {
        reply: oneshot::Sender<bool>,
    },
    QueryBoxState {
        reply: oneshot::Sender<BoxState>,
    },
    QueryPackageState {
        reply: oneshot::Sender<PackageState>,
    },
}

enum Step {
    Request(Request),
    Poll,
}

pub(crate) struct Worker<C: Connector> {
    connection: ProtocolConnection<C>,
    status: DeviceStatus,
    status_tx: watch::Sender<DeviceStatus>,
    events: EventBus,
    callbacks: Arc<CallbackRegistry>,
    poll_interval: Duration,
    poll: Option<Interval>,
}

impl<C: Connector> Worker<C> {
    pub(crate) fn new(
        connection: ProtocolConnection<C>,
        status_tx: watch::Sender<DeviceStatus>,
        events: EventBus,
        callbacks: Arc<CallbackRegistry>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            connection,
            status: DeviceStatus::new(),
            status_tx,
            events,
            callbacks,
            poll_interval,
            poll: None,
        }
    }

    /// Serves requests until every controller handle is dropped.
    pub(crate) async fn run(mut self, mut requests: mpsc::Receiver<Request>) {
        tracing::debug!("Controller worker started");

        loop {
            let step = tokio::select! {
                request = requests.recv() => match request {
                    Some(request) => Step::Request(request),
                    None => break,
                },
                () = next_tick(self.poll.as_mut()) => Step::Poll,
            };

            match step {
                Step::Request(request) => self.handle(request).await,
                Step::Poll => {
                    tracing::debug!("Poll cycle");
                    self.refresh(true).await;
                }
            }
        }

        if self.connection.is_open()
            && let Err(e) = self.connection.close().await
        {
            tracing::debug!(error = %e, "Close on shutdown failed");
        }

        tracing::debug!("Controller worker stopped");
    }

    // Reply send errors mean the caller stopped waiting; the work is done
    // either way.
    async fn handle(&mut self, request: Request) {
        match request {
            Request::Connect { endpoint, reply } => {
                let connected = self.connect(endpoint).await;
                let _ = reply.send(connected);
            }
            Request::Close { reply } => {
                self.close().await;
                let _ = reply.send(());
            }
            Request::Unlock { reply } => {
                self.unlock().await;
                let _ = reply.send(());
            }
            Request::Refresh {
                check_package,
                reply,
            } => {
                self.refresh(check_package).await;
                let _ = reply.send(());
            }
            Request::QueryConnection { reply } => {
                let connected = self.query_connection_state();
                self.store();
                let _ = reply.send(connected);
            }
            Request::QueryBoxState { reply } => {
                let state = self.query_box_state().await;
                self.store();
                let _ = reply.send(state);
            }
            Request::QueryPackageState { reply } => {
                let state = self.query_package_state().await;
                self.store();
                let _ = reply.send(state);
            }
        }
    }

    async fn connect(&mut self, endpoint: Result<Endpoint, EndpointError>) -> bool {
        if self.connection.is_connected() {
            tracing::debug!("Connect requested while already connected");
            return false;
        }

        let opened = match endpoint {
            Ok(endpoint) => self.open(endpoint).await,
            Err(e) => Err(ProtocolError::from(e)),
        };

        if let Err(e) = opened {
            tracing::warn!(error = %e, "Could not connect to box");
            self.events.publish(DeviceEvent::connect_failed(e.to_string()));
            if self.status.connection() != ConnectionState::Disconnected {
                self.status.set_connection(ConnectionState::Disconnected);
                self.store();
            }
            return false;
        }

        self.refresh(true).await;
        self.start_polling();

        if let Some(endpoint) = self.connection.endpoint() {
            self.events.publish(DeviceEvent::connected(endpoint, self.status.clone()));
        }
        self.callbacks.dispatch_connected(&self.status);
        true
    }

    /// Opens the connection, discarding a stream the transport no longer
    /// reports as established.
    async fn open(&mut self, endpoint: Endpoint) -> Result<(), ProtocolError> {
        if self.connection.is_open() {
            tracing::info!("Discarding stale connection before reconnecting");
            self.poll = None;
            self.connection.close().await?;
        }
        self.connection.open_endpoint(endpoint).await
    }

    async fn close(&mut self) {
        if !self.connection.is_open() {
            tracing::debug!("Close requested without an open connection");
            return;
        }

        self.poll = None;
        if let Err(e) = self.connection.close().await {
            tracing::warn!(error = %e, "Close failed");
        }

        self.status.set_connection(ConnectionState::Disconnected);
        self.store();
        self.events.publish(DeviceEvent::Disconnected);
        self.callbacks.dispatch_disconnected();
    }

    async fn unlock(&mut self) {
        tracing::info!("Unlocking box");
        // Always reports `Sent`; delivery shows up in the lock state only.
        let _ = self.connection.execute(Command::Unlock).await;
        self.refresh(false).await;
    }

    async fn refresh(&mut self, check_package: bool) {
        self.query_connection_state();
        self.query_box_state().await;
        if check_package {
            self.query_package_state().await;
        }

        self.status.mark_refreshed();
        tracing::debug!(
            connection = %self.status.connection(),
            box_state = %self.status.box_state(),
            package_state = %self.status.package_state(),
            check_package,
            "Status refreshed"
        );

        self.store();
        self.events.publish(DeviceEvent::refreshed(self.status.clone()));
        self.callbacks.dispatch_refreshed(&self.status);
    }

    fn query_connection_state(&mut self) -> bool {
        let connected = self.connection.is_connected();
        self.status.set_connection(connected.into());
        connected
    }

    async fn query_box_state(&mut self) -> BoxState {
        let state = match self.connection.execute(Command::BoxState).await {
            Ok(response) => BoxState::from_reply(response.payload().unwrap_or_default()),
            Err(_) => BoxState::Unknown(CommandError::SENTINEL.to_string()),
        };
        self.status.set_box_state(state.clone());
        state
    }

    async fn query_package_state(&mut self) -> PackageState {
        let state = match self.connection.execute(Command::PackageState).await {
            Ok(response) => PackageState::from_reply(response.payload().unwrap_or_default()),
            Err(_) => PackageState::Unknown(CommandError::SENTINEL.to_string()),
        };
        self.status.set_package_state(state.clone());
        state
    }

    fn start_polling(&mut self) {
        let period = self.poll_interval;
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.poll = Some(interval);
        tracing::debug!(period_ms = %period.as_millis(), "Polling started");
    }

    /// Publishes the current status to watchers.
    fn store(&self) {
        self.status_tx.send_replace(self.status.clone());
    }
}

async fn next_tick(poll: Option<&mut Interval>) {
    match poll {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
