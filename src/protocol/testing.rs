// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory transports for unit tests.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::task::JoinHandle;

use crate::protocol::{Connector, Transport};
use crate::types::Endpoint;

// An in-memory pipe has no link state of its own; a dropped peer shows up
// as failing I/O only.
impl Transport for DuplexStream {
    fn is_established(&self) -> bool {
        true
    }
}

/// Connector handing out pre-built in-memory streams.
#[derive(Debug, Default)]
pub(crate) struct DuplexConnector {
    streams: Mutex<Vec<DuplexStream>>,
    connects: AtomicUsize,
}

impl DuplexConnector {
    /// Returns a connector holding one stream, and the device side of it.
    pub(crate) fn pair() -> (Self, DuplexStream) {
        let (client, device) = tokio::io::duplex(64);
        let connector = Self::default();
        connector.streams.lock().push(client);
        (connector, device)
    }

    /// Number of connect attempts so far.
    pub(crate) fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl Connector for DuplexConnector {
    type Stream = DuplexStream;

    async fn connect(&self, _endpoint: &Endpoint) -> io::Result<DuplexStream> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.streams
            .lock()
            .pop()
            .ok_or_else(|| io::Error::new(io::ErrorKind::ConnectionRefused, "refused"))
    }
}

/// Scripted box answering command frames on the device side of a stream.
///
/// Replies default to an acknowledged probe, a closed door and an empty box.
/// Unlock frames are recorded but never answered.
#[derive(Debug, Clone)]
pub(crate) struct FakeBox {
    replies: Arc<Mutex<HashMap<char, Vec<u8>>>>,
    received: Arc<Mutex<Vec<char>>>,
}

impl FakeBox {
    pub(crate) fn new() -> Self {
        let replies = HashMap::from([
            ('c', b"ACK\n".to_vec()),
            ('s', b"CLS\n".to_vec()),
            ('p', b"NO \n".to_vec()),
        ]);
        Self {
            replies: Arc::new(Mutex::new(replies)),
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Replaces the reply sent for `letter`.
    pub(crate) fn set_reply(&self, letter: char, reply: &[u8]) {
        self.replies.lock().insert(letter, reply.to_vec());
    }

    /// Command letters received so far, in order.
    pub(crate) fn received(&self) -> Vec<char> {
        self.received.lock().clone()
    }

    /// Number of frames received for `letter`.
    pub(crate) fn count(&self, letter: char) -> usize {
        self.received.lock().iter().filter(|&&c| c == letter).count()
    }

    /// Serves frames until the client side goes away.
    pub(crate) fn serve(&self, mut device: DuplexStream) -> JoinHandle<()> {
        let fake = self.clone();
        tokio::spawn(async move {
            let mut frame = [0u8; 2];
            while device.read_exact(&mut frame).await.is_ok() {
                let letter = char::from(frame[0]);
                fake.received.lock().push(letter);
                if letter == 'u' {
                    continue;
                }
                let reply = fake.replies.lock().get(&letter).cloned();
                if let Some(reply) = reply
                    && device.write_all(&reply).await.is_err()
                {
                    break;
                }
            }
        })
    }
}
