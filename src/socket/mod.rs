// socket-toolbox: Binary Message Socket Toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! TCP server and client exchanging framed messages.
//!
//! ```text
//!                 Server::run(listen)
//!                        |
//!                  accept loop ------------------+
//!                        |                       |
//!             per connection (conn span)         |  CancellationToken
//!              reader task     writer task       |  (child per connection)
//!              MessageDecoder  mpsc<Outgoing>    |
//!                   |              ^             |
//!                   v              |             |
//!               SocketEvent    send_msg() / broadcast()
//!              (flume, bounded)
//!
//!                 Client::run(bind, connect)
//!              reader task     writer task
//!
//! stop(): cancel token --> TaskTracker::wait() --> peers cleared
//! ```

pub mod client;
pub mod server;


use std::net::SocketAddr;
use std::time::Duration;

use bon::Builder;
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::error::SocketError;
use crate::msg::{Message, MessageDecoder, MessageEncoder, MessageFormat};

pub use client::Client;
pub use server::Server;

/// Something that happened on a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// A connection was established.
    Connected { peer: SocketAddr },
    /// A whole message was read.
    Received { peer: SocketAddr, msg: Message },
    /// A message was written.
    Sent { peer: SocketAddr, msg: Message },
    /// A message could not be decoded but the stream is still in sync.
    ReadFailed { peer: SocketAddr, error: String },
    /// The connection is gone.
    Disconnected { peer: SocketAddr },
}

/// Options for [`Server`].
#[derive(Debug, Clone, Builder)]
pub struct ServerOptions {
    #[builder(setters(name = with_backlog), default = 1024)]
    backlog: u32,
    #[builder(setters(name = with_event_capacity), default = 1024)]
    event_capacity: usize,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ServerOptions {
    #[must_use]
    pub const fn backlog(&self) -> u32 {
        self.backlog
    }

    #[must_use]
    pub const fn event_capacity(&self) -> usize {
        self.event_capacity
    }
}

/// Options for [`Client`].
#[derive(Debug, Clone, Builder)]
pub struct ClientOptions {
    #[builder(setters(name = with_connect_timeout), default = Duration::from_secs(5))]
    connect_timeout: Duration,
    #[builder(setters(name = with_event_capacity), default = 1024)]
    event_capacity: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ClientOptions {
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    #[must_use]
    pub const fn event_capacity(&self) -> usize {
        self.event_capacity
    }
}

/// Parses a socket address, mapping failures to [`SocketError::AddrParse`].
///
/// # Errors
///
/// Returns [`SocketError::AddrParse`] if `addr` is not `ip:port`.
pub fn parse_addr(addr: &str) -> Result<SocketAddr, SocketError> {
    addr.trim().parse().map_err(|_| SocketError::AddrParse {
        invalid_addr: addr.to_string(),
    })
}

/// A message queued for a writer task, already encoded.
#[derive(Debug)]
pub(crate) struct Outgoing {
    msg: Message,
    bytes: Vec<u8>,
}

impl Outgoing {
    pub(crate) const fn new(msg: Message, bytes: Vec<u8>) -> Self {
        Self { msg, bytes }
    }
}

/// Sending half of the event channel. Never blocks socket I/O.
#[derive(Debug, Clone)]
pub(crate) struct EventSink {
    tx: flume::Sender<SocketEvent>,
}

impl EventSink {
    pub(crate) fn new(capacity: usize) -> (Self, flume::Receiver<SocketEvent>) {
        let (tx, rx) = flume::bounded(capacity.max(1));
        (Self { tx }, rx)
    }

    pub(crate) fn emit(&self, event: SocketEvent) {
        if let Err(e) = self.tx.try_send(event) {
            trace!(event = ?e.into_inner(), "event channel full, dropping event");
        }
    }
}

/// Reads messages until the stream ends, a fatal error occurs, or `token` is
/// cancelled. Cancels `token` on exit so the paired writer stops too.
pub(crate) async fn read_loop<R>(
    fmt: MessageFormat,
    mut reader: R,
    peer: SocketAddr,
    token: CancellationToken,
    events: EventSink,
) where
    R: AsyncRead + Unpin,
{
    let mut decoder = MessageDecoder::new(&fmt, &mut reader);
    loop {
        let result = tokio::select! {
            () = token.cancelled() => break,
            result = decoder.decode() => result,
        };

        match result {
            Ok(msg) => {
                tracing::info!(%peer, %msg, "received");
                events.emit(SocketEvent::Received { peer, msg });
            }
            Err(e) if e.is_fatal() => {
                debug!(%peer, error = %e, "read loop finished");
                break;
            }
            Err(e) => {
                warn!(%peer, error = %e, "failed to decode message");
                events.emit(SocketEvent::ReadFailed {
                    peer,
                    error: e.to_string(),
                });
            }
        }
    }
    token.cancel();
}

/// Writes queued messages until the queue closes, a write fails, or `token`
/// is cancelled. Cancels `token` on exit so the paired reader stops too.
pub(crate) async fn write_loop<W>(
    fmt: MessageFormat,
    mut writer: W,
    mut rx: mpsc::UnboundedReceiver<Outgoing>,
    peer: SocketAddr,
    token: CancellationToken,
    events: EventSink,
) where
    W: tokio::io::AsyncWrite + Unpin,
{
    let mut encoder = MessageEncoder::new(&fmt, &mut writer);
    loop {
        let outgoing = tokio::select! {
            () = token.cancelled() => break,
            outgoing = rx.recv() => match outgoing {
                Some(outgoing) => outgoing,
                None => break,
            },
        };

        if let Err(e) = encoder.write_encoded(&outgoing.bytes).await {
            warn!(%peer, error = %e, "failed to write message");
            break;
        }
        tracing::info!(%peer, msg = %outgoing.msg, "sent");
        events.emit(SocketEvent::Sent {
            peer,
            msg: outgoing.msg,
        });
    }
    token.cancel();
}
