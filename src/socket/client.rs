// socket-toolbox: Binary Message Socket Toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! TCP client.

use std::net::SocketAddr;

use tokio::net::TcpSocket;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{Instrument, info, info_span};

use super::{ClientOptions, EventSink, Outgoing, SocketEvent, parse_addr, read_loop, write_loop};
use crate::error::{SocketError, ToolboxResult};
use crate::msg::{Message, MessageFormat};

const ROLE: &str = "client";

/// A single connection to a server.
pub struct Client {
    fmt: MessageFormat,
    options: ClientOptions,
    bind_addr: Option<SocketAddr>,
    peer_addr: Option<SocketAddr>,
    tx: Option<mpsc::UnboundedSender<Outgoing>>,
    cancel_token: CancellationToken,
    tracker: TaskTracker,
    events: EventSink,
    events_rx: flume::Receiver<SocketEvent>,
}

impl Client {
    #[must_use]
    pub fn new(fmt: MessageFormat, options: ClientOptions) -> Self {
        let (events, events_rx) = EventSink::new(options.event_capacity());
        Self {
            fmt,
            options,
            bind_addr: None,
            peer_addr: None,
            tx: None,
            cancel_token: CancellationToken::new(),
            tracker: TaskTracker::new(),
            events,
            events_rx,
        }
    }

    /// Local address of the connection, while running.
    #[must_use]
    pub const fn bind_addr(&self) -> Option<SocketAddr> {
        self.bind_addr
    }

    /// Server address, while running.
    #[must_use]
    pub const fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    /// Whether the connection is still open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.tx.is_some() && !self.cancel_token.is_cancelled()
    }

    /// Receiver for connection events.
    #[must_use]
    pub fn events(&self) -> flume::Receiver<SocketEvent> {
        self.events_rx.clone()
    }

    #[must_use]
    pub const fn format(&self) -> &MessageFormat {
        &self.fmt
    }

    /// Connects to `connect_addr`, optionally from `bind_addr`.
    ///
    /// Returns the local address. Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is already running, an address is
    /// invalid, binding fails, or the connection fails or times out.
    pub async fn run(
        &mut self,
        bind_addr: Option<&str>,
        connect_addr: &str,
    ) -> ToolboxResult<SocketAddr> {
        if self.tx.is_some() {
            return Err(SocketError::AlreadyRunning { role: ROLE }.into());
        }

        let peer = parse_addr(connect_addr)?;
        let socket = if peer.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(|source| SocketError::Connect {
            addr: connect_addr.to_string(),
            source,
        })?;

        if let Some(bind_addr) = bind_addr.filter(|s| !s.trim().is_empty()) {
            let local = parse_addr(bind_addr)?;
            socket.bind(local).map_err(|source| SocketError::Bind {
                addr: bind_addr.to_string(),
                source,
            })?;
        }

        let timeout = self.options.connect_timeout();
        let stream = match tokio::time::timeout(timeout, socket.connect(peer)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                return Err(SocketError::Connect {
                    addr: connect_addr.to_string(),
                    source,
                }
                .into());
            }
            Err(_) => {
                return Err(SocketError::ConnectTimeout {
                    addr: connect_addr.to_string(),
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                }
                .into());
            }
        };
        let local_addr = stream.local_addr()?;

        info!(bind = %local_addr, connect = %peer, "client started");

        self.cancel_token = CancellationToken::new();
        self.tracker = TaskTracker::new();
        let (tx, rx) = mpsc::unbounded_channel();
        self.tx = Some(tx);
        self.bind_addr = Some(local_addr);
        self.peer_addr = Some(peer);
        self.events.emit(SocketEvent::Connected { peer });

        let (read_half, write_half) = stream.into_split();
        let span = info_span!("conn", %peer);

        let fmt = self.fmt.clone();
        let token = self.cancel_token.clone();
        let events = self.events.clone();
        self.tracker.spawn(
            async move {
                read_loop(fmt, read_half, peer, token, events.clone()).await;
                info!("connection closed");
                events.emit(SocketEvent::Disconnected { peer });
            }
            .instrument(span.clone()),
        );

        self.tracker.spawn(
            write_loop(
                self.fmt.clone(),
                write_half,
                rx,
                peer,
                self.cancel_token.clone(),
                self.events.clone(),
            )
            .instrument(span),
        );

        Ok(local_addr)
    }

    /// Queues `msg` for the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is not connected or the message does not
    /// fit the format.
    pub fn send_msg(&self, msg: Message) -> ToolboxResult<()> {
        let tx = self
            .tx
            .as_ref()
            .filter(|_| !self.cancel_token.is_cancelled())
            .ok_or(SocketError::NotConnected)?;
        let bytes = self.fmt.encode(&msg)?;
        tx.send(Outgoing::new(msg, bytes))
            .map_err(|_| SocketError::NotConnected)?;
        Ok(())
    }

    /// Closes the connection and waits for its tasks.
    ///
    /// # Errors
    ///
    /// Returns [`SocketError::NotRunning`] if the client was not started.
    pub async fn stop(&mut self) -> ToolboxResult<()> {
        if self.tx.take().is_none() {
            return Err(SocketError::NotRunning { role: ROLE }.into());
        }

        self.cancel_token.cancel();
        self.tracker.close();
        self.tracker.wait().await;

        info!(
            bind = ?self.bind_addr.take(),
            connect = ?self.peer_addr.take(),
            "client stopped"
        );
        Ok(())
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}
