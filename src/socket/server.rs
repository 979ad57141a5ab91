// socket-toolbox: Binary Message Socket Toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! TCP server.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{Instrument, debug, info, info_span, warn};

use super::{EventSink, Outgoing, ServerOptions, SocketEvent, parse_addr, read_loop, write_loop};
use crate::error::{SocketError, ToolboxResult};
use crate::msg::{Message, MessageFormat};

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:0";
const ROLE: &str = "server";

type PeerTable = Arc<Mutex<HashMap<SocketAddr, mpsc::UnboundedSender<Outgoing>>>>;

fn lock(peers: &PeerTable) -> MutexGuard<'_, HashMap<SocketAddr, mpsc::UnboundedSender<Outgoing>>> {
    peers.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Accepts any number of clients and exchanges messages with each of them.
pub struct Server {
    fmt: MessageFormat,
    options: ServerOptions,
    listen_addr: Option<SocketAddr>,
    peers: PeerTable,
    cancel_token: CancellationToken,
    tracker: TaskTracker,
    events: EventSink,
    events_rx: flume::Receiver<SocketEvent>,
}

impl Server {
    #[must_use]
    pub fn new(fmt: MessageFormat, options: ServerOptions) -> Self {
        let (events, events_rx) = EventSink::new(options.event_capacity());
        Self {
            fmt,
            options,
            listen_addr: None,
            peers: PeerTable::default(),
            cancel_token: CancellationToken::new(),
            tracker: TaskTracker::new(),
            events,
            events_rx,
        }
    }

    /// Address the server is listening on, while running.
    #[must_use]
    pub const fn listen_addr(&self) -> Option<SocketAddr> {
        self.listen_addr
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.listen_addr.is_some()
    }

    /// Number of connected clients.
    #[must_use]
    pub fn client_len(&self) -> usize {
        lock(&self.peers).len()
    }

    /// Connected client addresses, sorted.
    #[must_use]
    pub fn clients(&self) -> Vec<SocketAddr> {
        let mut clients: Vec<_> = lock(&self.peers).keys().copied().collect();
        clients.sort_unstable();
        clients
    }

    /// Receiver for connection events. Every clone shares one queue.
    #[must_use]
    pub fn events(&self) -> flume::Receiver<SocketEvent> {
        self.events_rx.clone()
    }

    #[must_use]
    pub const fn format(&self) -> &MessageFormat {
        &self.fmt
    }

    /// Binds `listen_addr` (default `127.0.0.1:0`) and starts accepting.
    ///
    /// Returns the bound address. Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is already running, the address is
    /// invalid, or binding fails.
    pub fn run(&mut self, listen_addr: Option<&str>) -> ToolboxResult<SocketAddr> {
        if self.is_running() {
            return Err(SocketError::AlreadyRunning { role: ROLE }.into());
        }

        let requested = listen_addr
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_LISTEN_ADDR);
        let addr = parse_addr(requested)?;
        let bind_err = |source: std::io::Error| SocketError::Bind {
            addr: requested.to_string(),
            source,
        };

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(bind_err)?;
        #[cfg(unix)]
        socket.set_reuseaddr(true).map_err(bind_err)?;
        socket.bind(addr).map_err(bind_err)?;
        let listener = socket.listen(self.options.backlog()).map_err(bind_err)?;
        let local_addr = listener.local_addr().map_err(bind_err)?;

        info!(listen = %local_addr, "server started");

        self.cancel_token = CancellationToken::new();
        self.tracker = TaskTracker::new();
        self.listen_addr = Some(local_addr);

        let acceptor = Acceptor {
            fmt: self.fmt.clone(),
            peers: Arc::clone(&self.peers),
            cancel_token: self.cancel_token.clone(),
            tracker: self.tracker.clone(),
            events: self.events.clone(),
        };
        self.tracker
            .spawn(acceptor.run(listener).instrument(info_span!("server", listen = %local_addr)));

        Ok(local_addr)
    }

    /// Queues `msg` for the client at `addr`.
    ///
    /// The message is encoded before queueing so format errors surface here.
    ///
    /// # Errors
    ///
    /// Returns an error if `addr` is invalid, no such client is connected, or
    /// the message does not fit the format.
    pub fn send_msg(&self, addr: &str, msg: Message) -> ToolboxResult<()> {
        let peer = parse_addr(addr)?;
        let bytes = self.fmt.encode(&msg)?;
        let peers = lock(&self.peers);
        let no_such_client = || SocketError::NoSuchClient {
            addr: addr.to_string(),
        };
        let tx = peers.get(&peer).ok_or_else(no_such_client)?;
        tx.send(Outgoing::new(msg, bytes))
            .map_err(|_| no_such_client())?;
        Ok(())
    }

    /// Queues `msg` for every connected client. Returns how many were reached.
    ///
    /// # Errors
    ///
    /// Returns an error if the message does not fit the format.
    pub fn broadcast(&self, msg: &Message) -> ToolboxResult<usize> {
        let bytes = self.fmt.encode(msg)?;
        let peers = lock(&self.peers);
        let reached = peers
            .values()
            .filter(|tx| tx.send(Outgoing::new(msg.clone(), bytes.clone())).is_ok())
            .count();
        Ok(reached)
    }

    /// Stops accepting, closes every connection, and waits for all tasks.
    ///
    /// # Errors
    ///
    /// Returns [`SocketError::NotRunning`] if the server was not started.
    pub async fn stop(&mut self) -> ToolboxResult<()> {
        let Some(listen_addr) = self.listen_addr.take() else {
            return Err(SocketError::NotRunning { role: ROLE }.into());
        };

        self.cancel_token.cancel();
        lock(&self.peers).clear();
        self.tracker.close();
        self.tracker.wait().await;

        info!(listen = %listen_addr, "server stopped");
        Ok(())
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

/// State moved into the accept loop.
struct Acceptor {
    fmt: MessageFormat,
    peers: PeerTable,
    cancel_token: CancellationToken,
    tracker: TaskTracker,
    events: EventSink,
}

impl Acceptor {
    async fn run(self, listener: TcpListener) {
        loop {
            let accepted = tokio::select! {
                () = self.cancel_token.cancelled() => break,
                accepted = listener.accept() => accepted,
            };

            match accepted {
                Ok((stream, peer)) => self.spawn_connection(stream, peer),
                Err(e) => {
                    // Usually fd exhaustion; back off instead of spinning.
                    warn!(error = %e, "failed to accept connection");
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
        }
        debug!("accept loop finished");
    }

    fn spawn_connection(&self, stream: TcpStream, peer: SocketAddr) {
        info!(%peer, "connection established");

        let token = self.cancel_token.child_token();
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.peers).insert(peer, tx);
        self.events.emit(SocketEvent::Connected { peer });

        let (read_half, write_half) = stream.into_split();
        let span = info_span!("conn", %peer);

        let peers = Arc::clone(&self.peers);
        let events = self.events.clone();
        let reader_token = token.clone();
        let fmt = self.fmt.clone();
        self.tracker.spawn(
            async move {
                read_loop(fmt, read_half, peer, reader_token, events.clone()).await;
                lock(&peers).remove(&peer);
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
                token,
                self.events.clone(),
            )
            .instrument(span),
        );
    }
}
