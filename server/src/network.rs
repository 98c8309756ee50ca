//! Server network layer handling TCP connections and the event loop

use crate::client_manager::{ClientId, Outbound};
use crate::error::ServerError;
use crate::lobby::Lobby;
use log::{debug, error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Messages sent from connection reader tasks to the main loop
#[derive(Debug)]
pub enum NetEvent {
    Received { id: ClientId, bytes: Vec<u8> },
    Closed { id: ClientId },
}

/// Write half of a TCP connection plus the task reading its other half
///
/// Dropping it aborts the reader and closes the socket, so a client stops
/// producing events the moment the registry lets go of it.
pub struct TcpOutbound {
    writer: OwnedWriteHalf,
    reader: JoinHandle<()>,
}

impl Outbound for TcpOutbound {
    /// Single non-blocking write; a partial write counts as failure
    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        let written = self.writer.try_write(bytes)?;
        if written != bytes.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short write: {} of {} bytes", written, bytes.len()),
            ));
        }
        Ok(())
    }
}

impl Drop for TcpOutbound {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Accepts connections and feeds every network event to the lobby
///
/// All game state lives in the `Lobby` owned by this struct and is only
/// touched from [`Server::run`], so nothing needs a lock.
///
/// Events are handled in the order reader tasks deliver them, not by
/// ascending client id. No client is guaranteed a fair share of the loop.
pub struct Server {
    listener: TcpListener,
    lobby: Lobby,
    read_chunk: usize,
    events_tx: mpsc::UnboundedSender<NetEvent>,
    events_rx: mpsc::UnboundedReceiver<NetEvent>,
}

impl Server {
    pub async fn bind(addr: &str, lobby: Lobby) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);

        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener,
            read_chunk: shared::MAX_BUF,
            lobby,
            events_tx,
            events_rx,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn lobby(&self) -> &Lobby {
        &self.lobby
    }

    /// Main loop; runs until the process is stopped
    pub async fn run(mut self) -> Result<(), ServerError> {
        info!("Server started successfully");

        loop {
            tokio::select! {
                // New connections are taken before pending input
                biased;

                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => self.accept(stream, addr).await,
                        Err(e) => {
                            error!("Failed to accept connection: {}", e);
                            tokio::time::sleep(Duration::from_millis(10)).await;
                        }
                    }
                },

                Some(event) = self.events_rx.recv() => {
                    self.dispatch(event);
                },
            }
        }
    }

    /// Registers a new connection once its socket is ready for the welcome
    ///
    /// Writes go out through `try_write`, which only succeeds after tokio
    /// has seen the socket become writable.
    async fn accept(&mut self, stream: TcpStream, addr: SocketAddr) {
        info!("A new client is connecting from {}", addr);

        if let Err(e) = stream.writable().await {
            warn!("Client {} never became writable: {}", addr, e);
            return;
        }

        let (read_half, write_half) = stream.into_split();
        let (id_tx, id_rx) = oneshot::channel();
        let reader = tokio::spawn(read_loop(
            read_half,
            id_rx,
            self.events_tx.clone(),
            self.read_chunk,
        ));

        let outbound = TcpOutbound {
            writer: write_half,
            reader,
        };

        match self.lobby.connect(addr, Box::new(outbound)) {
            Some(id) => {
                // The reader only starts once it knows which client it serves
                let _ = id_tx.send(id);
            }
            None => debug!("Dropped {} before it could pick a name", addr),
        }
    }

    fn dispatch(&mut self, event: NetEvent) {
        match event {
            NetEvent::Received { id, bytes } => self.lobby.receive(id, &bytes),
            NetEvent::Closed { id } => self.lobby.closed(id),
        }
    }
}

/// Forwards everything read from one connection to the main loop
///
/// End-of-stream and read errors both end in a single `Closed` event.
async fn read_loop(
    mut reader: OwnedReadHalf,
    id_rx: oneshot::Receiver<ClientId>,
    events: mpsc::UnboundedSender<NetEvent>,
    chunk: usize,
) {
    let Ok(id) = id_rx.await else {
        return;
    };
    let mut buffer = vec![0u8; chunk];

    loop {
        match reader.read(&mut buffer).await {
            Ok(0) => {
                debug!("[{}] Connection closed by peer", id);
                let _ = events.send(NetEvent::Closed { id });
                break;
            }
            Ok(len) => {
                let bytes = buffer[..len].to_vec();
                if events.send(NetEvent::Received { id, bytes }).is_err() {
                    break;
                }
            }
            Err(e) => {
                debug!("[{}] Read failed: {}", id, e);
                let _ = events.send(NetEvent::Closed { id });
                break;
            }
        }
    }
}
