//! Connection registry for the word game server
//!
//! This module tracks every open connection from accept to disconnect:
//! - Pending connections that have not picked a display name yet
//! - Active players, kept in join order for turn rotation
//! - Per-connection line buffers and outbound transport handles
//!
//! Membership is a single tag per client, so a connection can never be
//! pending and active at the same time. Dropping a [`Client`] releases its
//! transport.

use crate::error::RegistryError;
use crate::framer::LineBuffer;
use log::{info, warn};
use shared::MAX_BUF;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::net::SocketAddr;

/// Server-assigned connection identifier
pub type ClientId = u32;

/// Which of the two registry sets a connection belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// Connected but still choosing a name
    Pending,
    /// Named player taking part in the game
    Active,
}

/// Write side of a connection's transport
///
/// A write is attempted exactly once. Anything short of writing every byte
/// must be reported as an error; the caller then disconnects the client.
pub trait Outbound: Send {
    fn send(&mut self, bytes: &[u8]) -> io::Result<()>;
}

/// A connected client and its per-connection state
pub struct Client {
    /// Unique identifier assigned by the registry
    pub id: ClientId,
    /// Remote address, used for logging
    pub addr: SocketAddr,
    /// Display name; empty while pending
    pub name: String,
    pub membership: Membership,
    /// Partial input waiting for a line terminator
    pub inbox: LineBuffer,
    outbound: Box<dyn Outbound>,
}

impl Client {
    fn new(id: ClientId, addr: SocketAddr, capacity: usize, outbound: Box<dyn Outbound>) -> Self {
        Self {
            id,
            addr,
            name: String::new(),
            membership: Membership::Pending,
            inbox: LineBuffer::new(capacity),
            outbound,
        }
    }

    /// Writes raw bytes to the client's transport
    pub fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.outbound.send(bytes)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.id)
            .field("addr", &self.addr)
            .field("name", &self.name)
            .field("membership", &self.membership)
            .field("buffered", &self.inbox.len())
            .finish()
    }
}

/// Owns all connections and the join order of active players
pub struct ClientManager {
    /// Every registered client indexed by ID
    clients: HashMap<ClientId, Client>,
    /// Active client IDs in the order they joined the game
    active_order: Vec<ClientId>,
    /// Next ID handed out by `register`
    next_client_id: ClientId,
    /// Line buffer size for new connections
    buffer_capacity: usize,
}

impl ClientManager {
    /// Creates an empty registry whose clients buffer at most `buffer_capacity` bytes
    /// A zero `buffer_capacity` falls back to [`MAX_BUF`]
    pub fn new(buffer_capacity: usize) -> Self {
        let buffer_capacity = if buffer_capacity == 0 {
            warn!("Line buffer capacity of 0 requested, using {}", MAX_BUF);
            MAX_BUF
        } else {
            buffer_capacity
        };
        Self {
            clients: HashMap::new(),
            active_order: Vec::new(),
            next_client_id: 1,
            buffer_capacity,
        }
    }

    /// Registers a freshly accepted connection as pending and returns its ID
    pub fn register(&mut self, addr: SocketAddr, outbound: Box<dyn Outbound>) -> ClientId {
        let id = self.next_client_id;
        self.next_client_id += 1;

        info!("Adding client {} from {}", id, addr);
        let client = Client::new(id, addr, self.buffer_capacity, outbound);
        self.clients.insert(id, client);
        id
    }

    /// Moves a pending client into the game under `name`
    ///
    /// The client is appended to the active order, so turns rotate in join
    /// order. Name validation is the caller's job.
    pub fn promote(&mut self, id: ClientId, name: &str) -> Result<(), RegistryError> {
        let client = self
            .clients
            .get_mut(&id)
            .ok_or(RegistryError::UnknownClient(id))?;

        if client.membership != Membership::Pending {
            return Err(RegistryError::WrongMembership {
                id,
                expected: Membership::Pending,
                actual: client.membership,
            });
        }

        client.name = name.to_string();
        client.membership = Membership::Active;
        self.active_order.push(id);
        Ok(())
    }

    /// Detaches a client from `from` and hands it back to the caller
    ///
    /// Dropping the returned client closes its transport. Asking for a client
    /// that is unknown, or that lives in the other set, leaves the registry
    /// untouched and reports the mismatch.
    pub fn remove(&mut self, id: ClientId, from: Membership) -> Result<Client, RegistryError> {
        let actual = self
            .membership(id)
            .ok_or(RegistryError::UnknownClient(id))?;

        if actual != from {
            return Err(RegistryError::WrongMembership {
                id,
                expected: from,
                actual,
            });
        }

        if from == Membership::Active {
            self.active_order.retain(|&active| active != id);
        }

        let client = self
            .clients
            .remove(&id)
            .ok_or(RegistryError::UnknownClient(id))?;
        info!("Removing client {} {}", id, client.addr);
        Ok(client)
    }

    pub fn get(&self, id: ClientId) -> Option<&Client> {
        self.clients.get(&id)
    }

    pub fn get_mut(&mut self, id: ClientId) -> Option<&mut Client> {
        self.clients.get_mut(&id)
    }

    pub fn membership(&self, id: ClientId) -> Option<Membership> {
        self.clients.get(&id).map(|client| client.membership)
    }

    /// Display name of an active client
    pub fn name(&self, id: ClientId) -> Option<&str> {
        self.clients
            .get(&id)
            .filter(|client| client.membership == Membership::Active)
            .map(|client| client.name.as_str())
    }

    /// Whether an active client already uses `name`
    pub fn name_taken(&self, name: &str) -> bool {
        self.active_order
            .iter()
            .filter_map(|id| self.clients.get(id))
            .any(|client| client.name == name)
    }

    /// Snapshot of active client IDs in join order
    pub fn active_ids(&self) -> Vec<ClientId> {
        self.active_order.clone()
    }

    /// The active client after `id` in join order, wrapping around
    ///
    /// Returns `id` itself when it is the only active client and `None` when
    /// `id` is not active.
    pub fn next_active_after(&self, id: ClientId) -> Option<ClientId> {
        let pos = self.active_order.iter().position(|&active| active == id)?;
        let next = (pos + 1) % self.active_order.len();
        Some(self.active_order[next])
    }

    /// Total number of registered clients, pending and active
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn active_len(&self) -> usize {
        self.active_order.len()
    }

    pub fn pending_len(&self) -> usize {
        self.clients.len() - self.active_order.len()
    }
}
