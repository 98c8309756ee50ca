//! Game orchestration: name entry, guesses, broadcasts and disconnects
//!
//! The [`Lobby`] owns the connection registry, the game state and the word
//! source. The network layer feeds it three kinds of events (a new
//! connection, bytes from a connection, a connection that closed) and the
//! lobby handles each one to completion before returning.
//!
//! ## Write failures
//!
//! Every write is attempted once. A client whose write fails is queued for
//! removal and receives nothing more; the current broadcast keeps going to
//! everyone else. The queue is drained after each handler finishes, and each
//! removal may itself queue more clients if its departure notice fails.

use crate::client_manager::{ClientId, ClientManager, Membership, Outbound};
use crate::dictionary::WordSource;
use crate::game::{GameState, GuessError, GuessOutcome, RoundResult};
use log::{debug, error, info, warn};
use shared::{NameRejection, Notice, MAX_BUF, MAX_GUESSES, MAX_NAME};
use std::collections::VecDeque;
use std::net::SocketAddr;

/// Tunables for a lobby
#[derive(Debug, Clone)]
pub struct LobbyConfig {
    /// Misses allowed per round
    pub max_guesses: u32,
    /// Longest accepted display name, in bytes
    pub max_name_len: usize,
    /// Per-connection line buffer size
    pub buffer_capacity: usize,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            max_guesses: MAX_GUESSES,
            max_name_len: MAX_NAME - 1,
            buffer_capacity: MAX_BUF,
        }
    }
}

/// The single game room and everyone connected to it
pub struct Lobby {
    clients: ClientManager,
    game: GameState,
    words: Box<dyn WordSource>,
    config: LobbyConfig,
    /// Clients whose last write failed, waiting to be disconnected
    doomed: VecDeque<ClientId>,
}

impl Lobby {
    pub fn new(config: LobbyConfig, mut words: Box<dyn WordSource>) -> Self {
        let word = words.pick_word();
        Self {
            clients: ClientManager::new(config.buffer_capacity),
            game: GameState::new(&word, config.max_guesses),
            words,
            config,
            doomed: VecDeque::new(),
        }
    }

    pub fn clients(&self) -> &ClientManager {
        &self.clients
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    /// Registers an accepted connection and greets it
    ///
    /// Returns `None` when the welcome could not be written; the connection
    /// has then already been dropped.
    pub fn connect(&mut self, addr: SocketAddr, outbound: Box<dyn Outbound>) -> Option<ClientId> {
        let id = self.clients.register(addr, outbound);
        let welcome = Notice::Welcome.to_wire();

        let result = match self.clients.get_mut(id) {
            Some(client) => client.send(&welcome),
            None => return None,
        };

        if let Err(e) = result {
            warn!("Write to client {} failed: {}", addr, e);
            if let Err(e) = self.clients.remove(id, Membership::Pending) {
                error!("{}", e);
            }
            return None;
        }

        Some(id)
    }

    /// Feeds bytes read from `id` through its line buffer and handles every complete line
    pub fn receive(&mut self, id: ClientId, bytes: &[u8]) {
        let lines = match self.clients.get_mut(id) {
            Some(client) => client.inbox.push(bytes),
            None => {
                debug!("Ignoring {} bytes for departed client {}", bytes.len(), id);
                return;
            }
        };
        debug!("[{}] Read {} bytes", id, bytes.len());

        for line in lines {
            debug!("[{}] Found newline {:?}", id, line);
            match self.clients.membership(id) {
                Some(Membership::Pending) => self.handle_name(id, &line),
                Some(Membership::Active) => self.handle_guess(id, &line),
                None => break,
            }
            self.reap();
        }
    }

    /// The transport reported end-of-stream or a read error
    pub fn closed(&mut self, id: ClientId) {
        if self.clients.membership(id).is_none() {
            debug!("Client {} already removed", id);
            return;
        }
        self.disconnect(id);
        self.reap();
    }

    fn handle_name(&mut self, id: ClientId, name: &str) {
        let rejection = if name.is_empty() {
            Some(NameRejection::Empty)
        } else if name.len() > self.config.max_name_len {
            Some(NameRejection::TooLong)
        } else if self.clients.name_taken(name) {
            Some(NameRejection::Taken)
        } else {
            None
        };

        if let Some(reason) = rejection {
            debug!("Client {} picked an unacceptable name: {}", id, reason);
            self.send(id, &Notice::NameRejected(reason));
            return;
        }

        if let Err(e) = self.clients.promote(id, name) {
            error!("{}", e);
            return;
        }
        info!("{} has just joined", name);

        if self.game.turn().is_none() {
            self.game.set_turn(Some(id));
            info!("It's {}'s turn.", name);
        }

        self.broadcast(&Notice::Joined {
            name: name.to_string(),
        });
        self.announce_turn_to(id);
        if self.game.turn() == Some(id) {
            self.prompt();
        }
    }

    fn handle_guess(&mut self, id: ClientId, line: &str) {
        let name = self.clients.name(id).unwrap_or_default().to_string();

        let letter = match self.game.check_guess(id, line) {
            Ok(letter) => letter,
            Err(GuessError::OutOfTurn) => {
                info!("Player {} tried to guess out of turn", name);
                self.send(id, &Notice::NotYourTurn);
                return;
            }
            Err(GuessError::Invalid) => {
                if self.send(id, &Notice::InvalidGuess) {
                    self.prompt();
                }
                return;
            }
        };

        self.broadcast(&Notice::Guessed { name, letter });

        match self.game.apply_guess(letter) {
            GuessOutcome::Hit => {
                self.broadcast(&Notice::Hit { letter });
            }
            GuessOutcome::Miss => {
                info!("Letter {} is not in the word", letter);
                self.broadcast(&Notice::Miss { letter });
                self.advance_turn();
            }
        }

        if let Some(result) = self.game.round_result() {
            self.finish_round(result);
        }

        self.announce_turn();
        self.prompt();
    }

    /// Announces the result and starts the next round with a fresh word
    fn finish_round(&mut self, result: RoundResult) {
        let word = self.game.word();

        match result {
            RoundResult::Lost => {
                info!("Game over! No more guesses left. The word was {}", word);
                self.broadcast(&Notice::Lost { word });
            }
            RoundResult::Won => {
                let winner = self.game.turn();
                let name = winner
                    .and_then(|id| self.clients.name(id))
                    .unwrap_or_default()
                    .to_string();
                info!("Game over! {} won.", name);

                let to_others = Notice::Won {
                    name,
                    word: word.clone(),
                };
                let to_winner = Notice::YouWon { word };
                for id in self.clients.active_ids() {
                    let notice = if Some(id) == winner {
                        &to_winner
                    } else {
                        &to_others
                    };
                    self.send(id, notice);
                }
            }
        }

        self.broadcast(&Notice::NewRound);
        let word = self.words.pick_word();
        self.game.reset(&word);
    }

    /// Passes the turn to the next active client in join order
    fn advance_turn(&mut self) {
        let next = self
            .game
            .turn()
            .and_then(|holder| self.clients.next_active_after(holder));
        self.game.set_turn(next);
    }

    /// Removes a client, keeping the turn valid and telling the others
    ///
    /// Pending clients leave silently. For an active turn holder the turn
    /// moves on before removal, and the new holder is announced afterwards.
    fn disconnect(&mut self, id: ClientId) {
        self.doomed.retain(|&queued| queued != id);

        let membership = match self.clients.membership(id) {
            Some(membership) => membership,
            None => {
                error!("Trying to remove client {}, but I don't know about it", id);
                return;
            }
        };

        if membership == Membership::Pending {
            if let Err(e) = self.clients.remove(id, Membership::Pending) {
                error!("{}", e);
            }
            return;
        }

        let held_turn = self.game.turn() == Some(id);
        if held_turn {
            let next = self
                .clients
                .next_active_after(id)
                .filter(|&next| next != id);
            self.game.set_turn(next);
        }

        let name = match self.clients.remove(id, Membership::Active) {
            Ok(client) => client.name.clone(),
            Err(e) => {
                error!("{}", e);
                return;
            }
        };

        self.broadcast(&Notice::Left { name });

        if held_turn {
            self.announce_turn();
            self.prompt();
        }
    }

    /// Disconnects every client whose write failed, including ones that fail along the way
    fn reap(&mut self) {
        while let Some(id) = self.doomed.pop_front() {
            if self.clients.membership(id).is_some() {
                self.disconnect(id);
            }
        }
    }

    /// Sends the status block and turn line to every active client
    fn announce_turn(&mut self) {
        if let Some(name) = self.game.turn().and_then(|id| self.clients.name(id)) {
            info!("It's {}'s turn.", name);
        }
        for id in self.clients.active_ids() {
            self.announce_turn_to(id);
        }
    }

    fn announce_turn_to(&mut self, id: ClientId) {
        let Some(holder) = self.game.turn() else {
            return;
        };

        let turn = if holder == id {
            Notice::YourTurn
        } else {
            let name = self.clients.name(holder).unwrap_or_default().to_string();
            Notice::Turn { name }
        };

        let status = self.game.status();
        if self.send(id, &status) {
            self.send(id, &turn);
        }
    }

    /// Asks the turn holder for a letter
    fn prompt(&mut self) {
        if let Some(holder) = self.game.turn() {
            self.send(holder, &Notice::Prompt);
        }
    }

    /// Delivers `notice` to every active client
    fn broadcast(&mut self, notice: &Notice) {
        let wire = notice.to_wire();
        for id in self.clients.active_ids() {
            self.send_bytes(id, &wire);
        }
    }

    fn send(&mut self, id: ClientId, notice: &Notice) -> bool {
        self.send_bytes(id, &notice.to_wire())
    }

    /// Writes to one client; on failure queues it for removal and returns false
    fn send_bytes(&mut self, id: ClientId, bytes: &[u8]) -> bool {
        if self.doomed.contains(&id) {
            return false;
        }
        let Some(client) = self.clients.get_mut(id) else {
            return false;
        };

        match client.send(bytes) {
            Ok(()) => true,
            Err(e) => {
                warn!("Write to client {} ({}) failed: {}", id, client.addr, e);
                self.doomed.push_back(id);
                false
            }
        }
    }
}
