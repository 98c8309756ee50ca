//! # Word Game Server Library
//!
//! This library hosts a turn-based, multiplayer word-guessing game over a
//! line-oriented TCP protocol. Players connect, pick a name, and take turns
//! guessing single letters of a hidden word until it is revealed or the
//! shared guess budget runs out.
//!
//! ## Core Responsibilities
//!
//! ### Connection Lifecycle
//! Every connection starts out pending. Its first line is taken as the
//! desired display name; once accepted the connection becomes an active
//! player and joins the turn rotation. Pending connections never receive
//! game broadcasts and never hold the turn.
//!
//! ### Turn-Based Game Rules
//! Exactly one active player holds the turn. A correct letter reveals every
//! matching position and keeps the turn; a wrong letter costs one guess and
//! passes the turn on in join order. A revealed word or an exhausted budget
//! ends the round, and a new round starts at once with a fresh word.
//!
//! ### Disconnect Recovery
//! A player can vanish at any moment: end-of-stream, a read error, or a write
//! that fails during a broadcast. The departing player's turn is handed on
//! before removal, the room is told, and the new turn holder is prompted.
//!
//! ## Architecture Design
//!
//! ### Single-Threaded Event Loop
//! The server runs on a current-thread Tokio runtime. One loop owns the
//! registry and the game state and handles each event to completion, so no
//! locks are needed. Small reader tasks forward socket input to the loop
//! through a channel; writes are made directly and never retried.
//!
//! ### Line Framing
//! Input is framed on `\r` with a fixed-size buffer per connection. Overlong
//! input without a terminator is dropped instead of growing memory.
//!
//! ## Module Organization
//!
//! ### Client Manager Module (`client_manager`)
//! Registry of pending and active connections, join order for turn rotation,
//! and the [`client_manager::Outbound`] seam to the transport.
//!
//! ### Framer Module (`framer`)
//! The bounded [`framer::LineBuffer`].
//!
//! ### Game Module (`game`)
//! Round state: target word, reveal buffer, guessed letters, remaining
//! guesses and the turn holder.
//!
//! ### Lobby Module (`lobby`)
//! Name entry, guess handling, broadcasts and the disconnect handler.
//!
//! ### Network Module (`network`)
//! TCP accept loop, per-connection reader tasks and the event dispatch.
//!
//! ### Dictionary Module (`dictionary`)
//! Loads the word list and picks a random word per round.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::dictionary::Dictionary;
//! use server::lobby::{Lobby, LobbyConfig};
//! use server::network::Server;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let words = Dictionary::load("words.txt")?;
//!     let lobby = Lobby::new(LobbyConfig::default(), Box::new(words));
//!
//!     // Accepts players and runs rounds until the process is stopped
//!     let server = Server::bind("0.0.0.0:58474", lobby).await?;
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod dictionary;
pub mod error;
pub mod framer;
pub mod game;
pub mod lobby;
pub mod network;
