//! Error types for the word game server

use crate::client_manager::{ClientId, Membership};
use std::io;
use std::path::PathBuf;

/// Failures that stop the server from starting or running
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read dictionary {path}: {source}")]
    Dictionary {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Dictionary {0} contains no usable words")]
    EmptyDictionary(PathBuf),
}

/// Registry bookkeeping that did not match reality.
///
/// These are diagnostics only: callers log them and carry on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Unknown client {0}")]
    UnknownClient(ClientId),

    #[error("Client {id} is {actual:?}, expected {expected:?}")]
    WrongMembership {
        id: ClientId,
        expected: Membership,
        actual: Membership,
    },
}
