//! FILENAME: app/backend/src/error.rs
// PURPOSE: Errors returned by session commands.

use engine::{CardError, ConfigError, EditError};
use persistence::PersistenceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("No card is open")]
    NoActiveCard,

    #[error("Unknown card: {0}")]
    UnknownCard(String),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Card(#[from] CardError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("Could not read configuration: {0}")]
    ConfigFile(String),

    #[error("Session state is unavailable: {0}")]
    State(String),
}
