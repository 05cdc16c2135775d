//! FILENAME: core/persistence/src/card_file.rs
//! PURPOSE: Saves and loads a single card as versioned JSON.
//! CONTEXT: The card is stored whole, so reloading reproduces the same
//! pipeline output. The envelope version is checked before the card is read.

use std::fs;
use std::path::Path;

use engine::Card;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::PersistenceError;

pub const CARD_FILE_VERSION: u32 = 1;

#[derive(Serialize)]
struct CardFileOut<'a> {
    version: u32,
    card: &'a Card,
}

#[derive(Deserialize)]
struct CardFileIn {
    version: u32,
    card: Value,
}

pub fn card_to_json(card: &Card) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string_pretty(&CardFileOut {
        version: CARD_FILE_VERSION,
        card,
    })?)
}

pub fn card_from_json(json: &str) -> Result<Card, PersistenceError> {
    let file: CardFileIn = serde_json::from_str(json)?;
    if file.version != CARD_FILE_VERSION {
        return Err(PersistenceError::UnsupportedVersion(file.version));
    }
    Ok(serde_json::from_value(file.card)?)
}

pub fn save_card(path: &Path, card: &Card) -> Result<(), PersistenceError> {
    fs::write(path, card_to_json(card)?)?;
    info!(target: "PERSIST", "saved card '{}' to {}", card.name, path.display());
    Ok(())
}

pub fn load_card(path: &Path) -> Result<Card, PersistenceError> {
    let card = card_from_json(&fs::read_to_string(path)?)?;
    info!(target: "PERSIST", "loaded card '{}' from {}", card.name, path.display());
    Ok(card)
}
