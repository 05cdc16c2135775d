//! FILENAME: core/persistence/src/bundle.rs
//! PURPOSE: Stores several cards in one ZIP archive.
//! CONTEXT: Layout is `manifest.json` plus `cards/<id>.json` per card, each card
//! file using the same versioned envelope as a standalone card file. Cards
//! load back in manifest order.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use engine::Card;
use log::info;
use serde::{Deserialize, Serialize};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::card_file::{card_from_json, card_to_json, CARD_FILE_VERSION};
use crate::PersistenceError;

pub const MANIFEST_NAME: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleEntry {
    pub id: String,
    pub name: String,
    /// Archive path of the card file.
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleManifest {
    pub version: u32,
    pub cards: Vec<BundleEntry>,
}

fn zip_write_str<W: Write + std::io::Seek>(
    zip: &mut ZipWriter<W>,
    name: &str,
    contents: &str,
    options: SimpleFileOptions,
) -> Result<(), PersistenceError> {
    zip.start_file(name, options)?;
    zip.write_all(contents.as_bytes())?;
    Ok(())
}

fn zip_read_str<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<String, PersistenceError> {
    let mut file = archive.by_name(name)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

pub fn save_bundle(path: &Path, cards: &[Card]) -> Result<(), PersistenceError> {
    let mut zip = ZipWriter::new(File::create(path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut manifest = BundleManifest {
        version: CARD_FILE_VERSION,
        cards: Vec::with_capacity(cards.len()),
    };
    for card in cards {
        let file = format!("cards/{}.json", card.id);
        if manifest.cards.iter().any(|e| e.file == file) {
            return Err(PersistenceError::InvalidFormat(format!(
                "Duplicate card id in bundle: {}",
                card.id
            )));
        }
        zip_write_str(&mut zip, &file, &card_to_json(card)?, options)?;
        manifest.cards.push(BundleEntry {
            id: card.id.clone(),
            name: card.name.clone(),
            file,
        });
    }

    let manifest_json = serde_json::to_string_pretty(&manifest)?;
    zip_write_str(&mut zip, MANIFEST_NAME, &manifest_json, options)?;
    zip.finish()?;

    info!(target: "PERSIST", "saved {} cards to {}", cards.len(), path.display());
    Ok(())
}

pub fn load_bundle(path: &Path) -> Result<Vec<Card>, PersistenceError> {
    let mut archive = ZipArchive::new(File::open(path)?)?;
    let manifest_json = zip_read_str(&mut archive, MANIFEST_NAME)?;
    let manifest: BundleManifest = serde_json::from_str(&manifest_json)?;
    if manifest.version != CARD_FILE_VERSION {
        return Err(PersistenceError::UnsupportedVersion(manifest.version));
    }

    let mut cards = Vec::with_capacity(manifest.cards.len());
    for entry in &manifest.cards {
        let card = card_from_json(&zip_read_str(&mut archive, &entry.file)?)?;
        if card.id != entry.id {
            return Err(PersistenceError::InvalidFormat(format!(
                "{} holds card {} but the manifest expects {}",
                entry.file, card.id, entry.id
            )));
        }
        cards.push(card);
    }

    info!(target: "PERSIST", "loaded {} cards from {}", cards.len(), path.display());
    Ok(cards)
}
