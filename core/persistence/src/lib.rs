//! FILENAME: core/persistence/src/lib.rs
//! Takeoff Persistence Module
//!
//! Saves and loads cards as versioned JSON, bundles several cards into one
//! ZIP archive, and reads raw element tables exported as JSON or XLSX.

mod bundle;
mod card_file;
mod error;
mod json_reader;
mod raw_table;
mod xlsx_reader;

pub use bundle::{load_bundle, save_bundle, BundleEntry, BundleManifest, MANIFEST_NAME};
pub use card_file::{card_from_json, card_to_json, load_card, save_card, CARD_FILE_VERSION};
pub use error::PersistenceError;
pub use json_reader::{load_json_rows, rows_from_json};
pub use raw_table::RawTable;
pub use xlsx_reader::load_xlsx_rows;
