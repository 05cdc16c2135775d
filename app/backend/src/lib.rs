//! FILENAME: app/backend/src/lib.rs
// PURPOSE: Main library entry point for the takeoff backend.
// CONTEXT: Hosts editing sessions over takeoff cards. The UI calls the
// functions in `commands`; each returns the view to render.

pub mod api_types;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;

pub use api_types::{
    build_card_summary, build_card_view, CardSummary, CardView, ColumnHeader, RollupData,
    TotalCell, ViewRow,
};
pub use commands::{
    card_summary, close_card, current_view, drill_down_group, edit_cell, import_rows, list_cards,
    load_card_file, load_project, open_card, remove_formula, rename_card, save_active,
    save_project, select_card, set_column_format, set_filters, set_formula, set_itemize,
    set_output_column, set_sort, set_visible_columns,
};
pub use config::AppConfig;
pub use error::CommandError;
pub use logging::{get_log_path, init_log_file, install_logger, next_seq, write_log};
pub use session::{create_session, TakeoffSession};

/// Opens the configured log file (if any) and routes core-crate logging into it.
pub fn init_logging(config: &AppConfig) -> Result<(), String> {
    if let Some(path) = &config.log_file {
        init_log_file(path)?;
    }
    install_logger(logging::parse_level(&config.log_level));
    log_info!("SYS", "Logging initialized at level {}", config.log_level);
    Ok(())
}
