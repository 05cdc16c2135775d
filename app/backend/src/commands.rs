//! FILENAME: app/backend/src/commands.rs
// PURPOSE: Commands invoked by the UI over a takeoff session.
// CONTEXT: Every command that changes a card re-runs the pipeline from the
// formula stage and returns the fresh view. The normalizer only runs in
// `import_rows`.

use std::path::Path;

use engine::{
    apply_filters, apply_formulas, drill_down, Card, ColumnFormat, FilterPredicate,
    GroupDefinition, SortSpec,
};
use persistence::{load_bundle, load_card, save_bundle, save_card, RawTable};

use crate::api_types::{build_card_summary, build_card_view, CardSummary, CardView, ViewRow};
use crate::error::CommandError;
use crate::session::{lock, TakeoffSession};
use crate::{log_enter, log_exit, log_info, log_warn};

// ============================================================================
// CARD LIFECYCLE
// ============================================================================

/// Creates a card from a raw element table and opens it.
pub fn import_rows(
    session: &TakeoffSession,
    name: String,
    table: RawTable,
    visible: Vec<String>,
) -> Result<CardView, CommandError> {
    log_enter!("CMD", "import_rows", "name={} rows={}", name, table.len());
    let (card, report) = Card::ingest(name, table.rows, &visible, &session.config.normalizer)?;
    log_info!(
        "CMD",
        "normalized columns: converted={:?} kept={:?}",
        report.converted,
        report.kept
    );
    let view = session.activate(card)?;
    log_exit!("CMD", "import_rows", "card={}", view.card_id);
    Ok(view)
}

/// Opens an existing card (e.g. one restored from storage) as-is.
pub fn open_card(session: &TakeoffSession, card: Card) -> Result<CardView, CommandError> {
    log_info!("CMD", "open_card id={} name={}", card.id, card.name);
    session.activate(card)
}

pub fn select_card(session: &TakeoffSession, id: &str) -> Result<CardView, CommandError> {
    log_info!("CMD", "select_card id={}", id);
    let mut active = lock(&session.active_card)?;
    let cards = lock(&session.cards)?;
    let card = cards
        .iter()
        .find(|c| c.id == id)
        .ok_or_else(|| CommandError::UnknownCard(id.to_string()))?;

    let view = build_card_view(card, &session.config.locale);
    *active = Some(card.id.clone());
    *lock(&session.last_view)? = Some(view.clone());
    Ok(view)
}

/// Closes a card. Closing the active card activates the first remaining one.
pub fn close_card(session: &TakeoffSession, id: &str) -> Result<Option<CardView>, CommandError> {
    log_info!("CMD", "close_card id={}", id);
    let mut active = lock(&session.active_card)?;
    let mut cards = lock(&session.cards)?;
    let position = cards
        .iter()
        .position(|c| c.id == id)
        .ok_or_else(|| CommandError::UnknownCard(id.to_string()))?;
    cards.remove(position);

    if active.as_deref() != Some(id) {
        let view = lock(&session.last_view)?.clone();
        return Ok(view);
    }

    let next = cards.first();
    *active = next.map(|c| c.id.clone());
    let view = next.map(|c| build_card_view(c, &session.config.locale));
    *lock(&session.last_view)? = view.clone();
    Ok(view)
}

pub fn rename_card(session: &TakeoffSession, name: String) -> Result<CardView, CommandError> {
    log_info!("CMD", "rename_card name={}", name);
    session.update_active(|card| Ok(card.rename(name)?))
}

// ============================================================================
// PIPELINE CONFIGURATION
// ============================================================================

pub fn set_formula(
    session: &TakeoffSession,
    name: String,
    expression: String,
) -> Result<CardView, CommandError> {
    log_info!("CMD", "set_formula {} = {}", name, expression);
    session.update_active(|card| Ok(card.set_formula(name, expression)?))
}

pub fn remove_formula(session: &TakeoffSession, name: &str) -> Result<CardView, CommandError> {
    log_info!("CMD", "remove_formula {}", name);
    session.update_active(|card| Ok(card.remove_formula(name)?))
}

pub fn set_filters(
    session: &TakeoffSession,
    filters: Vec<FilterPredicate>,
) -> Result<CardView, CommandError> {
    log_info!("CMD", "set_filters count={}", filters.len());
    session.update_active(|card| Ok(card.set_filters(filters)?))
}

/// Sets or clears the sort key.
pub fn set_sort(session: &TakeoffSession, sort: Option<SortSpec>) -> Result<CardView, CommandError> {
    log_info!("CMD", "set_sort {:?}", sort);
    session.update_active(|card| {
        match sort {
            Some(spec) => card.set_sort(spec)?,
            None => card.clear_sort(),
        }
        Ok(())
    })
}

pub fn set_itemize(session: &TakeoffSession, itemize: bool) -> Result<CardView, CommandError> {
    log_info!("CMD", "set_itemize {}", itemize);
    session.update_active(|card| {
        card.set_itemize(itemize);
        Ok(())
    })
}

pub fn set_column_format(
    session: &TakeoffSession,
    column: &str,
    format: ColumnFormat,
) -> Result<CardView, CommandError> {
    log_info!("CMD", "set_column_format {} -> {}", column, format);
    session.update_active(|card| Ok(card.set_column_format(column, format)?))
}

pub fn set_output_column(
    session: &TakeoffSession,
    column: &str,
    output: bool,
) -> Result<CardView, CommandError> {
    log_info!("CMD", "set_output_column {} = {}", column, output);
    session.update_active(|card| Ok(card.set_output_column(column, output)?))
}

pub fn set_visible_columns(
    session: &TakeoffSession,
    columns: Vec<String>,
) -> Result<CardView, CommandError> {
    log_info!("CMD", "set_visible_columns {:?}", columns);
    session.update_active(|card| Ok(card.set_visible_columns(columns)?))
}

// ============================================================================
// EDITING
// ============================================================================

/// Writes user input into a source cell. Refused while the view is grouped,
/// in which case the card and the cached view stay as they were.
pub fn edit_cell(
    session: &TakeoffSession,
    source_index: usize,
    column: &str,
    value: &str,
) -> Result<CardView, CommandError> {
    log_enter!("CMD", "edit_cell", "row={} col={} value={}", source_index, column, value);
    let result = session.update_active(|card| {
        card.edit_cell(source_index, column, value)?;
        Ok(())
    });
    match &result {
        Ok(_) => log_exit!("CMD", "edit_cell", "ok"),
        Err(e) => log_warn!("CMD", "edit_cell rejected: {}", e),
    }
    result
}

// ============================================================================
// QUERIES
// ============================================================================

/// View of the active card, rendered on demand if nothing is cached.
pub fn current_view(session: &TakeoffSession) -> Result<CardView, CommandError> {
    if let Some(view) = lock(&session.last_view)?.clone() {
        return Ok(view);
    }
    let card = session.active_card()?;
    let view = build_card_view(&card, &session.config.locale);
    *lock(&session.last_view)? = Some(view.clone());
    Ok(view)
}

pub fn card_summary(session: &TakeoffSession, id: &str) -> Result<CardSummary, CommandError> {
    let cards = lock(&session.cards)?;
    cards
        .iter()
        .find(|c| c.id == id)
        .map(|c| build_card_summary(c, &session.config.locale))
        .ok_or_else(|| CommandError::UnknownCard(id.to_string()))
}

/// Summary lines of every open card.
pub fn list_cards(session: &TakeoffSession) -> Result<Vec<CardSummary>, CommandError> {
    let cards = lock(&session.cards)?;
    Ok(cards
        .iter()
        .map(|c| build_card_summary(c, &session.config.locale))
        .collect())
}

/// The itemized source rows behind one grouped row of the active card,
/// in their displayed order.
pub fn drill_down_group(session: &TakeoffSession, key: &str) -> Result<Vec<ViewRow>, CommandError> {
    let card = session.active_card()?;
    let Some(sort) = card.sort.as_ref() else {
        return Ok(Vec::new());
    };

    let computed = apply_formulas(&card.indexed_rows(), &card.formulas);
    let filtered = apply_filters(&computed, &card.filters);
    let definition = GroupDefinition::new(sort.field.clone(), card.visible_columns.clone());
    let members: Vec<usize> = drill_down(&filtered, &definition, key)
        .iter()
        .map(|r| r.source_index)
        .collect();
    log_info!("CMD", "drill_down_group key={} members={}", key, members.len());

    let mut itemized = card.clone();
    itemized.itemize = true;
    Ok(build_card_view(&itemized, &session.config.locale)
        .rows
        .into_iter()
        .filter(|r| r.source_index.is_some_and(|i| members.contains(&i)))
        .collect())
}

// ============================================================================
// STORAGE
// ============================================================================

pub fn save_active(session: &TakeoffSession, path: &Path) -> Result<(), CommandError> {
    let card = session.active_card()?;
    save_card(path, &card)?;
    log_info!("CMD", "save_active card={} path={}", card.id, path.display());
    Ok(())
}

pub fn load_card_file(session: &TakeoffSession, path: &Path) -> Result<CardView, CommandError> {
    let card = load_card(path)?;
    log_info!("CMD", "load_card_file path={}", path.display());
    session.activate(card)
}

/// Saves every open card into one project archive.
pub fn save_project(session: &TakeoffSession, path: &Path) -> Result<(), CommandError> {
    let cards = lock(&session.cards)?;
    save_bundle(path, &cards)?;
    log_info!("CMD", "save_project cards={} path={}", cards.len(), path.display());
    Ok(())
}

/// Opens every card of a project archive; the first becomes active.
pub fn load_project(session: &TakeoffSession, path: &Path) -> Result<Option<CardView>, CommandError> {
    let cards = load_bundle(path)?;
    log_info!("CMD", "load_project cards={} path={}", cards.len(), path.display());
    let first_id = cards.first().map(|c| c.id.clone());
    for card in cards {
        session.activate(card)?;
    }
    first_id.map(|id| select_card(session, &id)).transpose()
}
