//! FILENAME: app/backend/src/session.rs
// PURPOSE: Session state shared by all commands: the open cards, which one is
// active, and the view last rendered for it.
// CONTEXT: One writer at a time. Locks are always taken in the order
// active_card -> cards -> last_view.

use std::sync::{Mutex, MutexGuard};

use engine::Card;

use crate::api_types::{build_card_view, CardView};
use crate::config::AppConfig;
use crate::error::CommandError;
use crate::log_info;

pub struct TakeoffSession {
    pub config: AppConfig,
    /// Open cards in the order they were opened
    pub cards: Mutex<Vec<Card>>,
    /// Id of the card being edited
    pub active_card: Mutex<Option<String>>,
    /// View of the active card after the last successful command
    pub last_view: Mutex<Option<CardView>>,
}

pub fn create_session(config: AppConfig) -> TakeoffSession {
    log_info!("SYS", "Creating TakeoffSession");
    TakeoffSession {
        config,
        cards: Mutex::new(Vec::new()),
        active_card: Mutex::new(None),
        last_view: Mutex::new(None),
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, CommandError> {
    mutex.lock().map_err(|e| CommandError::State(e.to_string()))
}

impl TakeoffSession {
    pub fn active_card_id(&self) -> Result<String, CommandError> {
        lock(&self.active_card)?
            .clone()
            .ok_or(CommandError::NoActiveCard)
    }

    /// A copy of the active card.
    pub fn active_card(&self) -> Result<Card, CommandError> {
        let id = self.active_card_id()?;
        let cards = lock(&self.cards)?;
        cards
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(CommandError::UnknownCard(id))
    }

    /// Applies `op` to the active card and re-renders it. When `op` fails
    /// neither the card nor the cached view changes.
    pub(crate) fn update_active<F>(&self, op: F) -> Result<CardView, CommandError>
    where
        F: FnOnce(&mut Card) -> Result<(), CommandError>,
    {
        let id = self.active_card_id()?;
        let mut cards = lock(&self.cards)?;
        let card = cards
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| CommandError::UnknownCard(id.clone()))?;

        op(card)?;

        let view = build_card_view(card, &self.config.locale);
        *lock(&self.last_view)? = Some(view.clone());
        Ok(view)
    }

    /// Adds `card` (replacing an open card with the same id) and makes it active.
    pub(crate) fn activate(&self, card: Card) -> Result<CardView, CommandError> {
        let mut active = lock(&self.active_card)?;
        let mut cards = lock(&self.cards)?;

        let view = build_card_view(&card, &self.config.locale);
        *active = Some(card.id.clone());
        match cards.iter_mut().find(|c| c.id == card.id) {
            Some(existing) => *existing = card,
            None => cards.push(card),
        }
        *lock(&self.last_view)? = Some(view.clone());
        Ok(view)
    }
}
