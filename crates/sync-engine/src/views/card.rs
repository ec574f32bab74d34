// crates/sync-engine/src/views/card.rs
//! Book card: favorite heart plus status dropdown

use super::{dispatch_choice, Binding, ControlState, DropdownEvent, StatusChoice, StatusDropdown};
use crate::engine::SyncEngine;
use crate::error::SyncResult;
use crate::types::MutationOutcome;
use museu_core::{Book, BookId, BookStatusEntry};
use std::sync::Arc;

/// Card binding for one book
pub struct BookCard {
    engine: Arc<SyncEngine>,
    binding: Binding,
    title: Option<String>,
    dropdown: StatusDropdown,
}

impl BookCard {
    /// Card for a catalog book
    pub fn new(engine: Arc<SyncEngine>, book: &Book) -> SyncResult<Self> {
        let mut card = Self::for_id(engine, book.id.clone())?;
        card.title = Some(book.title.clone());
        Ok(card)
    }

    /// Card known only by id
    pub fn for_id(engine: Arc<SyncEngine>, book_id: BookId) -> SyncResult<Self> {
        let binding = Binding::new(engine.store(), book_id)?;
        Ok(Self {
            engine,
            binding,
            title: None,
            dropdown: StatusDropdown::new(),
        })
    }

    pub fn book_id(&self) -> &BookId {
        self.binding.book_id()
    }

    pub fn entry(&self) -> BookStatusEntry {
        self.binding.entry()
    }

    pub fn controls(&self) -> ControlState {
        ControlState::from_entry(&self.entry(), self.title.as_deref())
    }

    pub fn dropdown(&self) -> &StatusDropdown {
        &self.dropdown
    }

    /// Heart clicked
    pub async fn click_favorite(&self) -> SyncResult<MutationOutcome> {
        self.engine.toggle_favorite(self.binding.book_id()).await
    }

    /// Feeds a dropdown event; a selection is sent to the engine
    pub async fn handle_dropdown(
        &mut self,
        event: DropdownEvent,
    ) -> Option<SyncResult<MutationOutcome>> {
        let disabled = self.entry().is_pending();
        let choice = self.dropdown.handle(event, disabled)?;
        Some(self.choose(choice).await)
    }

    /// Applies a status choice directly
    pub async fn choose(&mut self, choice: StatusChoice) -> SyncResult<MutationOutcome> {
        self.dropdown.close();
        dispatch_choice(&self.engine, self.binding.book_id(), choice).await
    }
}
