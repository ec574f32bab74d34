// crates/sync-engine/src/views/detail.rs
//! Book detail page: card controls plus progress

use super::{dispatch_choice, Binding, ControlState, DropdownEvent, StatusChoice, StatusDropdown};
use crate::engine::SyncEngine;
use crate::error::SyncResult;
use crate::types::MutationOutcome;
use museu_core::{Book, BookStatusEntry};
use std::sync::Arc;

/// Detail-page binding for one book
pub struct BookDetail {
    engine: Arc<SyncEngine>,
    binding: Binding,
    book: Book,
    dropdown: StatusDropdown,
}

impl BookDetail {
    pub fn new(engine: Arc<SyncEngine>, book: Book) -> SyncResult<Self> {
        let binding = Binding::new(engine.store(), book.id.clone())?;
        Ok(Self {
            engine,
            binding,
            book,
            dropdown: StatusDropdown::new(),
        })
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn entry(&self) -> BookStatusEntry {
        self.binding.entry()
    }

    pub fn controls(&self) -> ControlState {
        ControlState::from_entry(&self.entry(), Some(&self.book.title))
    }

    /// Progress control is only offered while reading and idle
    pub fn can_edit_progress(&self) -> bool {
        let entry = self.entry();
        !entry.is_pending()
            && entry
                .reading_status
                .is_some_and(|status| status.tracks_progress())
    }

    pub async fn click_favorite(&self) -> SyncResult<MutationOutcome> {
        self.engine.toggle_favorite(&self.book.id).await
    }

    pub async fn handle_dropdown(
        &mut self,
        event: DropdownEvent,
    ) -> Option<SyncResult<MutationOutcome>> {
        let disabled = self.entry().is_pending();
        let choice = self.dropdown.handle(event, disabled)?;
        Some(self.choose(choice).await)
    }

    pub async fn choose(&mut self, choice: StatusChoice) -> SyncResult<MutationOutcome> {
        self.dropdown.close();
        dispatch_choice(&self.engine, &self.book.id, choice).await
    }

    pub async fn set_progress(&self, percent: u8) -> SyncResult<MutationOutcome> {
        self.engine.update_progress(&self.book.id, percent).await
    }
}
