// crates/sync-engine/src/types.rs
//! Result types shared by the engine and the view adapters

use museu_core::BookStatusEntry;

/// What happened to a user action
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// The server accepted the change (or there was nothing to change);
    /// carries the settled entry
    Confirmed(BookStatusEntry),
    /// Another operation was in flight for the book; nothing was sent
    Rejected,
}

impl MutationOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, MutationOutcome::Confirmed(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, MutationOutcome::Rejected)
    }

    /// The settled entry, when confirmed
    pub fn entry(&self) -> Option<&BookStatusEntry> {
        match self {
            MutationOutcome::Confirmed(entry) => Some(entry),
            MutationOutcome::Rejected => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use museu_core::BookId;

    #[test]
    fn test_outcome_accessors() {
        let confirmed = MutationOutcome::Confirmed(BookStatusEntry::new(BookId::from(1u64)));
        assert!(confirmed.is_confirmed());
        assert_eq!(confirmed.entry().map(|e| e.book_id.as_str()), Some("1"));

        assert!(MutationOutcome::Rejected.is_rejected());
        assert!(MutationOutcome::Rejected.entry().is_none());
    }
}
