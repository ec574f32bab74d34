// crates/sync-engine/src/views/dropdown.rs
//! Open/closed state of the status dropdown

use super::StatusChoice;

/// Input the dropdown reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownEvent {
    /// Click on the dropdown button
    Toggle,
    /// Escape key
    Escape,
    /// Click anywhere outside the dropdown
    OutsideClick,
    /// Arrow down
    Next,
    /// Arrow up
    Previous,
    /// Enter on the highlighted option
    Confirm,
    /// Click on an option
    Select(StatusChoice),
}

/// Dropdown state; closes on Escape, outside click and after a selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusDropdown {
    open: bool,
    highlighted: usize,
}

impl StatusDropdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Option under the keyboard cursor while open
    pub fn highlighted(&self) -> Option<StatusChoice> {
        self.open.then(|| StatusChoice::ALL[self.highlighted])
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Applies `event`; returns the choice when the reader picked one
    ///
    /// While `disabled` the dropdown stays closed and picks nothing.
    pub fn handle(&mut self, event: DropdownEvent, disabled: bool) -> Option<StatusChoice> {
        if disabled {
            self.open = false;
            return None;
        }

        match event {
            DropdownEvent::Toggle => {
                self.open = !self.open;
                self.highlighted = 0;
                None
            }
            DropdownEvent::Escape | DropdownEvent::OutsideClick => {
                self.open = false;
                None
            }
            DropdownEvent::Next if self.open => {
                self.highlighted = (self.highlighted + 1) % StatusChoice::ALL.len();
                None
            }
            DropdownEvent::Previous if self.open => {
                self.highlighted =
                    (self.highlighted + StatusChoice::ALL.len() - 1) % StatusChoice::ALL.len();
                None
            }
            DropdownEvent::Confirm if self.open => {
                self.open = false;
                Some(StatusChoice::ALL[self.highlighted])
            }
            DropdownEvent::Select(choice) if self.open => {
                self.open = false;
                Some(choice)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use museu_core::ReadingStatus;

    #[test]
    fn test_toggle_opens_and_closes() {
        let mut dropdown = StatusDropdown::new();
        dropdown.handle(DropdownEvent::Toggle, false);
        assert!(dropdown.is_open());
        dropdown.handle(DropdownEvent::Toggle, false);
        assert!(!dropdown.is_open());
    }

    #[test]
    fn test_escape_and_outside_click_close() {
        let mut dropdown = StatusDropdown::new();

        dropdown.handle(DropdownEvent::Toggle, false);
        assert_eq!(dropdown.handle(DropdownEvent::Escape, false), None);
        assert!(!dropdown.is_open());

        dropdown.handle(DropdownEvent::Toggle, false);
        dropdown.handle(DropdownEvent::OutsideClick, false);
        assert!(!dropdown.is_open());
    }

    #[test]
    fn test_selection_closes_and_returns_choice() {
        let mut dropdown = StatusDropdown::new();
        dropdown.handle(DropdownEvent::Toggle, false);

        let picked = dropdown.handle(DropdownEvent::Select(StatusChoice::Clear), false);
        assert_eq!(picked, Some(StatusChoice::Clear));
        assert!(!dropdown.is_open());
    }

    #[test]
    fn test_select_while_closed_is_ignored() {
        let mut dropdown = StatusDropdown::new();
        assert_eq!(
            dropdown.handle(DropdownEvent::Select(StatusChoice::Clear), false),
            None
        );
    }

    #[test]
    fn test_keyboard_navigation_wraps() {
        let mut dropdown = StatusDropdown::new();
        dropdown.handle(DropdownEvent::Toggle, false);

        dropdown.handle(DropdownEvent::Previous, false);
        assert_eq!(dropdown.highlighted(), Some(StatusChoice::Clear));

        dropdown.handle(DropdownEvent::Next, false);
        dropdown.handle(DropdownEvent::Next, false);
        assert_eq!(
            dropdown.handle(DropdownEvent::Confirm, false),
            Some(StatusChoice::Status(ReadingStatus::Reading))
        );
        assert!(!dropdown.is_open());
    }

    #[test]
    fn test_disabled_ignores_input() {
        let mut dropdown = StatusDropdown::new();
        dropdown.handle(DropdownEvent::Toggle, false);

        assert_eq!(
            dropdown.handle(DropdownEvent::Select(StatusChoice::Clear), true),
            None
        );
        assert!(!dropdown.is_open());
        dropdown.handle(DropdownEvent::Toggle, true);
        assert!(!dropdown.is_open());
    }
}
