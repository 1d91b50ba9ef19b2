//! Current-session and focused-artifact cursor
//!
//! Both positions are explicit values checked on every move. Stepping is
//! saturating: at a boundary the move is a no-op, never a wraparound.

/// Cursor over sessions and the slots of the current session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    session: Option<usize>,
    focus: Option<usize>,
}

impl Cursor {
    /// Cursor with no session selected
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current session index
    #[inline]
    #[must_use]
    pub fn session(&self) -> Option<usize> {
        self.session
    }

    /// Focused slot within the current session
    #[inline]
    #[must_use]
    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    /// Move to a session and drop any focus
    pub fn select_session(&mut self, index: usize) {
        self.session = Some(index);
        self.focus = None;
    }

    /// Focus a slot
    pub fn set_focus(&mut self, slot: usize) {
        self.focus = Some(slot);
    }

    /// Drop focus
    pub fn clear_focus(&mut self) {
        self.focus = None;
    }

    /// Step forward; returns whether anything moved
    ///
    /// With a focused slot, steps within `[0, slots - 1]`; otherwise steps the
    /// session index within `[0, sessions - 1]`.
    pub fn next(&mut self, sessions: usize, slots: usize) -> bool {
        match (self.focus, self.session) {
            (Some(slot), _) if slot + 1 < slots => {
                self.focus = Some(slot + 1);
                true
            }
            (Some(_), _) => false,
            (None, Some(index)) if index + 1 < sessions => {
                self.session = Some(index + 1);
                true
            }
            (None, None) if sessions > 0 => {
                self.session = Some(0);
                true
            }
            (None, _) => false,
        }
    }

    /// Step backward; returns whether anything moved
    pub fn prev(&mut self) -> bool {
        match (self.focus, self.session) {
            (Some(slot), _) if slot > 0 => {
                self.focus = Some(slot - 1);
                true
            }
            (Some(_), _) => false,
            (None, Some(index)) if index > 0 => {
                self.session = Some(index - 1);
                true
            }
            (None, _) => false,
        }
    }
}
