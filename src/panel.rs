//! Lazy Panel Controller: the open/closed state of one collapsible report
//! panel, firing its initial fetch on the first open only.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LazyPanel {
    open: bool,
    /// Whether the first-open fetch has fired. Independent of the section's
    /// `loaded` flag so a pre-opened panel never fires.
    triggered: bool,
}

impl LazyPanel {
    /// Closed panel that fetches on its first open.
    pub fn new() -> Self {
        Self::default()
    }

    /// Panel that starts open. It is considered already triggered and will
    /// never fire its own fetch.
    pub fn pre_opened() -> Self {
        Self {
            open: true,
            triggered: true,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    /// Flip open/closed. Returns true exactly once over the panel's lifetime:
    /// on the first transition to open.
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        if self.open && !self.triggered {
            self.triggered = true;
            return true;
        }
        false
    }

    /// Open if closed. Same firing rule as [`toggle`](Self::toggle).
    pub fn open(&mut self) -> bool {
        if self.open {
            return false;
        }
        self.toggle()
    }

    /// Close if open. Never fires.
    pub fn close(&mut self) {
        self.open = false;
    }
}
