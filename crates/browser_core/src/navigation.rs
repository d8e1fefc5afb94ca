//! Back/forward history of visited locations.

use shared::domain::Location;

/// Visit-ordered locations plus a cursor at the current one.
///
/// `entries` is never empty and `index < entries.len()` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryState {
    entries: Vec<Location>,
    index: usize,
}

impl HistoryState {
    pub fn new(initial: Location) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
        }
    }

    pub fn entries(&self) -> &[Location] {
        &self.entries
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &Location {
        &self.entries[self.index]
    }
}

/// Browser-style history. Every transition reads the stored state it replaces,
/// so rapid sequential calls never work from a stale cursor.
#[derive(Debug, Clone)]
pub struct NavigationController {
    state: HistoryState,
}

impl NavigationController {
    pub fn new(initial: Location) -> Self {
        Self {
            state: HistoryState::new(initial),
        }
    }

    pub fn history(&self) -> &HistoryState {
        &self.state
    }

    pub fn current(&self) -> &Location {
        self.state.current()
    }

    /// Drops the forward branch, appends `location` and moves onto it.
    pub fn navigate(&mut self, location: Location) {
        let state = &mut self.state;
        state.entries.truncate(state.index + 1);
        state.entries.push(location);
        state.index = state.entries.len() - 1;
    }

    pub fn go_back(&mut self) -> Option<Location> {
        if !self.can_go_back() {
            return None;
        }
        self.state.index -= 1;
        Some(self.state.current().clone())
    }

    pub fn go_forward(&mut self) -> Option<Location> {
        if !self.can_go_forward() {
            return None;
        }
        self.state.index += 1;
        Some(self.state.current().clone())
    }

    pub fn can_go_back(&self) -> bool {
        self.state.index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.state.index + 1 < self.state.entries.len()
    }
}
