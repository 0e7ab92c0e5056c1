//! Input routing - debounced edges into the transition table.
//!
//! Only release edges are actionable, so one full press/release cycle
//! fires exactly one action.

use super::debounce::{Edge, Edges};
use super::menu::{self, MenuModel, Transition};
use super::{ButtonId, UiState};

/// Move selection cursor one item down, wrapping to the top.
pub fn select_next(selected: usize, item_count: usize) -> usize {
    if item_count == 0 {
        0
    } else {
        (selected + 1) % item_count
    }
}

/// Owner of the navigation state and the redraw flag.
pub struct InputRouter {
    state: UiState,
    menu: MenuModel,
    redraw: bool,
}

impl InputRouter {
    /// Boot in `Init` with a redraw pending so the splash gets painted.
    pub const fn new(menu: MenuModel) -> Self {
        Self {
            state: UiState::Init,
            menu,
            redraw: true,
        }
    }

    pub fn state(&self) -> UiState {
        self.state
    }

    pub fn menu(&self) -> &MenuModel {
        &self.menu
    }

    /// Route one tick's edges, Navigate first.
    ///
    /// Returns the last transition that changed state or selection, if any.
    pub fn route(&mut self, edges: Edges) -> Option<Transition> {
        let mut applied = None;

        for id in ButtonId::ALL {
            if edges.get(id) != Edge::Released {
                continue;
            }

            let next = menu::transition(self.state, id, &self.menu);
            if next.state == self.state && next.selected == self.menu.selected() {
                continue;
            }

            debug!("UI: {} -> {} (sel {})", self.state, next.state, next.selected);
            self.state = next.state;
            self.menu.select(next.selected);
            self.redraw = true;
            applied = Some(merge(applied, next));
        }

        applied
    }

    /// Consume the redraw flag.
    pub fn take_redraw(&mut self) -> bool {
        core::mem::replace(&mut self.redraw, false)
    }

    /// Ask for a full repaint on the next projection (e.g. after a failed draw).
    pub fn request_redraw(&mut self) {
        self.redraw = true;
    }

    pub fn redraw_pending(&self) -> bool {
        self.redraw
    }
}

/// Two transitions in one tick: the later one wins, but an exit from
/// `ShowCode` must not be lost.
fn merge(prev: Option<Transition>, next: Transition) -> Transition {
    match prev {
        Some(p) => Transition {
            leaves_code: p.leaves_code || next.leaves_code,
            ..next
        },
        None => next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_wraps() {
        assert_eq!(select_next(0, 1), 0);
        assert_eq!(select_next(0, 3), 1);
        assert_eq!(select_next(2, 3), 0);
        assert_eq!(select_next(0, 0), 0);
    }
}
