//! Menu model and the UI transition table.

use super::{ButtonId, UiState};

/// Pages rendered once when entered from the menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StaticPage {
    /// Temperature, link state, last BLE payload, notification count.
    Status,
    /// Device name and firmware version.
    About,
}

/// What selecting a menu option does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuAction {
    /// Show the live OTP code.
    ShowCode,
    /// Show a static page.
    Page(StaticPage),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MenuOption {
    pub label: &'static str,
    pub action: MenuAction,
}

/// Options shipped in the firmware, in display order.
pub static DEFAULT_MENU: [MenuOption; 3] = [
    MenuOption {
        label: "OTP code",
        action: MenuAction::ShowCode,
    },
    MenuOption {
        label: "Status",
        action: MenuAction::Page(StaticPage::Status),
    },
    MenuOption {
        label: "About",
        action: MenuAction::Page(StaticPage::About),
    },
];

/// Ordered options plus the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MenuModel {
    options: &'static [MenuOption],
    selected: usize,
}

impl MenuModel {
    pub const fn new(options: &'static [MenuOption]) -> Self {
        Self {
            options,
            selected: 0,
        }
    }

    pub fn options(&self) -> &'static [MenuOption] {
        self.options
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_option(&self) -> Option<&'static MenuOption> {
        self.options.get(self.selected)
    }

    /// Move the cursor; out-of-range indices clamp to the last option.
    pub fn select(&mut self, index: usize) {
        self.selected = index.min(self.options.len().saturating_sub(1));
    }
}

/// Result of one table lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    pub state: UiState,
    pub selected: usize,
    /// Leaving `ShowCode`: the OTP cache must be dropped so the code line
    /// is redrawn in full on the next entry.
    pub leaves_code: bool,
}

/// Look up the next state for a button release.
///
/// Total over `(UiState, ButtonId)`; pairs without an entry return the
/// current state unchanged.
pub fn transition(state: UiState, button: ButtonId, menu: &MenuModel) -> Transition {
    let stay = Transition {
        state,
        selected: menu.selected(),
        leaves_code: false,
    };

    match (state, button) {
        (UiState::Init, _) => Transition {
            state: UiState::Menu,
            selected: 0,
            leaves_code: false,
        },
        (UiState::Menu, ButtonId::Navigate) => Transition {
            selected: super::input_logic::select_next(menu.selected(), menu.len()),
            ..stay
        },
        (UiState::Menu, ButtonId::Select) => match menu.selected_option() {
            Some(MenuOption {
                action: MenuAction::ShowCode,
                ..
            }) => Transition {
                state: UiState::ShowCode,
                ..stay
            },
            Some(_) => Transition {
                state: UiState::InMenuItem,
                ..stay
            },
            None => stay,
        },
        (UiState::InMenuItem, ButtonId::Select) => Transition {
            state: UiState::Menu,
            ..stay
        },
        (UiState::ShowCode, ButtonId::Select) => Transition {
            state: UiState::Menu,
            leaves_code: true,
            ..stay
        },
        (UiState::InMenuItem, ButtonId::Navigate) | (UiState::ShowCode, ButtonId::Navigate) => {
            stay
        }
    }
}
