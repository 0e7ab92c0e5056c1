//! User interface subsystem - two buttons, menu state machine, OLED projection.
//!
//! The main loop samples both buttons every tick and pushes the samples
//! through a fixed pipeline:
//!
//! ```text
//! pins → debounce → input_logic (router) → menu (transition table) → projector
//! ```
//!
//! ## Components
//!
//! - **debounce**: raw samples → press/release edges, one timer per button
//! - **input_logic**: routes release edges into the transition table and owns
//!   the navigation state + redraw flag
//! - **menu**: menu model and the total `(state, button) → state` table
//! - **projector**: state → minimal list of draw operations

pub mod debounce;
pub mod input_logic;
pub mod menu;
pub mod projector;


/// Physical buttons (active-low with internal pull-up).
///
///   - NAVIGATE: move the menu cursor
///   - SELECT:   enter the highlighted item / go back
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonId {
    Navigate,
    Select,
}

impl ButtonId {
    /// Routing order within one tick.
    pub const ALL: [ButtonId; 2] = [ButtonId::Navigate, ButtonId::Select];

    pub(crate) const fn index(self) -> usize {
        match self {
            ButtonId::Navigate => 0,
            ButtonId::Select => 1,
        }
    }
}

/// Screens (views) the UI can be in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UiState {
    /// Boot splash, left on the first button release.
    Init,
    /// Option list with a cursor.
    Menu,
    /// A static page rendered once on entry.
    InMenuItem,
    /// Live OTP code with a per-second countdown.
    ShowCode,
}
