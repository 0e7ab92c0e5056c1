//! Display projection - UI state to a minimal list of draw operations.
//!
//! The projector is pure: it builds a [`DrawList`] from the current state,
//! and [`apply`] replays it against whatever [`TextPanel`] the board
//! provides. A full clear happens only when the redraw flag is set (a UI
//! transition). On an OTP tick only the changed line(s) are cleared and
//! rewritten, so the code never flickers.

use core::fmt::Write;

use heapless::{String, Vec};

use super::menu::{MenuAction, MenuModel, StaticPage};
use super::UiState;
use crate::config::{DEVICE_NAME, DISPLAY_COLS, DISPLAY_ROWS, FIRMWARE_VERSION, OTP_PERIOD_SECS};
use crate::otp::{countdown_line, OtpCache, RefreshOutcome};
use crate::shared::StatusSnapshot;

/// Row holding the code on the OTP screen.
pub const CODE_ROW: u8 = 1;
/// Row holding the countdown on the OTP screen.
pub const COUNTDOWN_ROW: u8 = 2;

/// Placeholder while no code is cached.
pub const CODE_PLACEHOLDER: &str = "------";

/// One text row, truncated to the panel width.
pub type Line = String<DISPLAY_COLS>;

/// Text-row display collaborator.
pub trait TextPanel {
    type Error;

    /// Blank the whole frame.
    fn clear(&mut self) -> Result<(), Self::Error>;
    /// Blank one text row.
    fn clear_line(&mut self, row: u8) -> Result<(), Self::Error>;
    /// Draw `text` starting at character cell `(col, row)`.
    fn write_text(&mut self, col: u8, row: u8, text: &str) -> Result<(), Self::Error>;
    /// Push the frame to the glass.
    fn flush(&mut self) -> Result<(), Self::Error>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrawOp {
    Clear,
    ClearLine(u8),
    Text { col: u8, row: u8, text: Line },
    Flush,
}

/// Clear + one text op per row + flush.
pub const MAX_DRAW_OPS: usize = DISPLAY_ROWS as usize + 2;

pub type DrawList = Vec<DrawOp, MAX_DRAW_OPS>;

/// Everything the projector reads.
pub struct Frame<'a> {
    pub ui: UiState,
    pub menu: &'a MenuModel,
    pub otp: &'a OtpCache,
    pub redraw: bool,
    pub refresh: RefreshOutcome,
    pub status: &'a StatusSnapshot,
}

/// Copy `text` into a row, cutting at the panel width.
pub fn line(text: &str) -> Line {
    let mut out = Line::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

fn text(ops: &mut DrawList, row: u8, s: &str) {
    let _ = ops.push(DrawOp::Text {
        col: 0,
        row,
        text: line(s),
    });
}

/// Build the draw list for this tick. Empty means nothing to do.
pub fn project(frame: &Frame<'_>) -> DrawList {
    let mut ops = DrawList::new();

    if frame.redraw {
        let _ = ops.push(DrawOp::Clear);
        match frame.ui {
            UiState::Init => {
                text(&mut ops, 0, DEVICE_NAME);
                text(&mut ops, 1, "Press a button");
            }
            UiState::Menu => menu_rows(&mut ops, frame.menu),
            UiState::InMenuItem => match frame.menu.selected_option().map(|o| o.action) {
                Some(MenuAction::Page(page)) => page_rows(&mut ops, page, frame.status),
                _ => text(&mut ops, 0, "?"),
            },
            UiState::ShowCode => {
                text(&mut ops, 0, "OTP");
                text(&mut ops, CODE_ROW, frame.otp.code().unwrap_or(CODE_PLACEHOLDER));
                text(&mut ops, COUNTDOWN_ROW, &countdown_line(frame.otp.remaining()));
            }
        }
    } else if frame.ui == UiState::ShowCode {
        if frame.refresh.code_changed {
            let _ = ops.push(DrawOp::ClearLine(CODE_ROW));
            text(&mut ops, CODE_ROW, frame.otp.code().unwrap_or(CODE_PLACEHOLDER));
        }
        if frame.refresh.remaining_changed {
            let _ = ops.push(DrawOp::ClearLine(COUNTDOWN_ROW));
            text(&mut ops, COUNTDOWN_ROW, &countdown_line(frame.otp.remaining()));
        }
    }

    if !ops.is_empty() {
        let _ = ops.push(DrawOp::Flush);
    }
    ops
}

/// Title plus a scrolling window of options with a `>` cursor.
fn menu_rows(ops: &mut DrawList, menu: &MenuModel) {
    text(ops, 0, "Menu");

    let visible = usize::from(DISPLAY_ROWS - 1);
    let first = menu.selected().saturating_sub(visible - 1);
    for (slot, (index, option)) in menu
        .options()
        .iter()
        .enumerate()
        .skip(first)
        .take(visible)
        .enumerate()
    {
        let mut row = Line::new();
        let marker = if index == menu.selected() { '>' } else { ' ' };
        let _ = row.push(marker);
        let _ = row.push(' ');
        for c in option.label.chars() {
            if row.push(c).is_err() {
                break;
            }
        }
        let _ = ops.push(DrawOp::Text {
            col: 0,
            row: slot as u8 + 1,
            text: row,
        });
    }
}

fn page_rows(ops: &mut DrawList, page: StaticPage, status: &StatusSnapshot) {
    match page {
        StaticPage::Status => {
            text(ops, 0, "Status");

            let mut temp = Line::new();
            if status.sensor.sequence == 0 {
                let _ = temp.push_str("Temp: --");
            } else {
                let _ = write!(temp, "Temp: {}C", status.sensor.celsius);
            }
            text(ops, 1, &temp);

            let mut link = Line::new();
            let state = if status.connected { "connected" } else { "advertising" };
            let _ = write!(link, "BLE: {} #{}", state, status.notifications);
            text(ops, 2, &link);

            text(ops, 3, &inbox_line(&status.inbox));
        }
        StaticPage::About => {
            text(ops, 0, "About");
            text(ops, 1, DEVICE_NAME);
            let mut fw = Line::new();
            let _ = write!(fw, "fw {}", FIRMWARE_VERSION);
            text(ops, 2, &fw);
            let mut otp = Line::new();
            let _ = write!(otp, "TOTP {}s", OTP_PERIOD_SECS);
            text(ops, 3, &otp);
        }
    }
}

/// `RX: <payload>` as text when printable, hex otherwise.
pub fn inbox_line(inbox: &[u8]) -> Line {
    let mut out = Line::new();
    let _ = out.push_str("RX: ");
    if inbox.is_empty() {
        let _ = out.push('-');
    } else if inbox.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
        for &b in inbox {
            if out.push(b as char).is_err() {
                break;
            }
        }
    } else {
        for b in inbox {
            if write!(out, "{:02x}", b).is_err() {
                break;
            }
        }
    }
    out
}

/// Replay `ops` against the panel, stopping at the first error.
pub fn apply<P: TextPanel>(panel: &mut P, ops: &DrawList) -> Result<(), P::Error> {
    for op in ops {
        match op {
            DrawOp::Clear => panel.clear()?,
            DrawOp::ClearLine(row) => panel.clear_line(*row)?,
            DrawOp::Text { col, row, text } => panel.write_text(*col, *row, text)?,
            DrawOp::Flush => panel.flush()?,
        }
    }
    Ok(())
}
