//! Main-loop state and the per-tick pipeline.
//!
//! [`Device`] owns everything only the main loop may touch: debouncer,
//! navigation state, OTP cache and wall clock. One call to [`Device::tick`]
//! runs the whole pipeline in a fixed order:
//!
//! ```text
//! debounce → route → (invalidate OTP on exit) → OTP refresh → project → apply
//! ```

use crate::clock::WallClock;
use crate::config::{BUTTON_DEBOUNCE_MS, CLOCK_MAX_UNIX_SECS};
use crate::error::{Error, OtpError};
use crate::otp::{CodeGenerator, OtpCache, RefreshEngine, RefreshOutcome};
use crate::shared::{LinkEvent, StatusSnapshot};
use crate::ui::debounce::{Debouncer, Edges, RawSamples};
use crate::ui::input_logic::InputRouter;
use crate::ui::menu::{MenuModel, Transition};
use crate::ui::projector::{self, Frame, TextPanel};
use crate::ui::UiState;

/// What happened during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub edges: Edges,
    pub transition: Option<Transition>,
    pub refresh: RefreshOutcome,
    pub otp_error: Option<OtpError>,
    /// The panel rejected a draw; a full repaint is queued.
    pub display_error: bool,
    /// At least one draw operation reached the panel.
    pub drew: bool,
}

impl TickReport {
    /// The failure worth logging for this tick, if any.
    pub fn error(&self) -> Option<Error> {
        if self.display_error {
            Some(Error::Display)
        } else {
            self.otp_error.map(Error::from)
        }
    }
}

pub struct Device<G> {
    debouncer: Debouncer,
    router: InputRouter,
    otp: RefreshEngine<G>,
    clock: WallClock,
    secret: &'static str,
    link_up: bool,
}

impl<G: CodeGenerator> Device<G> {
    pub fn new(generator: G, menu: MenuModel, secret: &'static str, clock: WallClock) -> Self {
        Self::with_engine(RefreshEngine::new(generator), menu, secret, clock)
    }

    /// Build around a pre-configured refresh engine.
    pub fn with_engine(
        otp: RefreshEngine<G>,
        menu: MenuModel,
        secret: &'static str,
        clock: WallClock,
    ) -> Self {
        Self {
            debouncer: Debouncer::new(BUTTON_DEBOUNCE_MS),
            router: InputRouter::new(menu),
            otp,
            clock,
            secret,
            link_up: false,
        }
    }

    pub fn state(&self) -> UiState {
        self.router.state()
    }

    pub fn menu(&self) -> &MenuModel {
        self.router.menu()
    }

    pub fn otp(&self) -> &OtpCache {
        self.otp.cache()
    }

    pub fn link_up(&self) -> bool {
        self.link_up
    }

    pub fn unix_secs(&self, uptime_ms: u64) -> u64 {
        self.clock.unix_secs(uptime_ms)
    }

    /// Apply a message from the BLE side.
    pub fn handle_link_event(&mut self, event: LinkEvent, uptime_ms: u64) {
        match event {
            LinkEvent::Connected => {
                info!("BLE: central connected");
                self.link_up = true;
            }
            LinkEvent::Disconnected => {
                info!("BLE: central disconnected");
                self.link_up = false;
            }
            LinkEvent::ClockSet(unix_secs) if unix_secs > CLOCK_MAX_UNIX_SECS => {
                warn!("Clock: ignoring implausible time {}", unix_secs);
            }
            LinkEvent::ClockSet(unix_secs) => {
                info!("Clock: set to {}", unix_secs);
                self.clock.set(unix_secs, uptime_ms);
                // Codes computed against the old base are stale.
                self.otp.invalidate();
            }
        }
    }

    /// Run one main-loop tick.
    pub fn tick<P: TextPanel>(
        &mut self,
        raw: RawSamples,
        uptime_ms: u64,
        status: &StatusSnapshot,
        panel: &mut P,
    ) -> TickReport {
        let mut report = TickReport {
            edges: self.debouncer.sample(raw, uptime_ms),
            ..TickReport::default()
        };

        report.transition = self.router.route(report.edges);
        if report.transition.is_some_and(|t| t.leaves_code) {
            self.otp.invalidate();
        }

        if self.router.state() == UiState::ShowCode {
            let unix_secs = self.clock.unix_secs(uptime_ms);
            match self.otp.maybe_refresh(uptime_ms, unix_secs, self.secret) {
                Ok(outcome) => report.refresh = outcome,
                Err(e) => {
                    warn!("OTP: generation failed: {}", e);
                    report.otp_error = Some(e);
                }
            }
        }

        let redraw = self.router.take_redraw();
        let ops = projector::project(&Frame {
            ui: self.router.state(),
            menu: self.router.menu(),
            otp: self.otp.cache(),
            redraw,
            refresh: report.refresh,
            status,
        });
        if ops.is_empty() {
            return report;
        }

        match projector::apply(panel, &ops) {
            Ok(()) => report.drew = true,
            Err(_) => {
                warn!("Display: draw failed, full repaint queued");
                self.router.request_redraw();
                report.display_error = true;
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::otp::{Digits, Totp};
    use crate::ui::menu::DEFAULT_MENU;
    use crate::ui::projector::CODE_ROW;

    const SECRET: &str = "JBSWY3DPEHPK3PXP";
    const T0: u64 = 1_700_000_010;

    #[derive(Default)]
    struct Panel {
        clears: u32,
        lines: std::vec::Vec<(u8, std::string::String)>,
        fail: bool,
    }

    impl TextPanel for Panel {
        type Error = ();

        fn clear(&mut self) -> Result<(), ()> {
            if self.fail {
                return Err(());
            }
            self.clears += 1;
            self.lines.clear();
            Ok(())
        }

        fn clear_line(&mut self, row: u8) -> Result<(), ()> {
            self.lines.retain(|(r, _)| *r != row);
            Ok(())
        }

        fn write_text(&mut self, _col: u8, row: u8, text: &str) -> Result<(), ()> {
            self.lines.push((row, text.into()));
            Ok(())
        }

        fn flush(&mut self) -> Result<(), ()> {
            Ok(())
        }
    }

    impl Panel {
        fn row(&self, row: u8) -> Option<&str> {
            self.lines.iter().find(|(r, _)| *r == row).map(|(_, t)| t.as_str())
        }
    }

    struct Broken;

    impl CodeGenerator for Broken {
        fn generate(&self, _secret: &str, _unix_secs: u64) -> Result<Digits, OtpError> {
            Err(OtpError::InvalidSecret)
        }
    }

    const IDLE: RawSamples = RawSamples { navigate: false, select: false };
    const SELECT: RawSamples = RawSamples { navigate: false, select: true };

    /// Press and release Select, each step well outside the debounce window.
    fn click_select<G: CodeGenerator>(dev: &mut Device<G>, panel: &mut Panel, now: &mut u64) {
        let status = StatusSnapshot::default();
        *now += 200;
        dev.tick(SELECT, *now, &status, panel);
        *now += 200;
        dev.tick(IDLE, *now, &status, panel);
    }

    fn device() -> Device<Totp> {
        Device::new(Totp::default(), MenuModel::new(&DEFAULT_MENU), SECRET, WallClock::new(T0, 0))
    }

    #[test]
    fn boot_paints_splash_once() {
        let mut dev = device();
        let mut panel = Panel::default();
        let status = StatusSnapshot::default();

        let first = dev.tick(IDLE, 0, &status, &mut panel);
        assert!(first.drew);
        assert_eq!(panel.row(0), Some("GeekOTP"));

        let second = dev.tick(IDLE, 20, &status, &mut panel);
        assert!(!second.drew);
        assert_eq!(panel.clears, 1);
    }

    #[test]
    fn entering_code_screen_shows_code_on_same_tick() {
        let mut dev = device();
        let mut panel = Panel::default();
        let mut now = 0;
        dev.tick(IDLE, now, &StatusSnapshot::default(), &mut panel);

        click_select(&mut dev, &mut panel, &mut now); // Init -> Menu
        click_select(&mut dev, &mut panel, &mut now); // "OTP code" -> ShowCode
        assert_eq!(dev.state(), UiState::ShowCode);

        let code = panel.row(CODE_ROW).unwrap();
        assert_eq!(code.len(), 7);
        assert_eq!(&code[3..4], "-");
        assert_eq!(dev.otp().code(), Some(code));
    }

    #[test]
    fn leaving_code_screen_drops_cache() {
        let mut dev = device();
        let mut panel = Panel::default();
        let mut now = 0;
        click_select(&mut dev, &mut panel, &mut now);
        click_select(&mut dev, &mut panel, &mut now);
        assert!(dev.otp().code().is_some());

        click_select(&mut dev, &mut panel, &mut now); // back to Menu
        assert_eq!(dev.state(), UiState::Menu);
        assert_eq!(dev.otp().code(), None);

        let before = panel.clears;
        click_select(&mut dev, &mut panel, &mut now);
        assert_eq!(panel.clears, before + 1);
        assert!(panel.row(CODE_ROW).is_some_and(|c| c.len() == 7));
    }

    #[test]
    fn countdown_ticks_without_full_clear() {
        let mut dev = device();
        let mut panel = Panel::default();
        let mut now = 0;
        click_select(&mut dev, &mut panel, &mut now);
        click_select(&mut dev, &mut panel, &mut now);
        let clears = panel.clears;
        let status = StatusSnapshot::default();

        let r = dev.tick(IDLE, now + 1_000, &status, &mut panel);
        assert!(r.refresh.remaining_changed);
        assert!(r.drew);
        assert_eq!(panel.clears, clears);
    }

    #[test]
    fn otp_failure_is_reported_and_screen_survives() {
        let mut dev = Device::new(Broken, MenuModel::new(&DEFAULT_MENU), SECRET, WallClock::new(T0, 0));
        let mut panel = Panel::default();
        let mut now = 0;
        click_select(&mut dev, &mut panel, &mut now);
        now += 200;
        let r = dev.tick(SELECT, now, &StatusSnapshot::default(), &mut panel);
        assert_eq!(r.otp_error, None);
        now += 200;
        let r = dev.tick(IDLE, now, &StatusSnapshot::default(), &mut panel);
        assert_eq!(dev.state(), UiState::ShowCode);
        assert_eq!(r.otp_error, Some(OtpError::InvalidSecret));
        assert_eq!(panel.row(CODE_ROW), Some("------"));

        // Not retried until the refresh interval has passed.
        let r = dev.tick(IDLE, now + 20, &StatusSnapshot::default(), &mut panel);
        assert_eq!(r.otp_error, None);
    }

    #[test]
    fn failed_draw_queues_full_repaint() {
        let mut dev = device();
        let mut panel = Panel { fail: true, ..Panel::default() };
        let status = StatusSnapshot::default();

        let r = dev.tick(IDLE, 0, &status, &mut panel);
        assert!(r.display_error);
        assert!(!r.drew);

        panel.fail = false;
        let r = dev.tick(IDLE, 20, &status, &mut panel);
        assert!(r.drew);
        assert_eq!(panel.row(0), Some("GeekOTP"));
    }

    #[test]
    fn link_events_update_state() {
        let mut dev = device();
        dev.handle_link_event(LinkEvent::Connected, 0);
        assert!(dev.link_up());
        dev.handle_link_event(LinkEvent::Disconnected, 0);
        assert!(!dev.link_up());
    }

    #[test]
    fn clock_set_reanchors_and_recomputes() {
        let mut dev = device();
        let mut panel = Panel::default();
        let mut now = 0;
        click_select(&mut dev, &mut panel, &mut now);
        click_select(&mut dev, &mut panel, &mut now);
        let old = dev.otp().code().map(std::string::String::from);

        dev.handle_link_event(LinkEvent::ClockSet(59), now);
        assert_eq!(dev.unix_secs(now), 59);
        assert_eq!(dev.otp().code(), None);

        let r = dev.tick(IDLE, now + 20, &StatusSnapshot::default(), &mut panel);
        assert!(r.refresh.code_changed);
        assert_ne!(dev.otp().code().map(std::string::String::from), old);
        assert_eq!(panel.row(2), Some("Next in: 1s"));
    }

    #[test]
    fn implausible_clock_set_is_ignored() {
        let mut dev = device();
        let mut panel = Panel::default();
        let mut now = 0;
        click_select(&mut dev, &mut panel, &mut now);
        click_select(&mut dev, &mut panel, &mut now);
        let before = dev.unix_secs(now);
        let code = dev.otp().code().map(std::string::String::from);

        dev.handle_link_event(LinkEvent::ClockSet(u64::MAX), now);
        assert_eq!(dev.unix_secs(now), before);
        assert_eq!(dev.otp().code().map(std::string::String::from), code);

        now += 60_000;
        assert_eq!(dev.unix_secs(now), before + 60);
        let r = dev.tick(IDLE, now, &StatusSnapshot::default(), &mut panel);
        assert_eq!(r.error(), None);
        assert_eq!(dev.state(), UiState::ShowCode);

        dev.handle_link_event(LinkEvent::ClockSet(CLOCK_MAX_UNIX_SECS), now);
        assert_eq!(dev.unix_secs(now), CLOCK_MAX_UNIX_SECS);
        let r = dev.tick(IDLE, now + 1_000, &StatusSnapshot::default(), &mut panel);
        assert!(r.refresh.code_changed);
    }

    #[test]
    fn report_error_prefers_display_failure() {
        let otp = TickReport {
            otp_error: Some(OtpError::InvalidSecret),
            ..TickReport::default()
        };
        assert_eq!(otp.error(), Some(Error::Otp(OtpError::InvalidSecret)));

        let both = TickReport {
            display_error: true,
            ..otp
        };
        assert_eq!(both.error(), Some(Error::Display));
        assert_eq!(TickReport::default().error(), None);
    }
}
