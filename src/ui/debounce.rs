//! Button debounce handling.
//!
//! Provides time-based edge detection with debouncing to prevent
//! multiple triggers from contact bounce on physical buttons. Each
//! button owns its own transition timer, so activity on one button
//! never suppresses an edge on the other.

use super::ButtonId;

/// Debounced edge reported for one button on one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    #[default]
    None,
    Pressed,
    Released,
}

/// One tick's worth of raw pin reads, already inverted (true = pressed).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawSamples {
    pub navigate: bool,
    pub select: bool,
}

impl RawSamples {
    pub fn get(&self, id: ButtonId) -> bool {
        match id {
            ButtonId::Navigate => self.navigate,
            ButtonId::Select => self.select,
        }
    }
}

/// Debounced edges for both buttons on one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Edges {
    pub navigate: Edge,
    pub select: Edge,
}

impl Edges {
    pub fn get(&self, id: ButtonId) -> Edge {
        match id {
            ButtonId::Navigate => self.navigate,
            ButtonId::Select => self.select,
        }
    }

    fn set(&mut self, id: ButtonId, edge: Edge) {
        match id {
            ButtonId::Navigate => self.navigate = edge,
            ButtonId::Select => self.select = edge,
        }
    }
}

/// Per-button debounce state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ButtonTrack {
    held: bool,
    last_transition_ms: Option<u64>,
}

impl ButtonTrack {
    /// Create a new button state (not pressed, no transition yet).
    pub const fn new() -> Self {
        Self {
            held: false,
            last_transition_ms: None,
        }
    }

    /// Logical (debounced) level.
    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Feed one raw sample.
    ///
    /// A level change is accepted only if `window_ms` has passed since the
    /// last accepted transition; a rejected change leaves the timer alone.
    pub fn evaluate(&mut self, raw: bool, now_ms: u64, window_ms: u64) -> Edge {
        if raw == self.held {
            return Edge::None;
        }

        if let Some(last) = self.last_transition_ms {
            if now_ms.saturating_sub(last) < window_ms {
                return Edge::None;
            }
        }

        self.held = raw;
        self.last_transition_ms = Some(now_ms);

        if raw {
            Edge::Pressed
        } else {
            Edge::Released
        }
    }
}

impl Default for ButtonTrack {
    fn default() -> Self {
        Self::new()
    }
}

/// Debounce filter for both buttons.
pub struct Debouncer {
    tracks: [ButtonTrack; 2],
    window_ms: u64,
}

impl Debouncer {
    pub const fn new(window_ms: u64) -> Self {
        Self {
            tracks: [ButtonTrack::new(), ButtonTrack::new()],
            window_ms,
        }
    }

    /// Evaluate a single button.
    pub fn evaluate(&mut self, id: ButtonId, raw: bool, now_ms: u64) -> Edge {
        self.tracks[id.index()].evaluate(raw, now_ms, self.window_ms)
    }

    /// Evaluate both buttons for one tick.
    pub fn sample(&mut self, raw: RawSamples, now_ms: u64) -> Edges {
        let mut edges = Edges::default();
        for id in ButtonId::ALL {
            edges.set(id, self.evaluate(id, raw.get(id), now_ms));
        }
        edges
    }

    pub fn is_held(&self, id: ButtonId) -> bool {
        self.tracks[id.index()].is_held()
    }
}
