//! Interpretation modes of the trackball

/// How motion is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Motion moves the pointer
    #[default]
    Normal,
    /// Motion turns the vertical and horizontal wheels
    Scroll,
    /// Vertical motion zooms
    Zoom,
}

/// The two held keys which select a mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeControl {
    Scroll,
    Zoom,
}

/// Sensor resolution selection, independent from [`Mode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Precision {
    #[default]
    Fast,
    Slow,
}

impl Precision {
    pub const fn toggled(self) -> Self {
        match self {
            Precision::Fast => Precision::Slow,
            Precision::Slow => Precision::Fast,
        }
    }
}

/// Held state of the mode keys.
///
/// Both keys can be held at the same time, zoom wins over scroll then.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeState {
    scroll_held: bool,
    zoom_held: bool,
}

impl ModeState {
    pub const fn new() -> Self {
        Self {
            scroll_held: false,
            zoom_held: false,
        }
    }

    pub fn set(&mut self, control: ModeControl, pressed: bool) {
        match control {
            ModeControl::Scroll => self.scroll_held = pressed,
            ModeControl::Zoom => self.zoom_held = pressed,
        }
    }

    pub const fn mode(&self) -> Mode {
        if self.zoom_held {
            Mode::Zoom
        } else if self.scroll_held {
            Mode::Scroll
        } else {
            Mode::Normal
        }
    }
}
