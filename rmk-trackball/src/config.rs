//! Tunables of the trackball.
//!
//! Constants here are the compile-time defaults. A board may override them by
//! deserializing a `[trackball]` table from its `keyboard.toml` into
//! [`TrackballConfig`]; fields that are left out keep their defaults.

use core::fmt;

use serde::Deserialize;

use crate::keycode::Chord;

/// Sensor resolution in normal mode
pub const CPI_FAST: u16 = 800;
/// Sensor resolution in precision mode, ~20% of [`CPI_FAST`]
pub const CPI_SLOW: u16 = 160;
/// Raw motion units per wheel tick
pub const SCROLL_STEP: StepSize = StepSize::new(8);
/// Raw motion units per zoom step, slightly less sensitive than scrolling
pub const ZOOM_STEP: StepSize = StepSize::new(12);

const _: () = assert!(CPI_SLOW > 0 && CPI_SLOW < CPI_FAST, "precision CPI must be below normal CPI");
const _: () = assert!(SCROLL_STEP.get() > 0 && ZOOM_STEP.get() > 0);

/// Errors when loading a [`TrackballConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A step size of zero would never emit a step
    ZeroStepSize,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroStepSize => write!(f, "step size must be greater than zero"),
        }
    }
}

/// Number of raw motion units which make one discrete step.
///
/// Always non-zero. Constructing a zero step in a `const` item fails to compile,
/// loading one from a config file fails with [`ConfigError::ZeroStepSize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(try_from = "u8")]
pub struct StepSize(u8);

impl StepSize {
    pub const fn new(step: u8) -> Self {
        assert!(step > 0, "step size must be greater than zero");
        Self(step)
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for StepSize {
    type Error = ConfigError;

    fn try_from(step: u8) -> Result<Self, Self::Error> {
        if step == 0 {
            Err(ConfigError::ZeroStepSize)
        } else {
            Ok(Self(step))
        }
    }
}

/// Sign applied to a quantized step count before it is emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    #[default]
    Normal,
    Inverted,
}

impl Polarity {
    pub const fn apply(self, steps: i16) -> i16 {
        match self {
            Polarity::Normal => steps,
            Polarity::Inverted => steps.saturating_neg(),
        }
    }
}

/// Per-axis polarity of the emitted wheel and zoom steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct PolarityConfig {
    /// Vertical wheel, driven by Y motion
    pub scroll_vertical: Polarity,
    /// Horizontal wheel, driven by X motion
    pub scroll_horizontal: Polarity,
    /// Zoom, driven by Y motion
    pub zoom: Polarity,
}

impl Default for PolarityConfig {
    fn default() -> Self {
        Self {
            scroll_vertical: Polarity::Inverted,
            scroll_horizontal: Polarity::Inverted,
            zoom: Polarity::Inverted,
        }
    }
}

/// How zoom steps reach the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum ZoomStyle {
    /// Tap the zoom-in/zoom-out chord once per step
    #[default]
    KeyTaps,
    /// Hold Ctrl and report the steps on the vertical wheel
    CtrlWheel,
}

/// Orientation fixups applied to raw motion before it's interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct Orientation {
    /// Invert X axis
    pub invert_x: bool,
    /// Invert Y axis
    pub invert_y: bool,
    /// Swap X and Y axes
    pub swap_xy: bool,
}

impl Orientation {
    pub fn apply(&self, mut dx: i16, mut dy: i16) -> (i16, i16) {
        if self.invert_x {
            dx = dx.saturating_neg();
        }
        if self.invert_y {
            dy = dy.saturating_neg();
        }
        if self.swap_xy {
            (dx, dy) = (dy, dx);
        }
        (dx, dy)
    }
}

/// Config of the trackball's motion handling
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct TrackballConfig {
    /// Resolution used in normal mode
    pub cpi_fast: u16,
    /// Resolution used in precision mode
    pub cpi_slow: u16,
    pub scroll_step: StepSize,
    pub zoom_step: StepSize,
    pub polarity: PolarityConfig,
    pub zoom_style: ZoomStyle,
    /// Chord tapped for each positive zoom step
    pub zoom_in: Chord,
    /// Chord tapped for each negative zoom step
    pub zoom_out: Chord,
    pub orientation: Orientation,
    /// Sensor polling interval when the sensor has no motion pin
    pub poll_interval_ms: u16,
}

impl Default for TrackballConfig {
    fn default() -> Self {
        Self {
            cpi_fast: CPI_FAST,
            cpi_slow: CPI_SLOW,
            scroll_step: SCROLL_STEP,
            zoom_step: ZOOM_STEP,
            polarity: PolarityConfig::default(),
            zoom_style: ZoomStyle::KeyTaps,
            zoom_in: Chord::ZOOM_IN,
            zoom_out: Chord::ZOOM_OUT,
            orientation: Orientation {
                invert_y: true,
                ..Default::default()
            },
            poll_interval_ms: 1,
        }
    }
}

impl TrackballConfig {
    /// Zoom by holding Ctrl while the vertical wheel turns.
    ///
    /// Zoom shares the scroll sensitivity and horizontal scrolling follows the
    /// raw X direction.
    pub fn ctrl_wheel() -> Self {
        Self {
            zoom_step: SCROLL_STEP,
            zoom_style: ZoomStyle::CtrlWheel,
            polarity: PolarityConfig {
                scroll_horizontal: Polarity::Normal,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
