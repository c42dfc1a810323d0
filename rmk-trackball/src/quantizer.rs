//! Motion quantizer and mode dispatcher.
//!
//! [`MotionQuantizer`] owns the whole mutable state of the trackball's motion
//! handling: the mode keys, the precision toggle and one accumulator per
//! quantized axis. All three operations are synchronous and infallible, they
//! are meant to be called serially from one polling task.

use crate::accumulator::Accumulator;
use crate::config::{PolarityConfig, StepSize, TrackballConfig, ZoomStyle};
use crate::device::MotionData;
use crate::mode::{Mode, ModeControl, ModeState, Precision};
use crate::report::MotionReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ZoomDirection {
    In,
    Out,
}

/// Number of zoom chord taps to issue in one poll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ZoomBurst {
    pub direction: ZoomDirection,
    pub count: u16,
}

/// Output of one [`MotionQuantizer::quantize`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepResult {
    /// Pointer and wheel deltas to report to the host
    pub report: MotionReport,
    /// Zoom chord taps, only in [`ZoomStyle::KeyTaps`]
    pub zoom: Option<ZoomBurst>,
    /// Whether the zoom modifier should be held, only in [`ZoomStyle::CtrlWheel`]
    pub zoom_modifier: bool,
}

pub struct MotionQuantizer {
    modes: ModeState,
    precision: Precision,
    scroll_x: Accumulator,
    scroll_y: Accumulator,
    zoom_y: Accumulator,
    scroll_step: StepSize,
    zoom_step: StepSize,
    polarity: PolarityConfig,
    zoom_style: ZoomStyle,
    cpi_fast: u16,
    cpi_slow: u16,
}

impl MotionQuantizer {
    pub fn new(config: &TrackballConfig) -> Self {
        Self {
            modes: ModeState::new(),
            precision: Precision::Fast,
            scroll_x: Accumulator::new(),
            scroll_y: Accumulator::new(),
            zoom_y: Accumulator::new(),
            scroll_step: config.scroll_step,
            zoom_step: config.zoom_step,
            polarity: config.polarity,
            zoom_style: config.zoom_style,
            cpi_fast: config.cpi_fast,
            cpi_slow: config.cpi_slow,
        }
    }

    pub fn mode(&self) -> Mode {
        self.modes.mode()
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Resolution for the current precision
    pub fn cpi(&self) -> u16 {
        match self.precision {
            Precision::Fast => self.cpi_fast,
            Precision::Slow => self.cpi_slow,
        }
    }

    /// Residual motion of the scroll accumulators, `(x, y)`
    pub fn scroll_residual(&self) -> (i32, i32) {
        (self.scroll_x.residual(), self.scroll_y.residual())
    }

    /// Residual motion of the zoom accumulator
    pub fn zoom_residual(&self) -> i32 {
        self.zoom_y.residual()
    }

    fn reset_accumulators(&mut self) {
        self.scroll_x.reset();
        self.scroll_y.reset();
        self.zoom_y.reset();
    }

    /// Handle a press or release of a mode key.
    ///
    /// Pressing always starts the mode from clean accumulators. Releasing one key
    /// while the other is still held switches to the other mode, which starts
    /// clean too.
    pub fn set_mode(&mut self, control: ModeControl, pressed: bool) {
        let before = self.modes.mode();
        self.modes.set(control, pressed);
        let after = self.modes.mode();
        if pressed || before != after {
            self.reset_accumulators();
        }
        if before != after {
            debug!("Trackball mode: {:?} -> {:?}", before, after);
        }
    }

    /// Flip precision, returns the resolution the sensor should use now
    pub fn toggle_precision(&mut self) -> u16 {
        self.precision = self.precision.toggled();
        let cpi = self.cpi();
        info!("Trackball precision {:?}, cpi {}", self.precision, cpi);
        cpi
    }

    /// Interpret one motion sample according to the current mode
    pub fn quantize(&mut self, motion: MotionData) -> StepResult {
        match self.modes.mode() {
            Mode::Normal => {
                self.reset_accumulators();
                StepResult {
                    report: MotionReport::pointer(motion.dx, motion.dy),
                    ..Default::default()
                }
            }
            Mode::Scroll => {
                let v = self.scroll_y.quantize(motion.dy, self.scroll_step);
                let h = self.scroll_x.quantize(motion.dx, self.scroll_step);
                StepResult {
                    report: MotionReport::scroll(
                        self.polarity.scroll_vertical.apply(v),
                        self.polarity.scroll_horizontal.apply(h),
                    ),
                    ..Default::default()
                }
            }
            Mode::Zoom => {
                let steps = self.zoom_y.quantize(motion.dy, self.zoom_step);
                let steps = self.polarity.zoom.apply(steps);
                match self.zoom_style {
                    ZoomStyle::KeyTaps => StepResult {
                        zoom: zoom_burst(steps),
                        ..Default::default()
                    },
                    ZoomStyle::CtrlWheel => StepResult {
                        report: MotionReport::scroll(steps, 0),
                        zoom: None,
                        zoom_modifier: steps != 0,
                    },
                }
            }
        }
    }
}

fn zoom_burst(steps: i16) -> Option<ZoomBurst> {
    let direction = match steps {
        0 => return None,
        s if s > 0 => ZoomDirection::In,
        _ => ZoomDirection::Out,
    };
    Some(ZoomBurst {
        direction,
        count: steps.unsigned_abs(),
    })
}
