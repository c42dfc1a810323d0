//! Turns trackball motion and control key edges into HID reports

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Sender;
use usbd_hid::descriptor::MouseReport;

use crate::config::{Orientation, TrackballConfig};
use crate::device::{MotionData, ResolutionSink};
use crate::keycode::{Chord, HidModifiers, KeySink};
use crate::mode::{Mode, ModeControl};
use crate::quantizer::{MotionQuantizer, ZoomDirection};
use crate::report::MotionReport;

/// Edges of the trackball's control keys, published by the keymap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlEvent {
    /// A mode key was pressed or released
    Mode { control: ModeControl, pressed: bool },
    /// The precision key was pressed
    TogglePrecision,
    /// Mouse buttons changed, the trackball reports them along with its motion
    MouseButtons(u8),
}

/// TrackballProcessor drives a [`MotionQuantizer`].
///
/// Mouse reports go to `reports`. Zoom chords and the ctrl-wheel modifier go
/// to `keys`, so they are merged with whatever the keyboard holds.
pub struct TrackballProcessor<'a, K: KeySink, M: RawMutex, const N: usize> {
    quantizer: MotionQuantizer,
    orientation: Orientation,
    zoom_in: Chord,
    zoom_out: Chord,
    buttons: u8,
    modifier_held: bool,
    reports: Sender<'a, M, MouseReport, N>,
    keys: K,
}

impl<'a, K: KeySink, M: RawMutex, const N: usize> TrackballProcessor<'a, K, M, N> {
    pub fn new(config: &TrackballConfig, reports: Sender<'a, M, MouseReport, N>, keys: K) -> Self {
        Self {
            quantizer: MotionQuantizer::new(config),
            orientation: config.orientation,
            zoom_in: config.zoom_in,
            zoom_out: config.zoom_out,
            buttons: 0,
            modifier_held: false,
            reports,
            keys,
        }
    }

    pub fn quantizer(&self) -> &MotionQuantizer {
        &self.quantizer
    }

    /// Whether Ctrl is currently held for ctrl-wheel zooming
    pub fn zoom_modifier_held(&self) -> bool {
        self.modifier_held
    }

    /// Process the motion of one poll cycle
    pub async fn on_motion(&mut self, motion: MotionData) {
        let (dx, dy) = self.orientation.apply(motion.dx, motion.dy);
        let result = self.quantizer.quantize(MotionData { dx, dy });

        // Ctrl must be down before the wheel report which it modifies
        if result.zoom_modifier && !self.modifier_held {
            self.set_modifier_held(true).await;
        }

        if let Some(burst) = result.zoom {
            let chord = match burst.direction {
                ZoomDirection::In => self.zoom_in,
                ZoomDirection::Out => self.zoom_out,
            };
            trace!("Zoom {:?} x{}", burst.direction, burst.count);
            for _ in 0..burst.count {
                self.keys.tap_chord(chord).await;
            }
        }

        self.send_motion(result.report).await;

        if !result.zoom_modifier && self.modifier_held {
            self.set_modifier_held(false).await;
        }
    }

    /// Process a control key edge.
    ///
    /// Resolution changes go to `sink` right away, a failing sink is logged and
    /// the new precision is kept.
    pub async fn on_control<R: ResolutionSink>(&mut self, event: ControlEvent, sink: &mut R) {
        match event {
            ControlEvent::Mode { control, pressed } => {
                self.quantizer.set_mode(control, pressed);
                if self.modifier_held && self.quantizer.mode() != Mode::Zoom {
                    self.set_modifier_held(false).await;
                }
            }
            ControlEvent::TogglePrecision => {
                let cpi = self.quantizer.toggle_precision();
                if let Err(e) = sink.set_cpi(cpi).await {
                    warn!("Failed to set trackball cpi to {}: {:?}", cpi, e);
                }
            }
            ControlEvent::MouseButtons(buttons) => {
                if buttons != self.buttons {
                    self.buttons = buttons;
                    let report = MotionReport::default().take_mouse_report(self.buttons);
                    self.reports.send(report).await;
                }
            }
        }
    }

    /// Send `report`, split over as many mouse reports as its deltas need
    async fn send_motion(&self, mut report: MotionReport) {
        while !report.is_empty() {
            let mouse_report = report.take_mouse_report(self.buttons);
            self.reports.send(mouse_report).await;
        }
    }

    async fn set_modifier_held(&mut self, held: bool) {
        self.modifier_held = held;
        if held {
            self.keys.hold_modifier(HidModifiers::LCTRL).await;
        } else {
            self.keys.release_modifier(HidModifiers::LCTRL).await;
        }
    }
}
