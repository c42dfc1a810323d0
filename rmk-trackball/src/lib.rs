//! # RMK Trackball
//!
//! Motion handling for keyboards with a trackball. Raw sensor motion is either
//! passed through as pointer movement, quantized into scroll-wheel ticks, or
//! turned into zoom gestures, depending on which mode key is held.
//!
//! - [`quantizer`] - the mode dispatcher and step quantization, pure and synchronous
//! - [`processor`] - sends the quantizer's output as mouse reports and key actions
//! - [`device`] - sensor traits and the polling task
//!
//! ## Feature flags
#![doc = document_features::document_features!()]
#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod accumulator;
pub mod config;
pub mod device;
pub mod keycode;
pub mod mode;
pub mod processor;
pub mod quantizer;
pub mod report;

pub use config::TrackballConfig;
pub use device::{MotionData, MotionSensor, ResolutionSink, SensorError, TrackballDevice};
pub use keycode::{Chord, HidModifiers, KeyAction, KeySink};
pub use mode::{Mode, ModeControl, Precision};
pub use processor::{ControlEvent, TrackballProcessor};
pub use quantizer::{MotionQuantizer, StepResult};
pub use report::MotionReport;
