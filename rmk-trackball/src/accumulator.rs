//! Step quantization of relative motion.
//!
//! An [`Accumulator`] keeps the motion which hasn't added up to a full step yet,
//! so slow and small movements still produce wheel ticks eventually and nothing
//! drifts over time.

use crate::config::StepSize;

/// Sub-step residual motion of one axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Accumulator {
    residual: i32,
}

impl Accumulator {
    pub const fn new() -> Self {
        Self { residual: 0 }
    }

    /// Motion carried over to the next call, always in `(-step, step)`
    pub const fn residual(&self) -> i32 {
        self.residual
    }

    pub fn reset(&mut self) {
        self.residual = 0;
    }

    /// Add `delta` and take out as many whole steps as possible.
    ///
    /// Returns the signed number of steps. A single large delta may yield
    /// several steps. Whatever remains keeps the sign of the accumulated
    /// motion, which is the same outcome as subtracting `step` while the
    /// residual is `>= step` and adding it while the residual is `<= -step`.
    pub fn quantize(&mut self, delta: i16, step: StepSize) -> i16 {
        let step = step.get() as i32;
        let acc = self.residual + delta as i32;
        // Truncating division rounds towards zero for both signs
        self.residual = acc % step;
        // Fits in i16 for every step size, clamp only keeps the cast lossless
        (acc / step).clamp(i16::MIN as i32, i16::MAX as i32) as i16
    }
}
