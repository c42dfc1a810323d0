//! Reports produced by the trackball
use usbd_hid::descriptor::MouseReport;

/// Pointer and wheel deltas of one poll cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionReport {
    pub x: i16,
    pub y: i16,
    /// Vertical wheel
    pub wheel: i16,
    /// Horizontal wheel
    pub pan: i16,
}

impl MotionReport {
    pub const fn pointer(x: i16, y: i16) -> Self {
        Self { x, y, wheel: 0, pan: 0 }
    }

    pub const fn scroll(wheel: i16, pan: i16) -> Self {
        Self { x: 0, y: 0, wheel, pan }
    }

    pub const fn is_empty(&self) -> bool {
        self.x == 0 && self.y == 0 && self.wheel == 0 && self.pan == 0
    }

    /// Take as much of the deltas as fits in one HID mouse report.
    ///
    /// What doesn't fit in `i8` stays in `self`, keep taking until it's empty.
    pub fn take_mouse_report(&mut self, buttons: u8) -> MouseReport {
        MouseReport {
            buttons,
            x: take_i8(&mut self.x),
            y: take_i8(&mut self.y),
            wheel: take_i8(&mut self.wheel),
            pan: take_i8(&mut self.pan),
        }
    }
}

fn take_i8(v: &mut i16) -> i8 {
    let taken = (*v).clamp(i8::MIN as i16, i8::MAX as i16);
    *v -= taken;
    taken as i8
}
