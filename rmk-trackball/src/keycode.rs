//! Keys which the trackball taps or holds on behalf of the user.
//!
//! The trackball never writes keyboard reports itself. It hands [`KeyAction`]s
//! to a [`KeySink`], which the keyboard implements by merging them into its
//! own held keys and modifiers, so keys held on the keyboard stay held.
use core::ops::BitOr;

use bitfield_struct::bitfield;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Sender;
use serde::Deserialize;

/// HID usage of `-` / `_`
pub const HID_KEY_MINUS: u8 = 0x2D;
/// HID usage of `=` / `+`
pub const HID_KEY_EQUAL: u8 = 0x2E;

/// Modifier byte of a keyboard report, bit order follows the HID spec
#[bitfield(u8, order = Lsb, defmt = cfg(feature = "defmt"))]
#[derive(Eq, PartialEq, Deserialize)]
pub struct HidModifiers {
    #[bits(1)]
    pub left_ctrl: bool,
    #[bits(1)]
    pub left_shift: bool,
    #[bits(1)]
    pub left_alt: bool,
    #[bits(1)]
    pub left_gui: bool,
    #[bits(1)]
    pub right_ctrl: bool,
    #[bits(1)]
    pub right_shift: bool,
    #[bits(1)]
    pub right_alt: bool,
    #[bits(1)]
    pub right_gui: bool,
}

impl HidModifiers {
    pub const LCTRL: Self = Self::new().with_left_ctrl(true);
}

impl BitOr for HidModifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.into_bits() | rhs.into_bits())
    }
}

/// A key pressed together with modifiers, like `Ctrl + =`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Chord {
    pub modifiers: HidModifiers,
    /// HID usage id of the key
    pub key: u8,
}

impl Chord {
    /// `Ctrl + =`, zoom in for most apps
    pub const ZOOM_IN: Self = Self::new(HidModifiers::LCTRL, HID_KEY_EQUAL);
    /// `Ctrl + -`, zoom out for most apps
    pub const ZOOM_OUT: Self = Self::new(HidModifiers::LCTRL, HID_KEY_MINUS);

    pub const fn new(modifiers: HidModifiers, key: u8) -> Self {
        Self { modifiers, key }
    }
}

/// Key actions requested by the trackball
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyAction {
    /// Press and release `Chord`, on top of whatever is held
    Tap(Chord),
    /// Add modifiers to the held modifiers until released
    Hold(HidModifiers),
    /// Release modifiers added by [`KeyAction::Hold`]
    Release(HidModifiers),
}

/// Receiver of the trackball's key actions, implemented by the keyboard.
///
/// The trackball sends its wheel report right after `hold_modifier` returns,
/// so the held modifier should have reached the host by then.
pub trait KeySink {
    async fn tap_chord(&mut self, chord: Chord);
    async fn hold_modifier(&mut self, modifiers: HidModifiers);
    async fn release_modifier(&mut self, modifiers: HidModifiers);
}

/// Forward key actions to the keyboard task through a channel
impl<M: RawMutex, const N: usize> KeySink for Sender<'_, M, KeyAction, N> {
    async fn tap_chord(&mut self, chord: Chord) {
        self.send(KeyAction::Tap(chord)).await;
    }

    async fn hold_modifier(&mut self, modifiers: HidModifiers) {
        self.send(KeyAction::Hold(modifiers)).await;
    }

    async fn release_modifier(&mut self, modifiers: HidModifiers) {
        self.send(KeyAction::Release(modifiers)).await;
    }
}

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embassy_sync::channel::Channel;

    use super::*;

    #[test]
    fn test_modifier_bits() {
        assert_eq!(HidModifiers::LCTRL.into_bits(), 0x01);
        assert_eq!(HidModifiers::new().with_left_shift(true).into_bits(), 0x02);
        assert_eq!(HidModifiers::new().with_right_gui(true).into_bits(), 0x80);
        let combined = HidModifiers::LCTRL | HidModifiers::new().with_left_shift(true);
        assert_eq!(combined.into_bits(), 0x03);
    }

    #[test]
    fn test_zoom_chords() {
        assert_eq!(Chord::ZOOM_IN.modifiers, HidModifiers::LCTRL);
        assert_eq!(Chord::ZOOM_IN.key, HID_KEY_EQUAL);
        assert_eq!(Chord::ZOOM_OUT.modifiers, HidModifiers::LCTRL);
        assert_eq!(Chord::ZOOM_OUT.key, HID_KEY_MINUS);
    }

    #[test]
    fn test_channel_key_sink() {
        let channel: Channel<NoopRawMutex, KeyAction, 4> = Channel::new();
        let mut sink = channel.sender();
        block_on(sink.hold_modifier(HidModifiers::LCTRL));
        block_on(sink.tap_chord(Chord::ZOOM_OUT));
        block_on(sink.release_modifier(HidModifiers::LCTRL));

        assert_eq!(channel.try_receive(), Ok(KeyAction::Hold(HidModifiers::LCTRL)));
        assert_eq!(channel.try_receive(), Ok(KeyAction::Tap(Chord::ZOOM_OUT)));
        assert_eq!(channel.try_receive(), Ok(KeyAction::Release(HidModifiers::LCTRL)));
        assert!(channel.try_receive().is_err());
    }
}
