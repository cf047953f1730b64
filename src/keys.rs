//! Key state table shared between the keyboard listener and the serial bridge.
//!
//! Movement keys (W/A/S/D) hold either `0` or [`FULL_THROW`]. Modifier keys
//! (X/Z) are tracked as plain pressed flags and exposed as their bit in the
//! flag accumulator: X owns bit 0, Z owns bit 1.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::frame::{self, Frame};

/// Value a movement slot takes while its key is held.
pub const FULL_THROW: u8 = 80;

/// Accumulator bit owned by the X key.
pub const FLAG_X: u8 = 0b01;
/// Accumulator bit owned by the Z key.
pub const FLAG_Z: u8 = 0b10;

/// The keys the bridge tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedKey {
    W,
    A,
    S,
    D,
    Z,
    X,
}

/// Raw slot values at one instant, as they go into a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeySnapshot {
    pub w: u8,
    pub a: u8,
    pub s: u8,
    pub d: u8,
    pub z: u8,
    pub x: u8,
}

#[derive(Debug, Default)]
struct Table {
    w: u8,
    a: u8,
    s: u8,
    d: u8,
    z_pressed: bool,
    x_pressed: bool,
}

impl Table {
    fn snapshot(&self) -> KeySnapshot {
        KeySnapshot {
            w: self.w,
            a: self.a,
            s: self.s,
            d: self.d,
            z: if self.z_pressed { FLAG_Z } else { 0 },
            x: if self.x_pressed { FLAG_X } else { 0 },
        }
    }

    /// Set a key's state. Returns `true` if the table changed.
    fn set(&mut self, key: TrackedKey, pressed: bool) -> bool {
        let throw = if pressed { FULL_THROW } else { 0 };
        let slot = match key {
            TrackedKey::W => &mut self.w,
            TrackedKey::A => &mut self.a,
            TrackedKey::S => &mut self.s,
            TrackedKey::D => &mut self.d,
            TrackedKey::Z => return std::mem::replace(&mut self.z_pressed, pressed) != pressed,
            TrackedKey::X => return std::mem::replace(&mut self.x_pressed, pressed) != pressed,
        };
        std::mem::replace(slot, throw) != throw
    }
}

/// Cloneable handle to the key state table.
///
/// Clones share the same table; the listener thread writes through one clone
/// while the bridge reads frames through another.
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    table: Arc<Mutex<Table>>,
}

impl KeyState {
    /// Create a table with every key released.
    pub fn new() -> Self {
        Self::default()
    }

    // Poisoning is ignored: the table holds plain values.
    fn lock(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a key press. Returns `true` if the table changed.
    pub fn on_press(&self, key: TrackedKey) -> bool {
        let mut table = self.lock();
        let changed = table.set(key, true);
        if changed {
            log::debug!("{:?} pressed: {:?}", key, table.snapshot());
        }
        changed
    }

    /// Record a key release. Returns `true` if the table changed.
    pub fn on_release(&self, key: TrackedKey) -> bool {
        let mut table = self.lock();
        let changed = table.set(key, false);
        if changed {
            log::debug!("{:?} released: {:?}", key, table.snapshot());
        }
        changed
    }

    /// Current raw slot values.
    pub fn snapshot(&self) -> KeySnapshot {
        self.lock().snapshot()
    }

    /// Build the outgoing frame from the current state.
    pub fn frame_bytes(&self) -> Frame {
        frame::build(&self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_table_all_released() {
        let state = KeyState::new();
        assert_eq!(state.snapshot(), KeySnapshot::default());
    }

    #[test]
    fn test_movement_keys_take_full_throw_while_held() {
        let state = KeyState::new();
        let slots: [(TrackedKey, fn(&KeySnapshot) -> u8); 4] = [
            (TrackedKey::W, |s| s.w),
            (TrackedKey::A, |s| s.a),
            (TrackedKey::S, |s| s.s),
            (TrackedKey::D, |s| s.d),
        ];
        for (key, slot) in slots {
            state.on_press(key);
            assert_eq!(slot(&state.snapshot()), FULL_THROW);
            state.on_release(key);
            assert_eq!(slot(&state.snapshot()), 0);
        }
    }

    #[test]
    fn test_independent_keys_do_not_interfere() {
        let state = KeyState::new();
        state.on_press(TrackedKey::W);
        state.on_press(TrackedKey::D);
        state.on_release(TrackedKey::W);

        let snap = state.snapshot();
        assert_eq!(snap.w, 0);
        assert_eq!(snap.d, FULL_THROW);
        assert_eq!(snap.a, 0);
        assert_eq!(snap.s, 0);
    }

    #[test]
    fn test_modifier_flags_use_their_own_bit() {
        let state = KeyState::new();
        state.on_press(TrackedKey::X);
        assert_eq!(state.snapshot().x, FLAG_X);
        state.on_press(TrackedKey::Z);
        assert_eq!(state.snapshot().z, FLAG_Z);

        state.on_release(TrackedKey::X);
        assert_eq!(state.snapshot().x, 0);
        assert_eq!(state.snapshot().z, FLAG_Z);
        state.on_release(TrackedKey::Z);
        assert_eq!(state.snapshot().z, 0);
    }

    #[test]
    fn test_auto_repeat_press_then_single_release_clears() {
        let state = KeyState::new();
        state.on_press(TrackedKey::Z);
        state.on_press(TrackedKey::Z);
        state.on_press(TrackedKey::Z);
        assert_eq!(state.snapshot().z, FLAG_Z);
        state.on_release(TrackedKey::Z);
        assert_eq!(state.snapshot().z, 0);
    }

    #[test]
    fn test_release_without_press_stays_clear() {
        let state = KeyState::new();
        assert!(!state.on_release(TrackedKey::X));
        assert_eq!(state.snapshot().x, 0);
        state.on_press(TrackedKey::X);
        assert_eq!(state.snapshot().x, FLAG_X);
    }

    #[test]
    fn test_change_reporting() {
        let state = KeyState::new();
        assert!(state.on_press(TrackedKey::A));
        assert!(!state.on_press(TrackedKey::A));
        assert!(state.on_release(TrackedKey::A));
        assert!(!state.on_release(TrackedKey::A));
    }

    #[test]
    fn test_clones_share_table() {
        let state = KeyState::new();
        let writer = state.clone();
        writer.on_press(TrackedKey::S);
        assert_eq!(state.snapshot().s, FULL_THROW);
    }

    #[test]
    fn test_frame_bytes_reflect_table() {
        let state = KeyState::new();
        state.on_press(TrackedKey::W);
        state.on_press(TrackedKey::D);
        state.on_press(TrackedKey::X);
        state.on_press(TrackedKey::Z);
        assert_eq!(state.frame_bytes(), [3, 128, 208, 208, 128, 128, 128, 128]);
    }
}
