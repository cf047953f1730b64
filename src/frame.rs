//! Outgoing telemetry frame.
//!
//! Wire layout (8 bytes, written in order):
//!
//! | Byte | Value                    |
//! |------|--------------------------|
//! | 0    | X flag + Z flag          |
//! | 1    | 128                      |
//! | 2    | 128 + D - A              |
//! | 3    | 128 + W - S              |
//! | 4-7  | 128                      |

use crate::keys::KeySnapshot;

/// Number of bytes in a frame.
pub const FRAME_LEN: usize = 8;

/// Centre value for axis bytes.
pub const NEUTRAL: u8 = 128;

pub type Frame = [u8; FRAME_LEN];

/// Frame with every key released.
pub const IDLE_FRAME: Frame = [0, NEUTRAL, NEUTRAL, NEUTRAL, NEUTRAL, NEUTRAL, NEUTRAL, NEUTRAL];

/// Build a frame from raw slot values.
pub fn build(keys: &KeySnapshot) -> Frame {
    let mut frame = [NEUTRAL; FRAME_LEN];
    frame[0] = keys.x.saturating_add(keys.z);
    frame[2] = axis(keys.d, keys.a);
    frame[3] = axis(keys.w, keys.s);
    frame
}

fn axis(positive: u8, negative: u8) -> u8 {
    let value = i16::from(NEUTRAL) + i16::from(positive) - i16::from(negative);
    value.clamp(0, i16::from(u8::MAX)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::FULL_THROW;

    #[test]
    fn test_all_released_is_idle() {
        assert_eq!(build(&KeySnapshot::default()), IDLE_FRAME);
        assert_eq!(IDLE_FRAME, [0, 128, 128, 128, 128, 128, 128, 128]);
    }

    #[test]
    fn test_forward_right_with_both_flags() {
        let keys = KeySnapshot {
            w: 80,
            a: 0,
            s: 0,
            d: 80,
            z: 1,
            x: 1,
        };
        assert_eq!(build(&keys), [2, 128, 208, 208, 128, 128, 128, 128]);
    }

    #[test]
    fn test_back_left() {
        let keys = KeySnapshot {
            a: FULL_THROW,
            s: FULL_THROW,
            ..Default::default()
        };
        assert_eq!(build(&keys), [0, 128, 48, 48, 128, 128, 128, 128]);
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let keys = KeySnapshot {
            w: FULL_THROW,
            s: FULL_THROW,
            a: FULL_THROW,
            d: FULL_THROW,
            ..Default::default()
        };
        let frame = build(&keys);
        assert_eq!(frame[2], NEUTRAL);
        assert_eq!(frame[3], NEUTRAL);
    }

    #[test]
    fn test_reserved_bytes_stay_neutral() {
        let keys = KeySnapshot {
            w: FULL_THROW,
            d: FULL_THROW,
            x: 1,
            z: 2,
            ..Default::default()
        };
        let frame = build(&keys);
        assert_eq!(frame[0], 3);
        assert_eq!(frame[1], NEUTRAL);
        assert!(frame[4..].iter().all(|&b| b == NEUTRAL));
    }
}
