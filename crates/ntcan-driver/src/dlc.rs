//! Data length code mapping for classic CAN and CAN-FD.
//!
//! DLC 0-8 map one to one; CAN-FD extends codes 9-15 to
//! 12, 16, 20, 24, 32, 48 and 64 bytes.

use crate::types::{LEN_FD, MAX_CLASSIC_DATA};

const DLC_TO_SIZE: [usize; 16] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 12, 16, 20, 24, 32, 48, 64];

/// Smallest DLC whose data size holds `size` bytes (15 for anything above 48).
pub fn datasize_to_dlc(size: usize) -> u8 {
    match size {
        0..=8 => size as u8,
        9..=12 => 9,
        13..=16 => 10,
        17..=20 => 11,
        21..=24 => 12,
        25..=32 => 13,
        33..=48 => 14,
        _ => 15,
    }
}

/// Payload size encoded by a CAN-FD DLC (only the lower nibble is used).
pub fn dlc_to_datasize(dlc: u8) -> usize {
    DLC_TO_SIZE[usize::from(dlc & 0x0F)]
}

/// Payload size of a message given its `len` field.
///
/// Classic frames clamp DLC 9-15 to 8 bytes.
pub fn len_to_datasize(len: u8) -> usize {
    let dlc = len & 0x0F;
    if len & LEN_FD != 0 {
        dlc_to_datasize(dlc)
    } else {
        usize::from(dlc).min(MAX_CLASSIC_DATA)
    }
}
