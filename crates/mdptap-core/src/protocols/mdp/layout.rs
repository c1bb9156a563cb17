//! Byte offsets and sizes of the MDP-M01 link protocol.
//!
//! Frame-level offsets are relative to the first marker byte; payload and slot
//! offsets are relative to the start of the payload and of the slot.

pub const MAGIC: [u8; 2] = [0x5A, 0x5A];
pub const MAGIC_LEN: usize = MAGIC.len();
pub const KIND_OFFSET: usize = 2;
pub const LENGTH_OFFSET: usize = 3;
pub const HEADER_LEN: usize = 4;

pub const ACTIVE_CHANNEL_OFFSET: usize = 0;
pub const CHECKSUM_OFFSET: usize = 1;
pub const BODY_OFFSET: usize = 2;

pub const SYNTHESIZE_SLOTS: usize = 6;
pub const SLOT_LEN: usize = 25;
pub const SYNTHESIZE_PAYLOAD_LEN: usize = BODY_OFFSET + SYNTHESIZE_SLOTS * SLOT_LEN;

pub const SLOT_NUMBER_OFFSET: usize = 0;
pub const OUT_VOLTAGE_RANGE: std::ops::Range<usize> = 1..3;
pub const OUT_CURRENT_RANGE: std::ops::Range<usize> = 3..5;
pub const IN_VOLTAGE_RANGE: std::ops::Range<usize> = 5..7;
pub const IN_CURRENT_RANGE: std::ops::Range<usize> = 7..9;
pub const SET_VOLTAGE_RANGE: std::ops::Range<usize> = 9..11;
pub const SET_CURRENT_RANGE: std::ops::Range<usize> = 11..13;
pub const TEMPERATURE_RANGE: std::ops::Range<usize> = 13..15;
pub const ONLINE_OFFSET: usize = 15;
pub const MACHINE_TYPE_OFFSET: usize = 16;
pub const LOCK_OFFSET: usize = 17;
pub const STATUS_OFFSET: usize = 18;
pub const OUTPUT_OFFSET: usize = 19;
pub const COLOR_RANGE: std::ops::Range<usize> = 20..23;
pub const ERROR_OFFSET: usize = 23;
pub const TERMINATOR_OFFSET: usize = 24;

pub const WAVE_GROUPS: usize = 10;
pub const WAVE_TIMESTAMP_LEN: usize = 4;
pub const WAVE_ITEM_LEN: usize = 4;
pub const WAVE_SHORT_FRAME_LEN: u8 = 126;
pub const WAVE_SHORT_GROUP_SIZE: usize = 2;
pub const WAVE_LONG_FRAME_LEN: u8 = 206;
pub const WAVE_LONG_GROUP_SIZE: usize = 4;

/// Raw millivolt / milliamp integers per volt / amp.
pub const MILLI_SCALE: f64 = 1000.0;
/// Raw deci-degree integers per degree Celsius.
pub const DECI_SCALE: f64 = 10.0;

/// Samples per wave group for a given total frame length, if the length is known.
pub const fn wave_group_size(declared_length: u8) -> Option<usize> {
    match declared_length {
        WAVE_SHORT_FRAME_LEN => Some(WAVE_SHORT_GROUP_SIZE),
        WAVE_LONG_FRAME_LEN => Some(WAVE_LONG_GROUP_SIZE),
        _ => None,
    }
}

pub const fn wave_payload_len(group_size: usize) -> usize {
    BODY_OFFSET + WAVE_GROUPS * (WAVE_TIMESTAMP_LEN + group_size * WAVE_ITEM_LEN)
}
