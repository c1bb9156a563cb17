//! MDP-M01 link protocol decoding.
//!
//! Frames are `5A 5A <kind> <total length> <payload>`. The scanner finds the
//! next candidate in an arbitrarily chunked buffer and hands its payload to the
//! parser; synthesize (six-slot telemetry) and wave (ten sample groups)
//! payloads are decoded structurally, every other kind passes through opaque.
//!
//! A candidate that fails to decode is assumed to be a coincidental marker:
//! the scanner skips the two marker bytes and keeps going. Wire offsets live in
//! `layout`, bounds-checked reads in `reader`.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod scanner;
pub mod types;

pub use error::DecodeError;
pub use parser::{
    ChannelSlot, SampleGroup, SampleItem, StructuralPacket, SynthesizePayload, WavePayload,
    decode_packet,
};
pub use scanner::{DecodedFrame, Frame, ScanEvent, ScanStep, find_marker, scan_frame};
pub use types::{ChannelStatus, LoadMode, MachineType, PackKind, SupplyMode};
