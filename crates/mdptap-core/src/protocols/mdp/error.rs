use thiserror::Error;

use super::types::PackKind;

/// Errors returned by MDP frame decoding.
///
/// The scanner treats every variant as a reason to resynchronize; none of
/// them abort a stream.
///
/// # Examples
/// ```
/// use mdptap_core::DecodeError;
///
/// let err = DecodeError::AmbiguousGroupSize { declared_length: 100 };
/// assert!(err.to_string().contains("ambiguous wave group size"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("payload too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("declared frame length {declared} is shorter than the frame header")]
    LengthTooSmall { declared: u8 },
    #[error("invalid {kind} payload length: expected {expected} bytes, got {actual}")]
    LengthMismatch {
        kind: PackKind,
        expected: usize,
        actual: usize,
    },
    #[error("invalid machine type: {value}")]
    InvalidMachineType { value: u8 },
    #[error("invalid load mode: {value}")]
    InvalidLoadMode { value: u8 },
    #[error("invalid supply mode: {value}")]
    InvalidSupplyMode { value: u8 },
    #[error("ambiguous wave group size for declared length {declared_length}")]
    AmbiguousGroupSize { declared_length: u8 },
    #[error("checksum mismatch: frame carries {expected:#04x}, payload hashes to {actual:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },
}

impl DecodeError {
    pub fn is_ambiguous_group_size(&self) -> bool {
        matches!(self, DecodeError::AmbiguousGroupSize { .. })
    }
}
