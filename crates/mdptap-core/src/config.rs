use serde::{Deserialize, Serialize};

use crate::source::CaptureFormat;

/// Default number of bytes handed to the stream decoder per replayed chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// What to do with a wave frame whose declared length matches no known group size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveLengthPolicy {
    /// Treat the match as spurious and resynchronize two bytes past the marker.
    #[default]
    Reject,
    /// Consume the whole declared frame without producing a record.
    Skip,
}

/// Decoder behaviour switches.
///
/// # Examples
/// ```
/// use mdptap_core::{DecoderConfig, WaveLengthPolicy};
///
/// let config = DecoderConfig::default();
/// assert!(!config.verify_checksum);
/// assert_eq!(config.wave_length_policy, WaveLengthPolicy::Reject);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Check the XOR checksum carried in the second payload byte of
    /// synthesize and wave frames.
    pub verify_checksum: bool,
    pub wave_length_policy: WaveLengthPolicy,
}

/// Settings for replaying a recorded capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Bytes read from the source per chunk; must be nonzero.
    pub chunk_size: usize,
    /// Capture encoding; `None` picks it from the file extension.
    pub format: Option<CaptureFormat>,
    pub decoder: DecoderConfig,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            format: None,
            decoder: DecoderConfig::default(),
        }
    }
}
