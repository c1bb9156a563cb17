use super::error::DecodeError;
use super::types::PackKind;

pub struct MdpReader<'a> {
    payload: &'a [u8],
}

impl<'a> MdpReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), DecodeError> {
        if self.payload.len() < needed {
            return Err(DecodeError::TooShort {
                needed,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    pub fn require_exact(&self, kind: PackKind, expected: usize) -> Result<(), DecodeError> {
        if self.payload.len() != expected {
            return Err(DecodeError::LengthMismatch {
                kind,
                expected,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, DecodeError> {
        self.payload
            .get(offset)
            .copied()
            .ok_or(DecodeError::TooShort {
                needed: offset + 1,
                actual: self.payload.len(),
            })
    }

    pub fn read_flag(&self, offset: usize) -> Result<bool, DecodeError> {
        self.read_u8(offset).map(crate::protocols::common::reader::flag)
    }

    pub fn read_u16_le(&self, range: std::ops::Range<usize>) -> Result<u16, DecodeError> {
        let bytes = self.read_slice(range)?;
        if bytes.len() != 2 {
            return Err(DecodeError::TooShort {
                needed: 2,
                actual: bytes.len(),
            });
        }
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32_le(&self, range: std::ops::Range<usize>) -> Result<u32, DecodeError> {
        let bytes = self.read_slice(range)?;
        if bytes.len() != 4 {
            return Err(DecodeError::TooShort {
                needed: 4,
                actual: bytes.len(),
            });
        }
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_slice(&self, range: std::ops::Range<usize>) -> Result<&'a [u8], DecodeError> {
        self.payload.get(range.clone()).ok_or(DecodeError::TooShort {
            needed: range.end,
            actual: self.payload.len(),
        })
    }

    pub fn read_array<const N: usize>(&self, offset: usize) -> Result<[u8; N], DecodeError> {
        let bytes = self.read_slice(offset..offset + N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Bytes from `offset` to the end of the payload.
    pub fn tail(&self, offset: usize) -> Result<&'a [u8], DecodeError> {
        self.payload.get(offset..).ok_or(DecodeError::TooShort {
            needed: offset,
            actual: self.payload.len(),
        })
    }
}
