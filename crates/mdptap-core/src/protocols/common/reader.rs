/// Boolean fields are single bytes; any nonzero value reads as set.
pub(crate) fn flag(value: u8) -> bool {
    value != 0
}

/// XOR of every byte, as used by the link's payload checksum.
pub(crate) fn xor_checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc ^ b)
}

#[cfg(test)]
mod tests {
    use super::{flag, xor_checksum};

    #[test]
    fn flag_zero() {
        assert!(!flag(0));
    }

    #[test]
    fn flag_value() {
        assert!(flag(1));
        assert!(flag(0xff));
    }

    #[test]
    fn xor_checksum_of_empty_is_zero() {
        assert_eq!(xor_checksum(&[]), 0);
    }

    #[test]
    fn xor_checksum_folds_bytes() {
        assert_eq!(xor_checksum(&[0x0f, 0xf0, 0x01]), 0xfe);
    }
}
