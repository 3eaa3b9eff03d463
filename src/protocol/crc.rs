//! # CRC-16 Implementation
//!
//! CRC-16 checksum calculation for the Voltronic RS232 protocol.
//!
//! **Polynomial**: 0x1021 (CRC-16/XMODEM), processed a nibble at a time
//! **Initial Value**: 0x0000
//!
//! The raw checksum bytes are post-processed so they can never collide
//! with bytes the protocol reserves for framing: `(` (0x28), CR (0x0D)
//! and LF (0x0A). Any checksum byte equal to one of those is incremented
//! by one before the frame is assembled.

/// High-nibble subset of the CRC-16/XMODEM lookup table
const CRC16_TABLE: [u16; 16] = [
    0x0000, 0x1021, 0x2042, 0x3063, 0x4084, 0x50A5, 0x60C6, 0x70E7,
    0x8108, 0x9129, 0xA14A, 0xB16B, 0xC18C, 0xD1AD, 0xE1CE, 0xF1EF,
];

/// Byte values the checksum must never contain
const RESERVED_BYTES: [u8; 3] = [0x28, 0x0D, 0x0A];

/// Calculate the Voltronic CRC-16 checksum over `data`
///
/// # Arguments
///
/// * `data` - Byte slice to calculate the CRC for (the ASCII command bytes)
///
/// # Returns
///
/// * `u16` - Corrected checksum, high byte in the upper 8 bits
///
/// # Examples
///
/// ```
/// use voltronic_bridge::protocol::crc::crc16;
///
/// assert_eq!(crc16(b"QPIGS"), 0xB7A9);
/// ```
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;

    for &byte in data {
        for nibble in [byte >> 4, byte & 0x0F] {
            let da = ((crc >> 12) & 0x0F) as u8;
            crc = (crc << 4) ^ CRC16_TABLE[(da ^ nibble) as usize];
        }
    }

    let low = correct_reserved((crc & 0x00FF) as u8);
    let high = correct_reserved((crc >> 8) as u8);

    ((high as u16) << 8) | (low as u16)
}

/// Bump a checksum byte off a reserved framing value
///
/// The increment never lands on another reserved value and never
/// overflows for the three inputs it applies to.
fn correct_reserved(byte: u8) -> u8 {
    if RESERVED_BYTES.contains(&byte) {
        byte + 1
    } else {
        byte
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc16_empty() {
        assert_eq!(crc16(&[]), 0x0000);
    }

    #[test]
    fn test_crc16_known_vectors() {
        // Fixed by the protocol; QPIGS is the canonical golden vector
        assert_eq!(crc16(b"QPIGS"), 0xB7A9);
        assert_eq!(crc16(b"QMOD"), 0x49C1);
        assert_eq!(crc16(b"QID"), 0xD6EA);
        assert_eq!(crc16(b"NAK"), 0xC1FE);
    }

    #[test]
    fn test_crc16_is_deterministic() {
        let data = b"QPIRI";
        assert_eq!(crc16(data), crc16(data));
    }

    #[test]
    fn test_crc16_changes_with_data() {
        // Single-bit flip in the input must move the checksum
        let crc1 = crc16(b"POP00");
        let crc2 = crc16(b"POP01");
        assert_ne!(crc1, crc2, "CRC should change when data changes");
    }

    #[test]
    fn test_crc16_low_byte_correction() {
        // Raw CRC of "BB" is 0x0328; low byte 0x28 is reserved
        assert_eq!(crc16(b"BB"), 0x0329);
        // Raw CRC of "POP02" is 0xE20A; low byte 0x0A is reserved
        assert_eq!(crc16(b"POP02"), 0xE20B);
    }

    #[test]
    fn test_crc16_high_byte_correction() {
        // Raw CRC of "F" is 0x2802; high byte 0x28 is reserved
        assert_eq!(crc16(b"F"), 0x2902);
        // Raw CRC of "U" is 0x0A50; high byte 0x0A is reserved
        assert_eq!(crc16(b"U"), 0x0B50);
    }

    #[test]
    fn test_corrected_bytes_never_reserved() {
        for &byte in &RESERVED_BYTES {
            let corrected = correct_reserved(byte);
            assert_eq!(corrected, byte + 1);
            assert!(!RESERVED_BYTES.contains(&corrected));
        }
        assert_eq!(correct_reserved(0x42), 0x42);
    }
}
