//! The 24-byte BGBS bitstream header.

use crate::error::BitstreamError;
use crate::scan::ScanOrder;

/// Magic bytes identifying a BGBS bitstream.
pub const MAGIC: [u8; 4] = *b"BGBS";

/// The only header version this codec writes or accepts.
pub const VERSION: u16 = 1;

/// The fixed header size in bytes.
pub const HEADER_SIZE: u16 = 24;

/// The parsed 24-byte BGBS header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    /// Grid width.
    pub width: u16,
    /// Grid height.
    pub height: u16,
    /// Scan order the payload was packed in.
    pub order: ScanOrder,
    /// Reserved flag byte, currently unused.
    pub flags: u8,
    /// Payload length in bits.
    pub payload_bits: u32,
    /// CRC-32 of the payload bytes.
    pub payload_crc32: u32,
}

impl Header {
    /// Serializes this header to its 24-byte wire form.
    pub fn to_bytes(self) -> [u8; HEADER_SIZE as usize] {
        let mut out = [0u8; HEADER_SIZE as usize];
        out[0..4].copy_from_slice(&MAGIC);
        out[4..6].copy_from_slice(&VERSION.to_le_bytes());
        out[6..8].copy_from_slice(&HEADER_SIZE.to_le_bytes());
        out[8..10].copy_from_slice(&self.width.to_le_bytes());
        out[10..12].copy_from_slice(&self.height.to_le_bytes());
        out[12] = self.order.code();
        out[13] = self.flags;
        out[14..18].copy_from_slice(&self.payload_bits.to_le_bytes());
        out[18..22].copy_from_slice(&self.payload_crc32.to_le_bytes());
        // out[22..24] reserved, left zero.
        out
    }

    /// Returns `true` if `data` begins with the BGBS magic.
    pub fn has_magic(data: &[u8]) -> bool {
        data.len() >= 4 && data[0..4] == MAGIC
    }

    /// Parses a 24-byte header from the front of `data`.
    pub fn parse(data: &[u8]) -> Result<Header, BitstreamError> {
        if data.len() < HEADER_SIZE as usize || data[0..4] != MAGIC {
            return Err(BitstreamError::BadMagic);
        }
        let version = u16::from_le_bytes([data[4], data[5]]);
        if version != VERSION {
            return Err(BitstreamError::UnsupportedVersion(version));
        }
        let header_size = u16::from_le_bytes([data[6], data[7]]);
        if header_size != HEADER_SIZE {
            return Err(BitstreamError::BadHeaderSize(header_size));
        }
        let width = u16::from_le_bytes([data[8], data[9]]);
        let height = u16::from_le_bytes([data[10], data[11]]);
        let order = ScanOrder::from_code(data[12])?;
        let flags = data[13];
        let payload_bits = u32::from_le_bytes([data[14], data[15], data[16], data[17]]);
        let payload_crc32 = u32::from_le_bytes([data[18], data[19], data[20], data[21]]);
        Ok(Header {
            width,
            height,
            order,
            flags,
            payload_bits,
            payload_crc32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let header = Header {
            width: 4,
            height: 2,
            order: ScanOrder::Snake,
            flags: 0,
            payload_bits: 4 * 2 * 4 * 16,
            payload_crc32: 0xDEAD_BEEF,
        };
        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), HEADER_SIZE as usize);
        let parsed = Header::parse(&bytes).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn bad_magic_rejected() {
        let mut bytes = [0u8; HEADER_SIZE as usize];
        bytes[0..4].copy_from_slice(b"XXXX");
        assert_eq!(Header::parse(&bytes), Err(BitstreamError::BadMagic));
    }

    #[test]
    fn has_magic_checks_prefix() {
        assert!(Header::has_magic(b"BGBSrest"));
        assert!(!Header::has_magic(b"nope"));
    }
}
