//! Fixed-layout payload bodies for the BGCF message types that carry more
//! than a bare TLV map.

use crate::error::ProtocolError;
use bitgrid_common::Direction;

fn write_pstr16(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u16).to_le_bytes());
    out.extend_from_slice(s.as_bytes());
}

fn read_pstr16(data: &[u8], offset: &mut usize, what: &'static str) -> Result<String, ProtocolError> {
    if *offset + 2 > data.len() {
        return Err(ProtocolError::Truncated {
            what,
            expected: *offset + 2,
            got: data.len(),
        });
    }
    let len = u16::from_le_bytes([data[*offset], data[*offset + 1]]) as usize;
    *offset += 2;
    if *offset + len > data.len() {
        return Err(ProtocolError::LengthOverflow {
            what,
            declared: len,
            remaining: data.len() - *offset,
        });
    }
    let s = String::from_utf8_lossy(&data[*offset..*offset + len]).into_owned();
    *offset += len;
    Ok(s)
}

/// `HELLO` payload: advertises or echoes grid dimensions and protocol
/// capabilities.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HelloPayload {
    /// Grid width.
    pub width: u16,
    /// Grid height.
    pub height: u16,
    /// Protocol version the sender speaks.
    pub proto_version: u16,
    /// Reserved feature bitmask.
    pub features: u32,
}

impl HelloPayload {
    /// Serializes this payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(10);
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&self.proto_version.to_le_bytes());
        out.extend_from_slice(&self.features.to_le_bytes());
        out
    }

    /// Parses a `HELLO` payload.
    pub fn parse(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() < 10 {
            return Err(ProtocolError::Truncated {
                what: "HELLO",
                expected: 10,
                got: data.len(),
            });
        }
        Ok(Self {
            width: u16::from_le_bytes([data[0], data[1]]),
            height: u16::from_le_bytes([data[2], data[3]]),
            proto_version: u16::from_le_bytes([data[4], data[5]]),
            features: u32::from_le_bytes([data[6], data[7], data[8], data[9]]),
        })
    }
}

/// `LOAD_CHUNK` payload: one chunk of an assembled bitstream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadChunkPayload {
    /// The session this chunk belongs to.
    pub session: u16,
    /// The total size in bytes of the bitstream being assembled.
    pub total: u32,
    /// This chunk's byte offset within the assembled bitstream.
    pub offset: u32,
    /// The chunk's bytes.
    pub chunk: Vec<u8>,
}

impl LoadChunkPayload {
    /// Serializes this payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(12 + self.chunk.len());
        out.extend_from_slice(&self.session.to_le_bytes());
        out.extend_from_slice(&self.total.to_le_bytes());
        out.extend_from_slice(&self.offset.to_le_bytes());
        out.extend_from_slice(&(self.chunk.len() as u16).to_le_bytes());
        out.extend_from_slice(&self.chunk);
        out
    }

    /// Parses a `LOAD_CHUNK` payload.
    pub fn parse(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() < 12 {
            return Err(ProtocolError::Truncated {
                what: "LOAD_CHUNK",
                expected: 12,
                got: data.len(),
            });
        }
        let session = u16::from_le_bytes([data[0], data[1]]);
        let total = u32::from_le_bytes([data[2], data[3], data[4], data[5]]);
        let offset = u32::from_le_bytes([data[6], data[7], data[8], data[9]]);
        let clen = u16::from_le_bytes([data[10], data[11]]) as usize;
        if data.len() < 12 + clen {
            return Err(ProtocolError::LengthOverflow {
                what: "LOAD_CHUNK chunk",
                declared: clen,
                remaining: data.len() - 12,
            });
        }
        Ok(Self {
            session,
            total,
            offset,
            chunk: data[12..12 + clen].to_vec(),
        })
    }
}

/// `STEP` payload: the number of subcycles to advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepPayload {
    /// Subcycles to advance.
    pub cycles: u32,
}

impl StepPayload {
    /// Serializes this payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.cycles.to_le_bytes().to_vec()
    }

    /// Parses a `STEP` payload.
    pub fn parse(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() < 4 {
            return Err(ProtocolError::Truncated {
                what: "STEP",
                expected: 4,
                got: data.len(),
            });
        }
        Ok(Self {
            cycles: u32::from_le_bytes([data[0], data[1], data[2], data[3]]),
        })
    }
}

/// `ERROR` payload: a numeric code plus a short human-readable message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorPayload {
    /// Application-defined error code.
    pub code: u16,
    /// A message, truncated to 255 bytes on the wire.
    pub message: String,
}

impl ErrorPayload {
    /// Serializes this payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let bytes = &self.message.as_bytes()[..self.message.len().min(255)];
        let mut out = Vec::with_capacity(3 + bytes.len());
        out.extend_from_slice(&self.code.to_le_bytes());
        out.push(bytes.len() as u8);
        out.extend_from_slice(bytes);
        out
    }

    /// Parses an `ERROR` payload.
    pub fn parse(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() < 3 {
            return Err(ProtocolError::Truncated {
                what: "ERROR",
                expected: 3,
                got: data.len(),
            });
        }
        let code = u16::from_le_bytes([data[0], data[1]]);
        let msg_len = data[2] as usize;
        if data.len() < 3 + msg_len {
            return Err(ProtocolError::LengthOverflow {
                what: "ERROR message",
                declared: msg_len,
                remaining: data.len() - 3,
            });
        }
        let message = String::from_utf8_lossy(&data[3..3 + msg_len]).into_owned();
        Ok(Self { code, message })
    }
}

/// `LINK` payload: requests an inter-server seam link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkPayload {
    /// Which local edge the seam is on.
    pub direction: Direction,
    /// Name of the local output bus feeding the seam.
    pub local_out: String,
    /// Name of the remote input bus the seam drives.
    pub remote_in: String,
    /// Peer host to connect to.
    pub host: String,
    /// Peer port to connect to.
    pub port: u16,
    /// Requested lane count (0 = auto, negotiate down to the seam width).
    pub lanes: u16,
}

impl LinkPayload {
    /// Serializes this payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.push(self.direction.index());
        out.push(0); // reserved
        write_pstr16(&mut out, &self.local_out);
        write_pstr16(&mut out, &self.remote_in);
        write_pstr16(&mut out, &self.host);
        out.extend_from_slice(&self.port.to_le_bytes());
        out.extend_from_slice(&self.lanes.to_le_bytes());
        out
    }

    /// Parses a `LINK` payload.
    pub fn parse(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() < 2 {
            return Err(ProtocolError::Truncated {
                what: "LINK",
                expected: 2,
                got: data.len(),
            });
        }
        let direction = Direction::from_index(data[0]).ok_or(ProtocolError::Truncated {
            what: "LINK direction",
            expected: 1,
            got: 0,
        })?;
        let mut offset = 2usize;
        let local_out = read_pstr16(data, &mut offset, "LINK local_out")?;
        let remote_in = read_pstr16(data, &mut offset, "LINK remote_in")?;
        let host = read_pstr16(data, &mut offset, "LINK host")?;
        if offset + 4 > data.len() {
            return Err(ProtocolError::Truncated {
                what: "LINK port/lanes",
                expected: offset + 4,
                got: data.len(),
            });
        }
        let port = u16::from_le_bytes([data[offset], data[offset + 1]]);
        let lanes = u16::from_le_bytes([data[offset + 2], data[offset + 3]]);
        Ok(Self {
            direction,
            local_out,
            remote_in,
            host,
            port,
            lanes,
        })
    }
}

/// `LINK_ACK` payload: the lane count the device actually accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkAckPayload {
    /// Accepted lane count.
    pub lanes: u16,
}

impl LinkAckPayload {
    /// Serializes this payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.lanes.to_le_bytes().to_vec()
    }

    /// Parses a `LINK_ACK` payload.
    pub fn parse(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() < 2 {
            return Err(ProtocolError::Truncated {
                what: "LINK_ACK",
                expected: 2,
                got: data.len(),
            });
        }
        Ok(Self {
            lanes: u16::from_le_bytes([data[0], data[1]]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_round_trip() {
        let h = HelloPayload {
            width: 8,
            height: 4,
            proto_version: 1,
            features: 0,
        };
        assert_eq!(HelloPayload::parse(&h.to_bytes()).unwrap(), h);
    }

    #[test]
    fn load_chunk_round_trip() {
        let c = LoadChunkPayload {
            session: 3,
            total: 100,
            offset: 20,
            chunk: vec![1, 2, 3, 4],
        };
        assert_eq!(LoadChunkPayload::parse(&c.to_bytes()).unwrap(), c);
    }

    #[test]
    fn step_round_trip() {
        let s = StepPayload { cycles: 42 };
        assert_eq!(StepPayload::parse(&s.to_bytes()).unwrap(), s);
    }

    #[test]
    fn error_round_trip() {
        let e = ErrorPayload {
            code: 7,
            message: "bad session".to_string(),
        };
        assert_eq!(ErrorPayload::parse(&e.to_bytes()).unwrap(), e);
    }

    #[test]
    fn link_round_trip() {
        let l = LinkPayload {
            direction: Direction::E,
            local_out: "east".to_string(),
            remote_in: "west".to_string(),
            host: "peer.local".to_string(),
            port: 9000,
            lanes: 0,
        };
        assert_eq!(LinkPayload::parse(&l.to_bytes()).unwrap(), l);
    }

    #[test]
    fn link_ack_round_trip() {
        let a = LinkAckPayload { lanes: 9 };
        assert_eq!(LinkAckPayload::parse(&a.to_bytes()).unwrap(), a);
    }

    #[test]
    fn truncated_load_chunk_is_reported() {
        let c = LoadChunkPayload {
            session: 1,
            total: 10,
            offset: 0,
            chunk: vec![1, 2, 3, 4, 5],
        };
        let bytes = c.to_bytes();
        assert!(matches!(
            LoadChunkPayload::parse(&bytes[..bytes.len() - 2]),
            Err(ProtocolError::LengthOverflow { .. })
        ));
    }
}
