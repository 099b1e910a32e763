//! Assembly buffer for a chunked `LOAD_CHUNK` upload.

/// Tracks one `LOAD_CHUNK` session: a fixed-size buffer filled in from
/// arbitrarily ordered, possibly overlapping chunk writes.
pub struct ChunkSession {
    total: u32,
    buffer: Vec<u8>,
    written: u32,
}

impl ChunkSession {
    /// Opens a session expecting `total` bytes.
    pub fn new(total: u32) -> Self {
        Self {
            total,
            buffer: vec![0u8; total as usize],
            written: 0,
        }
    }

    /// Writes `chunk` at `offset`. Out-of-range writes are dropped rather
    /// than panicking, matching the protocol's no-handshake chunk delivery.
    pub fn write_chunk(&mut self, offset: u32, chunk: &[u8]) {
        let start = offset as usize;
        let end = start + chunk.len();
        if end > self.buffer.len() {
            return;
        }
        self.buffer[start..end].copy_from_slice(chunk);
        self.written += chunk.len() as u32;
    }

    /// Whether at least `total` bytes have been written (chunks may
    /// overlap, so this is a lower bound rather than an exact count).
    pub fn is_complete(&self) -> bool {
        self.written >= self.total
    }

    /// The assembled bytes.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_chunks_assemble_in_order() {
        let mut s = ChunkSession::new(6);
        s.write_chunk(0, &[1, 2, 3]);
        s.write_chunk(3, &[4, 5, 6]);
        assert!(s.is_complete());
        assert_eq!(s.buffer(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn out_of_order_chunks_still_assemble() {
        let mut s = ChunkSession::new(4);
        s.write_chunk(2, &[3, 4]);
        assert!(!s.is_complete());
        s.write_chunk(0, &[1, 2]);
        assert!(s.is_complete());
        assert_eq!(s.buffer(), &[1, 2, 3, 4]);
    }

    #[test]
    fn overflowing_chunk_is_dropped() {
        let mut s = ChunkSession::new(2);
        s.write_chunk(1, &[9, 9, 9]);
        assert!(!s.is_complete());
        assert_eq!(s.buffer(), &[0, 0]);
    }
}
