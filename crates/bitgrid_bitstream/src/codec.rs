//! Packing a `LUTGrid` to a BGBS byte stream and back, and applying a
//! decoded bitstream back onto a `Program`.

use crate::bits::{BitReader, BitWriter};
use crate::crc::crc32;
use crate::error::BitstreamError;
use crate::header::{Header, HEADER_SIZE};
use crate::scan::ScanOrder;
use bitgrid_ir::{CellParams, LUTGrid, Op, Program};

fn payload_byte_len(payload_bits: u32) -> usize {
    ((payload_bits as u64 + 7) / 8) as usize
}

/// Packs `grid`'s LUTs into a raw payload (no header), in the given scan
/// order, four 16-bit LUTs per cell LSB-first.
pub fn pack_payload(grid: &LUTGrid, order: ScanOrder) -> Vec<u8> {
    let mut writer = BitWriter::new();
    for (x, y) in order.coords(grid.width(), grid.height()) {
        for lut in grid.get(x, y) {
            writer.push_bits(lut as u32, 16);
        }
    }
    writer.finish()
}

/// Unpacks a raw payload of the given dimensions and scan order into a
/// dense `LUTGrid`.
pub fn unpack_payload(payload: &[u8], width: u16, height: u16, order: ScanOrder) -> LUTGrid {
    let mut grid = LUTGrid::new(width, height);
    let mut reader = BitReader::new(payload);
    for (x, y) in order.coords(width, height) {
        let mut luts = [0u16; 4];
        for lut in luts.iter_mut() {
            *lut = reader.read_bits(16) as u16;
        }
        grid.set(x, y, luts);
    }
    grid
}

/// Packs `grid` with its 24-byte header, computing `payload_crc32` over
/// exactly `ceil(payload_bits / 8)` payload bytes.
pub fn pack_program_bitstream_with_header(grid: &LUTGrid, order: ScanOrder) -> Vec<u8> {
    let payload = pack_payload(grid, order);
    let payload_bits = grid.width() as u32 * grid.height() as u32 * 4 * 16;
    let header = Header {
        width: grid.width(),
        height: grid.height(),
        order,
        flags: 0,
        payload_bits,
        payload_crc32: crc32(&payload[..payload_byte_len(payload_bits)]),
    };
    let mut out = header.to_bytes().to_vec();
    out.extend_from_slice(&payload);
    out
}

/// Returns `true` if `data` begins with a BGBS header.
pub fn has_bitstream_header(data: &[u8]) -> bool {
    Header::has_magic(data)
}

/// Parses a headered bitstream, validating magic, version, header size,
/// scan order, and CRC.
pub fn unpack_bitstream_with_header(data: &[u8]) -> Result<(Header, LUTGrid), BitstreamError> {
    let header = Header::parse(data)?;
    let payload = &data[HEADER_SIZE as usize..];
    let expected = payload_byte_len(header.payload_bits);
    if payload.len() < expected {
        return Err(BitstreamError::Truncated {
            expected,
            got: payload.len(),
        });
    }
    let payload = &payload[..expected];
    let computed = crc32(payload);
    if computed != header.payload_crc32 {
        return Err(BitstreamError::CrcMismatch {
            expected: header.payload_crc32,
            got: computed,
        });
    }
    let grid = unpack_payload(payload, header.width, header.height, header.order);
    Ok((header, grid))
}

/// Applies a bitstream (headered or raw) to `program`, materializing a
/// zero-LUT placeholder cell at any coordinate the program lacked.
///
/// A headered blob's dimensions must match `program`. A raw blob is assumed
/// to be `program`'s own dimensions in row-major order.
pub fn apply_bitstream_to_program(
    program: &mut Program,
    data: &[u8],
) -> Result<(), BitstreamError> {
    let grid = if has_bitstream_header(data) {
        let (header, grid) = unpack_bitstream_with_header(data)?;
        if header.width != program.width || header.height != program.height {
            return Err(BitstreamError::DimensionMismatch {
                expected_w: program.width,
                expected_h: program.height,
                got_w: header.width,
                got_h: header.height,
            });
        }
        grid
    } else {
        let expected = payload_byte_len(program.width as u32 * program.height as u32 * 4 * 16);
        if data.len() < expected {
            return Err(BitstreamError::Truncated {
                expected,
                got: data.len(),
            });
        }
        unpack_payload(&data[..expected], program.width, program.height, ScanOrder::RowMajor)
    };

    for (x, y, luts) in grid.iter() {
        let cell = program.ensure_cell(x, y);
        cell.params = CellParams::from_luts(luts);
        cell.op = Op::lut();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitgrid_ir::Cell;

    fn sample_grid() -> LUTGrid {
        let mut p = Program::new(2, 2, 0);
        p.upsert_cell(Cell::new_lut(0, 0, [0xAAAA, 0, 0, 0]));
        p.upsert_cell(Cell::new_lut(1, 0, [0, 0xCCCC, 0, 0]));
        p.upsert_cell(Cell::new_lut(0, 1, [0, 0, 0xF0F0, 0]));
        p.upsert_cell(Cell::new_lut(1, 1, [0, 0, 0, 0xFF00]));
        LUTGrid::from_program(&p)
    }

    #[test]
    fn pack_unpack_round_trip_all_orders() {
        let grid = sample_grid();
        for order in [ScanOrder::RowMajor, ScanOrder::ColMajor, ScanOrder::Snake] {
            let blob = pack_program_bitstream_with_header(&grid, order);
            let (header, unpacked) = unpack_bitstream_with_header(&blob).unwrap();
            assert_eq!(header.order, order);
            assert_eq!(unpacked, grid);
        }
    }

    #[test]
    fn corrupted_payload_fails_crc() {
        let grid = sample_grid();
        let mut blob = pack_program_bitstream_with_header(&grid, ScanOrder::RowMajor);
        let last = blob.len() - 1;
        blob[last] ^= 0xFF;
        assert!(matches!(
            unpack_bitstream_with_header(&blob),
            Err(BitstreamError::CrcMismatch { .. })
        ));
    }

    #[test]
    fn apply_materializes_missing_cells() {
        let grid = sample_grid();
        let blob = pack_program_bitstream_with_header(&grid, ScanOrder::RowMajor);
        let mut program = Program::new(2, 2, 0);
        apply_bitstream_to_program(&mut program, &blob).unwrap();
        assert_eq!(program.cells.len(), 4);
        assert_eq!(program.cell_at(1, 1).unwrap().effective_luts()[3], 0xFF00);
    }

    #[test]
    fn apply_rejects_dimension_mismatch() {
        let grid = sample_grid();
        let blob = pack_program_bitstream_with_header(&grid, ScanOrder::RowMajor);
        let mut program = Program::new(4, 4, 0);
        assert!(matches!(
            apply_bitstream_to_program(&mut program, &blob),
            Err(BitstreamError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn apply_raw_blob_defaults_to_program_dims_row_major() {
        let grid = sample_grid();
        let raw = pack_payload(&grid, ScanOrder::RowMajor);
        let mut program = Program::new(2, 2, 0);
        apply_bitstream_to_program(&mut program, &raw).unwrap();
        let rebuilt = LUTGrid::from_program(&program);
        assert_eq!(rebuilt, grid);
    }
}
