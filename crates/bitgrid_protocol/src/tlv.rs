//! The TLV name-to-`u64` map carried by `SET_INPUTS` and `OUTPUTS` payloads.

use std::collections::BTreeMap;

/// Encodes `map` as `count u16` followed by, per entry, `name_len u8`, the
/// UTF-8 name bytes (truncated to 255 bytes), and a little-endian `u64`
/// value. `BTreeMap` keeps encoding order deterministic.
pub fn encode_name_u64_map(map: &BTreeMap<String, u64>) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(map.len() as u16).to_le_bytes());
    for (name, value) in map {
        let bytes = &name.as_bytes()[..name.len().min(255)];
        out.push(bytes.len() as u8);
        out.extend_from_slice(bytes);
        out.extend_from_slice(&value.to_le_bytes());
    }
    out
}

/// Decodes a TLV name-to-`u64` map, stopping early (without error) at the
/// first truncated entry, matching the permissive "decode what's there"
/// behavior of the wire protocol's other length-prefixed fields.
pub fn decode_name_u64_map(data: &[u8]) -> BTreeMap<String, u64> {
    let mut out = BTreeMap::new();
    if data.len() < 2 {
        return out;
    }
    let count = u16::from_le_bytes([data[0], data[1]]);
    let mut offset = 2usize;
    for _ in 0..count {
        if offset >= data.len() {
            break;
        }
        let name_len = data[offset] as usize;
        offset += 1;
        if offset + name_len > data.len() {
            break;
        }
        let name = String::from_utf8_lossy(&data[offset..offset + name_len]).into_owned();
        offset += name_len;
        if offset + 8 > data.len() {
            break;
        }
        let value = u64::from_le_bytes(data[offset..offset + 8].try_into().expect("8 bytes"));
        offset += 8;
        out.insert(name, value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let mut map = BTreeMap::new();
        map.insert("west".to_string(), 0x148);
        map.insert("east".to_string(), 0);
        let bytes = encode_name_u64_map(&map);
        assert_eq!(decode_name_u64_map(&bytes), map);
    }

    #[test]
    fn empty_map_round_trips() {
        let map = BTreeMap::new();
        let bytes = encode_name_u64_map(&map);
        assert_eq!(bytes, vec![0, 0]);
        assert!(decode_name_u64_map(&bytes).is_empty());
    }

    #[test]
    fn truncated_entry_is_dropped_without_error() {
        let mut map = BTreeMap::new();
        map.insert("west".to_string(), 1);
        let mut bytes = encode_name_u64_map(&map);
        bytes.truncate(bytes.len() - 2);
        assert!(decode_name_u64_map(&bytes).is_empty());
    }
}
