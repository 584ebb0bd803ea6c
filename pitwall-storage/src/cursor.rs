//! Opaque pagination tokens.
//!
//! A cursor is the big-endian offset into the filtered result set, hex
//! encoded. Anything that does not decode cleanly restarts from the top.

const CURSOR_LEN: usize = 16;

pub fn encode(offset: u64) -> String {
    hex::encode(offset.to_be_bytes())
}

/// Decodes a cursor; malformed tokens yield offset 0.
pub fn decode(token: &str) -> u64 {
    if token.len() != CURSOR_LEN {
        return 0;
    }
    let mut bytes = [0u8; 8];
    match hex::decode_to_slice(token, &mut bytes) {
        Ok(()) => u64::from_be_bytes(bytes),
        Err(_) => 0,
    }
}
