use super::*;

/// Append an unsigned LEB128 varint.
pub fn write_varint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

/// Read an unsigned LEB128 varint at `pos`, advancing it.
pub fn read_varint(buf: &[u8], pos: &mut usize) -> Result<u64> {
    let mut value: u64 = 0;
    let mut shift = 0u32;
    loop {
        let byte = read_u8(buf, pos)?;
        if shift == 63 && byte > 1 {
            return Err(WindowError::Codec("varint overflows u64".to_string()));
        }
        value |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
        if shift > 63 {
            return Err(WindowError::Codec("varint longer than 10 bytes".to_string()));
        }
    }
}

/// Read one byte at `pos`, advancing it.
pub(crate) fn read_u8(buf: &[u8], pos: &mut usize) -> Result<u8> {
    let byte = *buf
        .get(*pos)
        .ok_or_else(|| WindowError::Codec("unexpected end of input".to_string()))?;
    *pos += 1;
    Ok(byte)
}

/// Read a big-endian i64 at `pos`, advancing it.
pub(crate) fn read_i64_be(buf: &[u8], pos: &mut usize) -> Result<i64> {
    let end = pos
        .checked_add(8)
        .filter(|end| *end <= buf.len())
        .ok_or_else(|| WindowError::Codec("unexpected end of input".to_string()))?;
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[*pos..end]);
    *pos = end;
    Ok(i64::from_be_bytes(bytes))
}
