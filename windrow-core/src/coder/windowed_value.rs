use super::*;

/// Portable byte encoding for [`WindowedValue`]:
///
/// ```text
/// value_bytes | timestamp:i64be | window_count:varint | window_token* | pane
/// pane = timing:u8 | index:i64be | is_last:u8
/// ```
///
/// The value is encoded with bincode, which is self-delimiting on decode, so
/// no length prefix is needed. Window tokens use this coder's
/// [`WindowCoder`]. `decode(encode(x))` reproduces the value, timestamp,
/// window set, and pane of `x`; the pane's derived fields (`is_first`,
/// `non_speculative_index`) are reconstructed from the encoded timing and
/// index.
pub struct WindowedValueCoder {
    window_coder: WindowCoder,
}

impl WindowedValueCoder {
    pub fn new(window_coder: WindowCoder) -> Self {
        Self { window_coder }
    }

    /// The coder matching a policy's window type.
    ///
    /// Fails for an opaque policy, whose windows have no local coder.
    pub fn for_window_fn(window_fn: &crate::window::WindowFn) -> Result<Self> {
        Ok(Self::new(window_fn.window_coder()?))
    }

    pub fn encode<T: ElementData>(&self, value: &WindowedValue<T>) -> Result<Vec<u8>> {
        let mut buf = bincode::serialize(&value.value)
            .map_err(|err| WindowError::Codec(format!("value encode failed: {err}")))?;
        buf.extend_from_slice(&value.timestamp.to_be_bytes());
        write_varint(&mut buf, value.windows.len() as u64);
        for window in &value.windows {
            self.window_coder.encode(window, &mut buf)?;
        }
        buf.push(value.pane.timing as u8);
        buf.extend_from_slice(&value.pane.index.to_be_bytes());
        buf.push(u8::from(value.pane.is_last));
        Ok(buf)
    }

    pub fn decode<T: ElementData>(&self, bytes: &[u8]) -> Result<WindowedValue<T>> {
        let mut cursor = std::io::Cursor::new(bytes);
        let value: T = bincode::deserialize_from(&mut cursor)
            .map_err(|err| WindowError::Codec(format!("value decode failed: {err}")))?;
        let mut pos = cursor.position() as usize;

        let timestamp = read_i64_be(bytes, &mut pos)?;
        let count = read_varint(bytes, &mut pos)?;
        if count == 0 {
            return Err(WindowError::Codec(
                "windowed value must carry at least one window".to_string(),
            ));
        }
        let mut windows = Vec::with_capacity(count as usize);
        for _ in 0..count {
            windows.push(self.window_coder.decode(bytes, &mut pos)?);
        }

        let timing = Timing::try_from(read_u8(bytes, &mut pos)?)?;
        let index = read_i64_be(bytes, &mut pos)?;
        let is_last = match read_u8(bytes, &mut pos)? {
            0 => false,
            1 => true,
            other => {
                return Err(WindowError::Codec(format!("invalid is_last byte: {other}")));
            }
        };
        if pos != bytes.len() {
            return Err(WindowError::Codec(format!(
                "{} trailing bytes after windowed value",
                bytes.len() - pos
            )));
        }

        // is_first and the non-speculative index are not on the wire; they
        // are recomputed from the encoded timing and index.
        let non_speculative_index = match timing {
            Timing::Early => -1,
            Timing::OnTime | Timing::Late => index,
        };
        let pane = PaneInfo::new(timing, index, non_speculative_index, index == 0, is_last);
        WindowedValue::with_windows(value, timestamp, windows, pane)
    }
}
