use super::*;

/// Reversible byte encoding for one [`Window`] shape.
///
/// Tokens are self-delimiting: the global window encodes to zero bytes and
/// an interval window to a fixed 16-byte big-endian `start | end` pair, so a
/// decoder that knows the coder needs no length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowCoder {
    Global,
    Interval,
}

impl WindowCoder {
    /// Append the window's token to `buf`.
    ///
    /// Fails with `Codec` if the window shape does not match this coder.
    pub fn encode(&self, window: &Window, buf: &mut Vec<u8>) -> Result<()> {
        match (self, window) {
            (WindowCoder::Global, Window::Global) => Ok(()),
            (WindowCoder::Interval, Window::Interval(w)) => {
                buf.extend_from_slice(&w.start.to_be_bytes());
                buf.extend_from_slice(&w.end.to_be_bytes());
                Ok(())
            }
            (coder, window) => Err(WindowError::Codec(format!(
                "window {window} does not match coder {coder:?}"
            ))),
        }
    }

    /// Decode one window token at `pos`, advancing it.
    pub fn decode(&self, buf: &[u8], pos: &mut usize) -> Result<Window> {
        match self {
            WindowCoder::Global => Ok(Window::Global),
            WindowCoder::Interval => {
                let start = read_i64_be(buf, pos)?;
                let end = read_i64_be(buf, pos)?;
                if end <= start {
                    return Err(WindowError::Codec(format!(
                        "interval window end {end} must be after start {start}"
                    )));
                }
                Ok(Window::Interval(IntervalWindow::new(start, end)))
            }
        }
    }
}
