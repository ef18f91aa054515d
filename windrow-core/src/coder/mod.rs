use crate::error::{Result, WindowError};
use crate::types::{ElementData, PaneInfo, Timing, WindowedValue};
use crate::window::{IntervalWindow, Window};

mod varint;
mod window_coder;
mod windowed_value;

pub use varint::*;
pub use window_coder::*;
pub use windowed_value::*;

#[cfg(test)]
#[path = "tests/coder_tests.rs"]
mod tests;
