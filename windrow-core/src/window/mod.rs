use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::coder::WindowCoder;
use crate::error::{Result, WindowError};
use crate::types::{
    clamp_timestamp, clamp_window_end, ElementData, Timestamp, WindowedValue, TIMESTAMP_MAX,
};

mod assigners;
mod merge;
mod primitives;
mod runner;

pub use assigners::*;
pub use merge::*;
pub use primitives::*;
pub use runner::*;

#[cfg(test)]
#[path = "tests/window_tests.rs"]
mod tests;
