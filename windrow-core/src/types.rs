use serde::{Deserialize, Serialize};

use crate::error::{Result, WindowError};
use crate::window::Window;

/// Event time in milliseconds, as a signed 64-bit count.
pub type Timestamp = i64;

/// The earliest representable event time.
///
/// Kept one unit inside `i64::MIN` so that window arithmetic near the
/// boundary can saturate instead of wrapping.
pub const TIMESTAMP_MIN: Timestamp = i64::MIN + 1;

/// The latest representable event time.
///
/// Kept one unit inside `i64::MAX`; the global window's `max_timestamp()`
/// is this value.
pub const TIMESTAMP_MAX: Timestamp = i64::MAX - 1;

/// Clamp an arbitrary 128-bit intermediate back into the representable
/// event-time range. Window arithmetic (`start + size`, `ts - offset`) is
/// done in i128 and clamped so sentinel inputs never wrap.
pub(crate) fn clamp_timestamp(ts: i128) -> Timestamp {
    if ts < TIMESTAMP_MIN as i128 {
        TIMESTAMP_MIN
    } else if ts > TIMESTAMP_MAX as i128 {
        TIMESTAMP_MAX
    } else {
        ts as Timestamp
    }
}

/// Clamp a window *end* bound. Ends are exclusive, so they may sit one unit
/// past `TIMESTAMP_MAX`: a window assigned at the latest representable
/// timestamp still contains it, and its `max_timestamp()` lands exactly on
/// `TIMESTAMP_MAX` instead of collapsing the window to an empty interval.
pub(crate) fn clamp_window_end(ts: i128) -> Timestamp {
    if ts < TIMESTAMP_MIN as i128 {
        TIMESTAMP_MIN
    } else if ts > i64::MAX as i128 {
        i64::MAX
    } else {
        ts as Timestamp
    }
}

// ── PaneInfo ──────────────────────────────────────────────────────────────────

/// When a pane fired relative to the watermark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Timing {
    /// Fired before the watermark passed the end of the window.
    Early = 0,
    /// The one firing produced when the watermark passes the window end.
    OnTime = 1,
    /// Fired after the on-time pane, for late data.
    Late = 2,
}

impl TryFrom<u8> for Timing {
    type Error = WindowError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Timing::Early),
            1 => Ok(Timing::OnTime),
            2 => Ok(Timing::Late),
            other => Err(WindowError::Codec(format!("unknown pane timing: {other}"))),
        }
    }
}

/// Metadata describing the firing that produced a grouped result.
///
/// Produced and consumed by the triggering collaborator; this engine only
/// carries it through assignment unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaneInfo {
    pub timing: Timing,
    /// Monotonically increasing firing index within a window, starting at 0.
    pub index: i64,
    /// Index among on-time/late firings only; -1 before the first
    /// non-speculative firing.
    pub non_speculative_index: i64,
    pub is_first: bool,
    pub is_last: bool,
}

impl PaneInfo {
    /// The pane carried by elements that have not been through a grouping
    /// yet: a single on-time firing.
    pub const NO_FIRING: PaneInfo = PaneInfo {
        timing: Timing::OnTime,
        index: 0,
        non_speculative_index: 0,
        is_first: true,
        is_last: true,
    };

    pub fn new(
        timing: Timing,
        index: i64,
        non_speculative_index: i64,
        is_first: bool,
        is_last: bool,
    ) -> Self {
        Self {
            timing,
            index,
            non_speculative_index,
            is_first,
            is_last,
        }
    }
}

impl Default for PaneInfo {
    fn default() -> Self {
        Self::NO_FIRING
    }
}

// ── WindowedValue ─────────────────────────────────────────────────────────────

/// Trait bound for element payloads flowing through the engine.
pub trait ElementData: Send + Clone + Serialize + for<'de> Deserialize<'de> + 'static {}

// Blanket implementation: any type satisfying the bounds is ElementData.
impl<T> ElementData for T where T: Send + Clone + Serialize + for<'de> Deserialize<'de> + 'static {}

/// An element paired with its event-time timestamp, the windows it belongs
/// to, and the pane that produced it.
///
/// # Invariant
/// `windows` is never empty. Constructors that accept an arbitrary window
/// collection enforce this; the single-window constructors cannot violate it.
/// Downstream consumers must treat `windows` as an unordered set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowedValue<T> {
    pub value: T,
    pub timestamp: Timestamp,
    pub windows: Vec<Window>,
    pub pane: PaneInfo,
}

impl<T> WindowedValue<T> {
    /// Wrap a value in the global window at `TIMESTAMP_MIN`, the state of
    /// every element at ingestion before explicit windowing.
    pub fn in_global_window(value: T) -> Self {
        Self {
            value,
            timestamp: TIMESTAMP_MIN,
            windows: vec![Window::Global],
            pane: PaneInfo::NO_FIRING,
        }
    }

    /// Wrap a timestamped value in the global window.
    pub fn timestamped_in_global_window(value: T, timestamp: Timestamp) -> Self {
        Self {
            value,
            timestamp,
            windows: vec![Window::Global],
            pane: PaneInfo::NO_FIRING,
        }
    }

    /// Wrap a value in exactly one window.
    pub fn in_window(value: T, timestamp: Timestamp, window: Window, pane: PaneInfo) -> Self {
        Self {
            value,
            timestamp,
            windows: vec![window],
            pane,
        }
    }

    /// Wrap a value in an arbitrary window set.
    ///
    /// Fails with `InvariantViolation` if `windows` is empty.
    pub fn with_windows(
        value: T,
        timestamp: Timestamp,
        windows: Vec<Window>,
        pane: PaneInfo,
    ) -> Result<Self> {
        if windows.is_empty() {
            return Err(WindowError::InvariantViolation(
                "windowed value must carry at least one window".to_string(),
            ));
        }
        Ok(Self {
            value,
            timestamp,
            windows,
            pane,
        })
    }

    /// Return the single window this value belongs to.
    ///
    /// Fails with `InvariantViolation` if the value carries more than one
    /// window; callers that require the single-window form (the assignment
    /// runner) use this as their precondition check.
    pub fn single_window(&self) -> Result<&Window> {
        match self.windows.as_slice() {
            [window] => Ok(window),
            _ => Err(WindowError::InvariantViolation(format!(
                "expected exactly one window, found {}",
                self.windows.len()
            ))),
        }
    }
}

impl<T: Clone> WindowedValue<T> {
    /// Split a multi-window value into one single-window sibling per window.
    /// Timestamp and pane are copied unchanged.
    pub fn explode(self) -> Vec<WindowedValue<T>> {
        let Self {
            value,
            timestamp,
            windows,
            pane,
        } = self;
        windows
            .into_iter()
            .map(|window| WindowedValue::in_window(value.clone(), timestamp, window, pane))
            .collect()
    }
}

#[cfg(test)]
#[path = "tests/types_tests.rs"]
mod tests;
