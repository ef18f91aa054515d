use super::*;

/// A half-open event-time interval `[start, end)`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct IntervalWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl IntervalWindow {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// The latest timestamp that still belongs to this window.
    pub fn max_timestamp(&self) -> Timestamp {
        self.end - 1
    }

    /// Return true if `timestamp` falls inside this window.
    pub fn contains(&self, timestamp: Timestamp) -> bool {
        timestamp >= self.start && timestamp < self.end
    }

    /// Return true if the two intervals overlap or touch end-to-start.
    /// Touching intervals belong to the same session.
    pub fn intersects_or_abuts(&self, other: &IntervalWindow) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// The smallest interval covering both windows.
    pub fn span(&self, other: &IntervalWindow) -> IntervalWindow {
        IntervalWindow::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl std::fmt::Display for IntervalWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// The unit of grouping: a bounded interval or the unbounded global window.
///
/// This is the closed set of window shapes the engine can materialize
/// natively. Opaque policies owned by a foreign environment never produce
/// local windows; their values are delegated instead (see
/// [`WindowFn::Custom`]).
///
/// Ordering is (variant, start, end), giving merge passes a deterministic
/// iteration order regardless of arrival order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Window {
    /// The singleton window spanning all of event time.
    Global,
    /// A bounded `[start, end)` interval, used by fixed, sliding, and
    /// session windowing.
    Interval(IntervalWindow),
}

impl Window {
    pub fn interval(start: Timestamp, end: Timestamp) -> Self {
        Window::Interval(IntervalWindow::new(start, end))
    }

    /// The latest timestamp that still belongs to this window. Triggers fire
    /// a window once the watermark passes this instant.
    pub fn max_timestamp(&self) -> Timestamp {
        match self {
            Window::Global => TIMESTAMP_MAX,
            Window::Interval(w) => w.max_timestamp(),
        }
    }

    /// Return true if `timestamp` falls inside this window.
    pub fn contains(&self, timestamp: Timestamp) -> bool {
        match self {
            Window::Global => true,
            Window::Interval(w) => w.contains(timestamp),
        }
    }

    pub fn as_interval(&self) -> Option<&IntervalWindow> {
        match self {
            Window::Global => None,
            Window::Interval(w) => Some(w),
        }
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Window::Global => f.write_str("GlobalWindow"),
            Window::Interval(w) => write!(f, "IntervalWindow{w}"),
        }
    }
}
