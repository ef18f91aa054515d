use super::*;

/// A windowing policy: assigns every element to one or more windows and,
/// for session windowing, merges windows that grow together.
///
/// Policies are pure, immutable values constructed once at pipeline build
/// time. `assign_windows` depends only on the element timestamp and
/// `merge_windows` only on the window set, so retries and speculative
/// re-execution reproduce identical results.
///
/// The four well-known policies are portable across runtimes through the
/// descriptor contract in [`crate::translation`]; anything else travels as
/// [`WindowFn::Custom`] and is never applied locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowFn {
    /// Every element into the single global window. Never merges.
    Global,
    /// Fixed-size, non-overlapping windows aligned to multiples of `size_ms`
    /// shifted by `offset_ms`. Exactly one window per element.
    Fixed { size_ms: i64, offset_ms: i64 },
    /// Fixed-size windows advanced every `period_ms`; an element belongs to
    /// `size_ms / period_ms` windows.
    Sliding {
        size_ms: i64,
        period_ms: i64,
        offset_ms: i64,
    },
    /// Gap-based windows: each element starts a `[ts, ts + gap)` proto
    /// session; the merging engine coalesces overlapping sessions.
    Sessions { gap_ms: i64 },
    /// A policy this runtime cannot execute. Carried opaquely so the
    /// descriptor survives a round trip; applying it locally fails and the
    /// caller must delegate to `environment`.
    Custom {
        urn: String,
        payload: Vec<u8>,
        environment: String,
    },
}

impl WindowFn {
    pub fn global() -> Self {
        WindowFn::Global
    }

    /// Fixed windows of the given `size`, aligned to multiples of it.
    pub fn fixed(size: Duration) -> Result<Self> {
        Self::fixed_with_offset(size, Duration::ZERO)
    }

    /// Fixed windows with a non-zero alignment `offset`.
    pub fn fixed_with_offset(size: Duration, offset: Duration) -> Result<Self> {
        let size_ms = size.as_millis() as i64;
        let offset_ms = offset.as_millis() as i64;
        if size_ms <= 0 {
            return Err(WindowError::Configuration(
                "fixed window size must be positive".to_string(),
            ));
        }
        if offset_ms >= size_ms {
            return Err(WindowError::Configuration(format!(
                "fixed window offset {offset_ms}ms must be smaller than size {size_ms}ms"
            )));
        }
        Ok(WindowFn::Fixed { size_ms, offset_ms })
    }

    /// Sliding windows of the given `size` advancing every `period`.
    pub fn sliding(size: Duration, period: Duration) -> Result<Self> {
        Self::sliding_with_offset(size, period, Duration::ZERO)
    }

    /// Sliding windows with a non-zero alignment `offset`.
    ///
    /// `period` must divide `size` evenly so that every element lands in
    /// exactly `size / period` windows.
    pub fn sliding_with_offset(size: Duration, period: Duration, offset: Duration) -> Result<Self> {
        let size_ms = size.as_millis() as i64;
        let period_ms = period.as_millis() as i64;
        let offset_ms = offset.as_millis() as i64;
        if size_ms <= 0 || period_ms <= 0 {
            return Err(WindowError::Configuration(
                "sliding window size and period must be positive".to_string(),
            ));
        }
        if period_ms > size_ms {
            return Err(WindowError::Configuration(format!(
                "sliding window period {period_ms}ms must not exceed size {size_ms}ms"
            )));
        }
        if size_ms % period_ms != 0 {
            return Err(WindowError::Configuration(format!(
                "sliding window period {period_ms}ms must divide size {size_ms}ms evenly"
            )));
        }
        if offset_ms >= period_ms {
            return Err(WindowError::Configuration(format!(
                "sliding window offset {offset_ms}ms must be smaller than period {period_ms}ms"
            )));
        }
        Ok(WindowFn::Sliding {
            size_ms,
            period_ms,
            offset_ms,
        })
    }

    /// Session windows with the given minimum `gap` between sessions.
    pub fn sessions(gap: Duration) -> Result<Self> {
        let gap_ms = gap.as_millis() as i64;
        if gap_ms <= 0 {
            return Err(WindowError::Configuration(
                "session gap must be positive".to_string(),
            ));
        }
        Ok(WindowFn::Sessions { gap_ms })
    }

    /// An opaque policy owned by a foreign environment.
    pub fn custom(urn: impl Into<String>, payload: Vec<u8>, environment: impl Into<String>) -> Self {
        WindowFn::Custom {
            urn: urn.into(),
            payload,
            environment: environment.into(),
        }
    }

    /// Return the windows containing the element with the given timestamp.
    ///
    /// Pure function of the timestamp; re-execution yields identical
    /// results. The result is never empty for a native policy. Arithmetic is
    /// done in i128 and clamped so sentinel timestamps saturate at the
    /// representable range instead of wrapping; exclusive end bounds may
    /// saturate one unit further, so a window assigned at either sentinel
    /// still contains its element.
    pub fn assign_windows(&self, timestamp: Timestamp) -> Result<Vec<Window>> {
        match *self {
            WindowFn::Global => Ok(vec![Window::Global]),

            WindowFn::Fixed { size_ms, offset_ms } => {
                let ts = timestamp as i128;
                let size = size_ms as i128;
                let start = ts - (ts - offset_ms as i128).rem_euclid(size);
                Ok(vec![Window::interval(
                    clamp_timestamp(start),
                    clamp_window_end(start + size),
                )])
            }

            WindowFn::Sliding {
                size_ms,
                period_ms,
                offset_ms,
            } => {
                // Walk back from the last window start by `period` until no
                // window covers the timestamp.
                let ts = timestamp as i128;
                let size = size_ms as i128;
                let period = period_ms as i128;
                let last_start = ts - (ts - offset_ms as i128).rem_euclid(period);
                let mut windows = Vec::with_capacity((size_ms / period_ms) as usize);
                let mut start = last_start;
                while start > ts - size {
                    windows.push(Window::interval(
                        clamp_timestamp(start),
                        clamp_window_end(start + size),
                    ));
                    start -= period;
                }
                Ok(windows)
            }

            WindowFn::Sessions { gap_ms } => {
                let ts = timestamp as i128;
                Ok(vec![Window::interval(
                    clamp_timestamp(ts),
                    clamp_window_end(ts + gap_ms as i128),
                )])
            }

            WindowFn::Custom {
                ref urn,
                ref environment,
                ..
            } => Err(WindowError::Unsupported(format!(
                "window fn {urn} cannot be applied locally; delegate to environment {environment}"
            ))),
        }
    }

    /// Merge the active window set down to a partition with no overlapping
    /// windows, reporting each coalescing step as a [`MergeRecord`].
    ///
    /// Only session windowing merges. Interval coalescing is associative and
    /// commutative, so the final partition depends only on the window *set*,
    /// never on arrival or processing order.
    pub fn merge_windows(&self, active: &BTreeSet<Window>) -> Result<Vec<MergeRecord>> {
        match *self {
            WindowFn::Sessions { .. } => merge_overlapping_intervals(active),
            WindowFn::Custom {
                ref urn,
                ref environment,
                ..
            } => Err(WindowError::Unsupported(format!(
                "window fn {urn} cannot merge locally; delegate to environment {environment}"
            ))),
            _ => Err(WindowError::Unsupported(format!(
                "{} windowing does not merge",
                self.urn_hint()
            ))),
        }
    }

    /// Whether this policy produces windows that must be merged before
    /// grouping.
    ///
    /// `Custom` reports false: an opaque policy is never merged locally, it
    /// is delegated wholesale.
    pub fn is_merging(&self) -> bool {
        matches!(self, WindowFn::Sessions { .. })
    }

    /// Whether this policy assigns exactly one window per timestamp,
    /// partitioning the time axis.
    pub fn is_partitioning(&self) -> bool {
        matches!(self, WindowFn::Global | WindowFn::Fixed { .. })
    }

    /// Structural compatibility: two usages of "the same" windowing intend
    /// the same semantics only if all parameters match.
    pub fn is_compatible(&self, other: &WindowFn) -> bool {
        self == other
    }

    /// The coder for this policy's window type.
    pub fn window_coder(&self) -> Result<WindowCoder> {
        match self {
            WindowFn::Global => Ok(WindowCoder::Global),
            WindowFn::Fixed { .. } | WindowFn::Sliding { .. } | WindowFn::Sessions { .. } => {
                Ok(WindowCoder::Interval)
            }
            WindowFn::Custom { urn, .. } => Err(WindowError::Unsupported(format!(
                "no local window coder for opaque window fn {urn}"
            ))),
        }
    }

    /// Map a window of an upstream windowing to the window of this policy
    /// used for side-input style lookups: the assigned window containing the
    /// upstream window's maximum timestamp.
    pub fn default_window_mapping(&self, window: &Window) -> Result<Window> {
        match self {
            WindowFn::Global => Ok(Window::Global),
            WindowFn::Fixed { .. } | WindowFn::Sliding { .. } => {
                let assigned = self.assign_windows(window.max_timestamp())?;
                assigned
                    .into_iter()
                    .max()
                    .ok_or_else(|| {
                        WindowError::InvariantViolation(
                            "assignment produced no windows".to_string(),
                        )
                    })
            }
            WindowFn::Sessions { .. } => Err(WindowError::Unsupported(
                "session windows have no default window mapping".to_string(),
            )),
            WindowFn::Custom { urn, .. } => Err(WindowError::Unsupported(format!(
                "no local window mapping for opaque window fn {urn}"
            ))),
        }
    }

    fn urn_hint(&self) -> &'static str {
        match self {
            WindowFn::Global => "global",
            WindowFn::Fixed { .. } => "fixed",
            WindowFn::Sliding { .. } => "sliding",
            WindowFn::Sessions { .. } => "sessions",
            WindowFn::Custom { .. } => "custom",
        }
    }
}

/// Classic interval merge: scan windows in start order, coalescing every run
/// of overlapping-or-touching intervals into its span. One record per run
/// that actually coalesces two or more windows.
fn merge_overlapping_intervals(active: &BTreeSet<Window>) -> Result<Vec<MergeRecord>> {
    let mut records = Vec::new();
    let mut run: Vec<IntervalWindow> = Vec::new();
    let mut span: Option<IntervalWindow> = None;

    let mut flush = |span: IntervalWindow, run: &mut Vec<IntervalWindow>| {
        if run.len() > 1 {
            records.push(MergeRecord {
                absorbed: run.iter().copied().map(Window::Interval).collect(),
                survivor: Window::Interval(span),
            });
        }
        run.clear();
    };

    for window in active {
        let interval = *window.as_interval().ok_or_else(|| {
            WindowError::InvariantViolation(
                "session merge requires interval windows".to_string(),
            )
        })?;
        match span {
            Some(current) if current.intersects_or_abuts(&interval) => {
                span = Some(current.span(&interval));
                run.push(interval);
            }
            Some(current) => {
                flush(current, &mut run);
                span = Some(interval);
                run.push(interval);
            }
            None => {
                span = Some(interval);
                run.push(interval);
            }
        }
    }
    if let Some(current) = span {
        flush(current, &mut run);
    }
    Ok(records)
}
