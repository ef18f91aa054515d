use super::*;

// ── AssignmentRunner ──────────────────────────────────────────────────────────

/// Applies a [`WindowFn`] to single-window values, fanning each out into one
/// sibling per assigned window.
///
/// Assignment is defined only immediately after ingestion or another
/// single-window-producing step: an input carrying more than one window is
/// rejected with `InvariantViolation` and produces no output. Timestamp and
/// pane are copied unchanged onto every sibling, and the siblings form a
/// set, their order carries no meaning.
///
/// The runner is pure and stateless; any number of elements may be assigned
/// concurrently against the same runner without synchronization.
pub struct AssignmentRunner {
    window_fn: WindowFn,
}

impl AssignmentRunner {
    pub fn new(window_fn: WindowFn) -> Self {
        Self { window_fn }
    }

    pub fn window_fn(&self) -> &WindowFn {
        &self.window_fn
    }

    /// Assign windows to a single-window value.
    ///
    /// Returns one output per assigned window (N >= 1). On error nothing is
    /// emitted, so downstream window sets stay complete and consistent.
    pub fn assign<T: ElementData>(&self, value: WindowedValue<T>) -> Result<Vec<WindowedValue<T>>> {
        value.single_window()?;
        let windows = self.window_fn.assign_windows(value.timestamp)?;
        if windows.is_empty() {
            return Err(WindowError::InvariantViolation(
                "window fn assigned no windows".to_string(),
            ));
        }
        let WindowedValue {
            value,
            timestamp,
            pane,
            ..
        } = value;
        Ok(windows
            .into_iter()
            .map(|window| WindowedValue::in_window(value.clone(), timestamp, window, pane))
            .collect())
    }

    /// Explode a multi-window value into single-window siblings and assign
    /// each one, concatenating the fan-outs.
    ///
    /// This is the map-style entry point used when re-windowing a value that
    /// already went through a previous assignment.
    pub fn assign_exploded<T: ElementData>(
        &self,
        value: WindowedValue<T>,
    ) -> Result<Vec<WindowedValue<T>>> {
        let mut out = Vec::new();
        for single in value.explode() {
            out.extend(self.assign(single)?);
        }
        Ok(out)
    }
}
