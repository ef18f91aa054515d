use std::collections::hash_map::Entry;

use ahash::AHashMap;

use super::*;

// ── MergeRecord ───────────────────────────────────────────────────────────────

/// One consolidation step: the `absorbed` windows lose their identity and
/// their buffered state and timers must be relocated onto `survivor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRecord {
    pub absorbed: Vec<Window>,
    pub survivor: Window,
}

// ── MergingWindowSet ──────────────────────────────────────────────────────────

/// The set of windows with buffered-but-not-yet-emitted state for one key.
///
/// Each arriving window is added to the set and the policy's
/// `merge_windows` is driven to a fixed point; every merge record is handed
/// to the caller so the grouping operator can migrate per-window state
/// before the absorbed windows disappear from the active set.
///
/// Merging proceeds incrementally as windows arrive; the final partition
/// depends only on the set of windows seen so far, never on arrival order,
/// provided the policy honors its order-independence contract.
///
/// # Concurrency
/// Updates for a single key must be serialized; a `MergingWindowSet` is
/// owned by exactly one task at a time. Sets for different keys are fully
/// independent.
pub struct MergingWindowSet {
    window_fn: WindowFn,
    active: BTreeSet<Window>,
}

impl MergingWindowSet {
    /// Create an empty set for the given policy.
    ///
    /// Fails with `Unsupported` for an opaque policy: merging must happen in
    /// the environment that owns it.
    pub fn new(window_fn: WindowFn) -> Result<Self> {
        if let WindowFn::Custom { urn, .. } = &window_fn {
            return Err(WindowError::Unsupported(format!(
                "cannot maintain a local merge set for opaque window fn {urn}"
            )));
        }
        Ok(Self {
            window_fn,
            active: BTreeSet::new(),
        })
    }

    /// Add a newly arrived window and merge to a fixed point.
    ///
    /// `on_merge` is invoked once per merge record, before the active set is
    /// updated, so the callback still observes the absorbed windows as
    /// active. Returns the window that now holds the new window's state:
    /// the window itself if nothing merged, otherwise the survivor it was
    /// absorbed into.
    pub fn add_window(
        &mut self,
        window: Window,
        mut on_merge: impl FnMut(&MergeRecord) -> Result<()>,
    ) -> Result<Window> {
        self.active.insert(window);
        if !self.window_fn.is_merging() {
            return Ok(window);
        }

        let mut holder = window;
        loop {
            let records = self.window_fn.merge_windows(&self.active)?;
            if records.is_empty() {
                break;
            }
            for record in &records {
                tracing::trace!(
                    absorbed = record.absorbed.len(),
                    survivor = %record.survivor,
                    "merging windows"
                );
                on_merge(record)?;
                for absorbed in &record.absorbed {
                    self.active.remove(absorbed);
                }
                self.active.insert(record.survivor);
                if record.absorbed.contains(&holder) {
                    holder = record.survivor;
                }
            }
        }
        Ok(holder)
    }

    /// Drop a window whose state has been emitted by the triggering
    /// collaborator. Terminal: the window is gone from the active set and
    /// can no longer absorb or be absorbed.
    ///
    /// Returns false if the window was not active.
    pub fn retire(&mut self, window: &Window) -> bool {
        self.active.remove(window)
    }

    /// The currently active windows, in deterministic order.
    pub fn active(&self) -> &BTreeSet<Window> {
        &self.active
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }
}

// ── KeyedMergeTracker ─────────────────────────────────────────────────────────

/// Per-key merging window sets for a keyed grouping operator, addressed by
/// serialized key bytes.
pub struct KeyedMergeTracker {
    window_fn: WindowFn,
    keys: AHashMap<Vec<u8>, MergingWindowSet>,
}

impl KeyedMergeTracker {
    pub fn new(window_fn: WindowFn) -> Result<Self> {
        // Fail construction early for policies that cannot merge locally.
        MergingWindowSet::new(window_fn.clone())?;
        Ok(Self {
            window_fn,
            keys: AHashMap::new(),
        })
    }

    /// Add a window for `key_bytes`, creating the key's set on first use.
    pub fn add_window(
        &mut self,
        key_bytes: &[u8],
        window: Window,
        on_merge: impl FnMut(&MergeRecord) -> Result<()>,
    ) -> Result<Window> {
        let set = match self.keys.entry(key_bytes.to_vec()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(MergingWindowSet::new(self.window_fn.clone())?),
        };
        set.add_window(window, on_merge)
    }

    /// Retire a fired window for a key, dropping the key's set once empty.
    pub fn retire(&mut self, key_bytes: &[u8], window: &Window) -> bool {
        let Some(set) = self.keys.get_mut(key_bytes) else {
            return false;
        };
        let removed = set.retire(window);
        if set.is_empty() {
            self.keys.remove(key_bytes);
        }
        removed
    }

    pub fn window_set(&self, key_bytes: &[u8]) -> Option<&MergingWindowSet> {
        self.keys.get(key_bytes)
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }
}

// ── Consistency check ─────────────────────────────────────────────────────────

/// Verify that incremental merging of `windows` converges to the same final
/// partition regardless of insertion order.
///
/// Replays the windows in the given order and in sorted order and compares
/// the resulting active sets. A mismatch is a contract violation of the
/// policy and is reported as `NonDeterminism`, never repaired. Intended for
/// tests and debug assertions around untrusted policies.
pub fn check_merge_consistency(window_fn: &WindowFn, windows: &[Window]) -> Result<()> {
    let as_given = replay(window_fn, windows.iter().copied())?;
    let mut sorted: Vec<Window> = windows.to_vec();
    sorted.sort();
    let resorted = replay(window_fn, sorted.into_iter())?;
    if as_given != resorted {
        return Err(WindowError::NonDeterminism(format!(
            "merge partition depends on arrival order: {as_given:?} vs {resorted:?}"
        )));
    }
    Ok(())
}

fn replay(
    window_fn: &WindowFn,
    windows: impl Iterator<Item = Window>,
) -> Result<BTreeSet<Window>> {
    let mut set = MergingWindowSet::new(window_fn.clone())?;
    for window in windows {
        set.add_window(window, |_| Ok(()))?;
    }
    Ok(set.active.clone())
}
