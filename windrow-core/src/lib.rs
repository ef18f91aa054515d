//! # Windrow Core
//!
//! Window assignment and merging engine for event-time stream processing.
//!
//! Every element entering a pipeline is wrapped in a
//! [`WindowedValue`](types::WindowedValue): the element itself, its event-time
//! timestamp, the set of windows it belongs to, and pane metadata describing
//! the firing that produced it. This crate decides *which* windows an element
//! belongs to and *how* dynamically growing windows (sessions) are merged; it
//! deliberately does not decide *when* a window fires (triggering) or how far
//! event time has progressed (watermarks). Those are upstream collaborators.
//!
//! - [`types`] — [`Timestamp`](types::Timestamp) and its sentinels,
//!   [`PaneInfo`](types::PaneInfo), [`WindowedValue`](types::WindowedValue).
//! - [`window`] — the [`WindowFn`](window::WindowFn) policy enum with the four
//!   well-known policies, the [`AssignmentRunner`](window::AssignmentRunner)
//!   fan-out, and the [`MergingWindowSet`](window::MergingWindowSet) used by
//!   keyed grouping.
//! - [`coder`] — portable byte encodings for windows and windowed values.
//! - [`translation`] — the descriptor contract that ships a windowing policy
//!   to a foreign runtime, plus the URN registry that reconstructs one.
//! - [`error`] — the [`WindowError`](error::WindowError) taxonomy.

pub mod coder;
pub mod error;
pub mod translation;
pub mod types;
pub mod window;
