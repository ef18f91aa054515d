use thiserror::Error;

/// Errors raised by window assignment, merging, and strategy translation.
///
/// All engine operations fail synchronously and emit nothing for the
/// offending element; the enclosing execution harness decides whether to
/// retry the bundle.
#[derive(Debug, Error)]
pub enum WindowError {
    /// A windowing policy or descriptor was constructed with bad parameters.
    /// Fatal to the construction step that produced it.
    #[error("configuration: {0}")]
    Configuration(String),

    /// An engine precondition was violated by the caller, e.g. the assignment
    /// runner received a value carrying more than one window.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// A merge pass produced a different partition than a prior pass over an
    /// equal window set. Contract violation of the supplied policy; never
    /// silently repaired.
    #[error("non-deterministic merge: {0}")]
    NonDeterminism(String),

    /// The operation is not provided by this policy, e.g. `merge_windows` on
    /// a non-merging policy, or local application of an opaque policy that
    /// must be delegated to its owning environment.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// A byte sequence could not be decoded as a window or windowed value.
    #[error("codec: {0}")]
    Codec(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, WindowError>;
