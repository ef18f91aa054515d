use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WindowError};
use crate::window::WindowFn;

// ── Well-known URNs ───────────────────────────────────────────────────────────

pub const GLOBAL_WINDOWS_URN: &str = "windrow:window_fn:global:v1";
pub const FIXED_WINDOWS_URN: &str = "windrow:window_fn:fixed:v1";
pub const SLIDING_WINDOWS_URN: &str = "windrow:window_fn:sliding:v1";
pub const SESSION_WINDOWS_URN: &str = "windrow:window_fn:sessions:v1";

// ── Descriptor ────────────────────────────────────────────────────────────────

/// The portable form of a windowing policy, shipped between independently
/// implemented runtimes.
///
/// Well-known URNs must be recognized and reconstructed natively by any
/// conforming runtime regardless of which runtime authored the descriptor.
/// Anything else travels as an opaque payload plus the environment that can
/// execute it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WindowFnDescriptor {
    pub urn: String,
    /// URN-specific encoded parameters.
    pub payload: Vec<u8>,
    /// Present only for opaque policies: identifies where the implementation
    /// actually runs.
    pub environment: Option<String>,
}

impl WindowFnDescriptor {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|err| WindowError::Codec(format!("descriptor encode failed: {err}")))
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|err| WindowError::Codec(format!("descriptor decode failed: {err}")))
    }
}

// Payload parameter structs for the well-known URNs. Durations travel as
// millisecond counts, matching the engine's timestamp unit.

#[derive(Serialize, Deserialize)]
struct FixedPayload {
    size_ms: i64,
    offset_ms: i64,
}

#[derive(Serialize, Deserialize)]
struct SlidingPayload {
    size_ms: i64,
    period_ms: i64,
    offset_ms: i64,
}

#[derive(Serialize, Deserialize)]
struct SessionsPayload {
    gap_ms: i64,
}

/// Encode a policy as its portable descriptor.
pub fn to_descriptor(window_fn: &WindowFn) -> Result<WindowFnDescriptor> {
    let (urn, payload, environment) = match window_fn {
        WindowFn::Global => (GLOBAL_WINDOWS_URN.to_string(), Vec::new(), None),
        WindowFn::Fixed { size_ms, offset_ms } => (
            FIXED_WINDOWS_URN.to_string(),
            encode_payload(&FixedPayload {
                size_ms: *size_ms,
                offset_ms: *offset_ms,
            })?,
            None,
        ),
        WindowFn::Sliding {
            size_ms,
            period_ms,
            offset_ms,
        } => (
            SLIDING_WINDOWS_URN.to_string(),
            encode_payload(&SlidingPayload {
                size_ms: *size_ms,
                period_ms: *period_ms,
                offset_ms: *offset_ms,
            })?,
            None,
        ),
        WindowFn::Sessions { gap_ms } => (
            SESSION_WINDOWS_URN.to_string(),
            encode_payload(&SessionsPayload { gap_ms: *gap_ms })?,
            None,
        ),
        WindowFn::Custom {
            urn,
            payload,
            environment,
        } => (urn.clone(), payload.clone(), Some(environment.clone())),
    };
    Ok(WindowFnDescriptor {
        urn,
        payload,
        environment,
    })
}

fn encode_payload<P: Serialize>(payload: &P) -> Result<Vec<u8>> {
    bincode::serialize(payload)
        .map_err(|err| WindowError::Configuration(format!("payload encode failed: {err}")))
}

fn decode_payload<P: for<'de> Deserialize<'de>>(urn: &str, payload: &[u8]) -> Result<P> {
    bincode::deserialize(payload).map_err(|err| {
        WindowError::Configuration(format!("malformed payload for well-known urn {urn}: {err}"))
    })
}

// ── Registry ──────────────────────────────────────────────────────────────────

type Constructor = fn(&[u8]) -> Result<WindowFn>;

/// Maps well-known URNs to native constructors.
///
/// Reconstructing from a descriptor goes through three paths:
/// - well-known URN: parse the payload and build the native policy
///   (a malformed payload is a `Configuration` error);
/// - unknown URN with an environment reference: pass through as
///   [`WindowFn::Custom`], to be delegated rather than applied locally;
/// - unknown URN without an environment: `Configuration` error, the
///   descriptor is unusable everywhere.
pub struct WindowFnRegistry {
    constructors: HashMap<String, Constructor>,
}

impl WindowFnRegistry {
    /// A registry with the four well-known URNs registered.
    pub fn new() -> Self {
        let mut registry = Self {
            constructors: HashMap::new(),
        };
        registry.register(GLOBAL_WINDOWS_URN, |payload| {
            if !payload.is_empty() {
                return Err(WindowError::Configuration(format!(
                    "global windowing takes no parameters, got {} payload bytes",
                    payload.len()
                )));
            }
            Ok(WindowFn::Global)
        });
        registry.register(FIXED_WINDOWS_URN, |payload| {
            let p: FixedPayload = decode_payload(FIXED_WINDOWS_URN, payload)?;
            WindowFn::fixed_with_offset(duration_ms(p.size_ms)?, duration_ms(p.offset_ms)?)
        });
        registry.register(SLIDING_WINDOWS_URN, |payload| {
            let p: SlidingPayload = decode_payload(SLIDING_WINDOWS_URN, payload)?;
            WindowFn::sliding_with_offset(
                duration_ms(p.size_ms)?,
                duration_ms(p.period_ms)?,
                duration_ms(p.offset_ms)?,
            )
        });
        registry.register(SESSION_WINDOWS_URN, |payload| {
            let p: SessionsPayload = decode_payload(SESSION_WINDOWS_URN, payload)?;
            WindowFn::sessions(duration_ms(p.gap_ms)?)
        });
        registry
    }

    /// Register a constructor for a URN, replacing any existing one.
    pub fn register(&mut self, urn: impl Into<String>, constructor: Constructor) {
        self.constructors.insert(urn.into(), constructor);
    }

    pub fn is_known(&self, urn: &str) -> bool {
        self.constructors.contains_key(urn)
    }

    /// Reconstruct a policy from its portable descriptor.
    pub fn from_descriptor(&self, descriptor: &WindowFnDescriptor) -> Result<WindowFn> {
        if let Some(constructor) = self.constructors.get(descriptor.urn.as_str()) {
            return constructor(&descriptor.payload);
        }
        match &descriptor.environment {
            Some(environment) => {
                tracing::debug!(
                    urn = %descriptor.urn,
                    environment = %environment,
                    "unknown window fn urn, carrying as opaque"
                );
                Ok(WindowFn::custom(
                    descriptor.urn.clone(),
                    descriptor.payload.clone(),
                    environment.clone(),
                ))
            }
            None => Err(WindowError::Configuration(format!(
                "unknown window fn urn {} with no environment reference",
                descriptor.urn
            ))),
        }
    }
}

impl Default for WindowFnRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn duration_ms(ms: i64) -> Result<Duration> {
    u64::try_from(ms)
        .map(Duration::from_millis)
        .map_err(|_| WindowError::Configuration(format!("negative duration: {ms}ms")))
}

#[cfg(test)]
#[path = "tests/translation_tests.rs"]
mod tests;
