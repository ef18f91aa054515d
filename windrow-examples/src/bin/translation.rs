use std::time::Duration;

use windrow_core::translation::{to_descriptor, WindowFnDescriptor, WindowFnRegistry};
use windrow_core::types::WindowedValue;
use windrow_core::window::{AssignmentRunner, WindowFn};

/// Descriptor demo: author a sliding strategy, ship it as bytes, rebuild it
/// on the "receiving runtime", and fan an element out into its windows.
fn main() -> anyhow::Result<()> {
    let authored = WindowFn::sliding(Duration::from_secs(240), Duration::from_secs(120))?;
    let wire = to_descriptor(&authored)?.to_bytes()?;
    println!("descriptor: {} bytes on the wire", wire.len());

    let descriptor = WindowFnDescriptor::from_bytes(&wire)?;
    let rebuilt = WindowFnRegistry::new().from_descriptor(&descriptor)?;
    println!("rebuilt {} -> compatible: {}", descriptor.urn, rebuilt.is_compatible(&authored));

    let runner = AssignmentRunner::new(rebuilt);
    for timestamp in [-12i64, 12] {
        let outputs = runner.assign(WindowedValue::timestamped_in_global_window(
            "click".to_string(),
            timestamp,
        ))?;
        for out in outputs {
            println!("ts={timestamp} -> {}", out.single_window()?);
        }
    }

    Ok(())
}
