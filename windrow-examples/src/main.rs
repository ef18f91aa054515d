use std::collections::HashMap;
use std::time::Duration;

use windrow_core::types::WindowedValue;
use windrow_core::window::{AssignmentRunner, KeyedMergeTracker, Window, WindowFn};

/// Session windowing demo: elements arrive out of order per user, proto
/// sessions are merged as they touch, and the final per-user sessions are
/// printed with their aggregated sums.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let sessions = WindowFn::sessions(Duration::from_secs(30))?;
    let runner = AssignmentRunner::new(sessions.clone());
    let mut tracker = KeyedMergeTracker::new(sessions)?;

    // (user, ts_ms, value)
    let events: Vec<(&str, i64, i32)> = vec![
        ("u1", 1_000, 1),
        ("u2", 5_000, 7),
        ("u1", 20_000, 2),
        // Out of order, still inside u1's first session.
        ("u1", 12_000, 3),
        // More than 30s after u1's last event: a second session.
        ("u1", 80_000, 4),
        ("u2", 90_000, 8),
    ];

    let mut sums: HashMap<(Vec<u8>, Window), i32> = HashMap::new();

    for (user, timestamp, value) in events {
        let key = bincode_key(user)?;
        let input = WindowedValue::timestamped_in_global_window(value, timestamp);
        for assigned in runner.assign(input)? {
            let window = *assigned.single_window()?;
            let holder = tracker.add_window(&key, window, |record| {
                println!(
                    "  merge for {user}: {} windows -> {}",
                    record.absorbed.len(),
                    record.survivor
                );
                let mut moved = 0;
                for absorbed in &record.absorbed {
                    moved += sums.remove(&(key.clone(), *absorbed)).unwrap_or(0);
                }
                *sums.entry((key.clone(), record.survivor)).or_default() += moved;
                Ok(())
            })?;
            *sums.entry((key.clone(), holder)).or_default() += assigned.value;
        }
    }

    let mut lines: Vec<String> = sums
        .iter()
        .map(|((key, window), sum)| format!("user={} window={window} sum={sum}", from_key(key)))
        .collect();
    lines.sort();
    println!("final sessions:");
    for line in lines {
        println!("  {line}");
    }

    Ok(())
}

fn bincode_key(user: &str) -> anyhow::Result<Vec<u8>> {
    Ok(bincode::serialize(user)?)
}

fn from_key(key: &[u8]) -> String {
    bincode::deserialize::<String>(key).unwrap_or_else(|_| "<bad key>".to_string())
}
