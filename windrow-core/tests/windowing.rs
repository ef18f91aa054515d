use std::collections::HashMap;
use std::time::Duration;

use windrow_core::coder::WindowedValueCoder;
use windrow_core::translation::{to_descriptor, WindowFnRegistry};
use windrow_core::types::{WindowedValue, TIMESTAMP_MAX};
use windrow_core::window::{AssignmentRunner, KeyedMergeTracker, Window, WindowFn};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
struct Click {
    user: String,
    value: i32,
}

fn click(user: &str, value: i32) -> Click {
    Click {
        user: user.to_string(),
        value,
    }
}

/// Ship a sliding strategy through its portable descriptor, apply it to a
/// stream of elements, and check the fan-out on the receiving side.
#[test]
fn sliding_strategy_round_trips_across_the_translation_boundary() {
    let authored = WindowFn::sliding(Duration::from_secs(240), Duration::from_secs(120)).unwrap();
    let wire = to_descriptor(&authored).unwrap().to_bytes().unwrap();

    // "Foreign runtime" side: reconstruct natively from bytes alone.
    let descriptor = windrow_core::translation::WindowFnDescriptor::from_bytes(&wire).unwrap();
    let rebuilt = WindowFnRegistry::new().from_descriptor(&descriptor).unwrap();
    assert!(rebuilt.is_compatible(&authored));

    let runner = AssignmentRunner::new(rebuilt);
    let outputs = runner
        .assign(WindowedValue::timestamped_in_global_window(
            click("u1", 3),
            12,
        ))
        .unwrap();

    let mut windows: Vec<Window> = outputs
        .iter()
        .map(|out| *out.single_window().unwrap())
        .collect();
    windows.sort();
    assert_eq!(
        windows,
        vec![
            Window::interval(-120_000, 120_000),
            Window::interval(0, 240_000),
        ]
    );
}

/// End-to-end session grouping: assignment fan-out, keyed merging with state
/// relocation, and retirement after a simulated firing.
#[test]
fn session_windows_merge_per_key_with_state_relocation() {
    let sessions = WindowFn::sessions(Duration::from_secs(10)).unwrap();
    let runner = AssignmentRunner::new(sessions.clone());
    let mut tracker = KeyedMergeTracker::new(sessions).unwrap();

    // Buffered grouping state per (key, window), migrated on merge.
    let mut buffers: HashMap<(Vec<u8>, Window), Vec<i32>> = HashMap::new();

    // u1 produces two bursts separated by more than the gap; u2 interleaves
    // and must not affect u1's sessions.
    let events = [
        ("u1", 1_000, 1),
        ("u2", 2_000, 10),
        ("u1", 6_000, 2),
        ("u1", 40_000, 3),
        ("u2", 9_000, 20),
        ("u1", 44_000, 4),
    ];

    for (user, timestamp, value) in events {
        let input = WindowedValue::timestamped_in_global_window(click(user, value), timestamp);
        let key = bincode::serialize(&user).unwrap();
        for assigned in runner.assign(input).unwrap() {
            let window = *assigned.single_window().unwrap();
            let holder = tracker
                .add_window(&key, window, |record| {
                    let mut moved = Vec::new();
                    for absorbed in &record.absorbed {
                        if let Some(mut values) = buffers.remove(&(key.clone(), *absorbed)) {
                            moved.append(&mut values);
                        }
                    }
                    buffers
                        .entry((key.clone(), record.survivor))
                        .or_default()
                        .extend(moved);
                    Ok(())
                })
                .unwrap();
            buffers
                .entry((key.clone(), holder))
                .or_default()
                .push(assigned.value.value);
        }
    }

    let u1 = bincode::serialize(&"u1").unwrap();
    let u2 = bincode::serialize(&"u2").unwrap();

    let u1_sessions: Vec<Window> = tracker
        .window_set(&u1)
        .unwrap()
        .active()
        .iter()
        .copied()
        .collect();
    assert_eq!(
        u1_sessions,
        vec![
            Window::interval(1_000, 16_000),
            Window::interval(40_000, 54_000),
        ]
    );
    let u2_sessions: Vec<Window> = tracker
        .window_set(&u2)
        .unwrap()
        .active()
        .iter()
        .copied()
        .collect();
    assert_eq!(u2_sessions, vec![Window::interval(2_000, 19_000)]);

    let mut first = buffers
        .remove(&(u1.clone(), Window::interval(1_000, 16_000)))
        .unwrap();
    first.sort();
    assert_eq!(first, vec![1, 2]);
    assert_eq!(
        buffers[&(u1.clone(), Window::interval(40_000, 54_000))],
        vec![3, 4]
    );
    assert_eq!(buffers[&(u2, Window::interval(2_000, 19_000))], vec![10, 20]);

    // Watermark passed the first session and the trigger fired it: retire.
    assert!(tracker.retire(&u1, &Window::interval(1_000, 16_000)));
    assert_eq!(tracker.window_set(&u1).unwrap().len(), 1);
}

/// Re-running assignment over the same input yields bit-identical encoded
/// outputs, the portability guarantee retries rely on.
#[test]
fn assignment_is_reproducible_down_to_the_bytes() {
    let window_fn = WindowFn::fixed(Duration::from_secs(600)).unwrap();
    let runner = AssignmentRunner::new(window_fn.clone());
    let coder = WindowedValueCoder::for_window_fn(&window_fn).unwrap();

    let input = WindowedValue::timestamped_in_global_window(click("u9", 42), -7);

    let encode_all = |outputs: Vec<WindowedValue<Click>>| -> Vec<Vec<u8>> {
        outputs.iter().map(|out| coder.encode(out).unwrap()).collect()
    };

    let first = encode_all(runner.assign(input.clone()).unwrap());
    let second = encode_all(runner.assign(input).unwrap());
    assert_eq!(first, second);

    // And the bytes decode back to the assigned values.
    let decoded: WindowedValue<Click> = coder.decode(&first[0]).unwrap();
    assert_eq!(*decoded.single_window().unwrap(), Window::interval(-600_000, 0));
    assert_eq!(decoded.timestamp, -7);
}

/// An element at the latest representable timestamp still lands in a window
/// that contains it, and that window survives an encode/decode round trip.
#[test]
fn latest_timestamp_assignment_survives_the_coder() {
    let sessions = WindowFn::sessions(Duration::from_secs(10)).unwrap();
    let runner = AssignmentRunner::new(sessions.clone());
    let coder = WindowedValueCoder::for_window_fn(&sessions).unwrap();

    let outputs = runner
        .assign(WindowedValue::timestamped_in_global_window(
            click("u1", 1),
            TIMESTAMP_MAX,
        ))
        .unwrap();
    assert_eq!(outputs.len(), 1);
    let window = *outputs[0].single_window().unwrap();
    assert!(window.contains(TIMESTAMP_MAX));

    let bytes = coder.encode(&outputs[0]).unwrap();
    let decoded: WindowedValue<Click> = coder.decode(&bytes).unwrap();
    assert_eq!(decoded, outputs[0]);
}
