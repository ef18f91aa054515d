use super::*;

use crate::types::{TIMESTAMP_MAX, TIMESTAMP_MIN};

// ── varint ────────────────────────────────────────────────────────────────

#[test]
fn test_varint_round_trip() {
    for value in [0u64, 1, 127, 128, 300, 16_383, 16_384, u64::MAX] {
        let mut buf = Vec::new();
        write_varint(&mut buf, value);
        let mut pos = 0;
        assert_eq!(read_varint(&buf, &mut pos).unwrap(), value);
        assert_eq!(pos, buf.len());
    }
}

#[test]
fn test_varint_single_byte_below_128() {
    let mut buf = Vec::new();
    write_varint(&mut buf, 127);
    assert_eq!(buf, vec![0x7f]);
}

#[test]
fn test_varint_truncated_input_fails() {
    // Continuation bit set but no following byte.
    let mut pos = 0;
    assert!(matches!(
        read_varint(&[0x80], &mut pos),
        Err(WindowError::Codec(_))
    ));
}

// ── WindowCoder ───────────────────────────────────────────────────────────

#[test]
fn test_global_window_token_is_empty() {
    let mut buf = Vec::new();
    WindowCoder::Global.encode(&Window::Global, &mut buf).unwrap();
    assert!(buf.is_empty());

    let mut pos = 0;
    assert_eq!(
        WindowCoder::Global.decode(&buf, &mut pos).unwrap(),
        Window::Global
    );
    assert_eq!(pos, 0);
}

#[test]
fn test_interval_window_token_round_trip() {
    let window = Window::interval(-120_000, 60_000);
    let mut buf = Vec::new();
    WindowCoder::Interval.encode(&window, &mut buf).unwrap();
    assert_eq!(buf.len(), 16);

    let mut pos = 0;
    assert_eq!(WindowCoder::Interval.decode(&buf, &mut pos).unwrap(), window);
    assert_eq!(pos, 16);
}

#[test]
fn test_window_coder_shape_mismatch_fails() {
    let mut buf = Vec::new();
    assert!(matches!(
        WindowCoder::Interval.encode(&Window::Global, &mut buf),
        Err(WindowError::Codec(_))
    ));
    assert!(matches!(
        WindowCoder::Global.encode(&Window::interval(0, 1), &mut buf),
        Err(WindowError::Codec(_))
    ));
}

#[test]
fn test_interval_decode_rejects_inverted_bounds() {
    let mut buf = Vec::new();
    buf.extend_from_slice(&10i64.to_be_bytes());
    buf.extend_from_slice(&10i64.to_be_bytes());
    let mut pos = 0;
    assert!(matches!(
        WindowCoder::Interval.decode(&buf, &mut pos),
        Err(WindowError::Codec(_))
    ));
}

// ── WindowedValueCoder ────────────────────────────────────────────────────

#[test]
fn test_windowed_value_round_trip() {
    let coder = WindowedValueCoder::new(WindowCoder::Interval);
    let value = WindowedValue::with_windows(
        vec![1i32, 2, 3],
        -10,
        vec![Window::interval(-22, 300_000), Window::interval(-120_000, 60_000)],
        PaneInfo::NO_FIRING,
    )
    .unwrap();

    let bytes = coder.encode(&value).unwrap();
    let decoded: WindowedValue<Vec<i32>> = coder.decode(&bytes).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn test_windowed_value_round_trip_at_sentinels() {
    let coder = WindowedValueCoder::new(WindowCoder::Global);
    for timestamp in [TIMESTAMP_MIN, TIMESTAMP_MAX, 0] {
        let value = WindowedValue::timestamped_in_global_window("v".to_string(), timestamp);
        let bytes = coder.encode(&value).unwrap();
        let decoded: WindowedValue<String> = coder.decode(&bytes).unwrap();
        assert_eq!(decoded, value, "sentinel {timestamp} not preserved");
    }
}

#[test]
fn test_windowed_value_round_trip_early_pane() {
    let coder = WindowedValueCoder::new(WindowCoder::Interval);
    let pane = PaneInfo::new(Timing::Early, 2, -1, false, false);
    let value = WindowedValue::in_window(9i64, 1_000, Window::interval(0, 5_000), pane);

    let bytes = coder.encode(&value).unwrap();
    let decoded: WindowedValue<i64> = coder.decode(&bytes).unwrap();
    assert_eq!(decoded.pane, pane);
}

#[test]
fn test_windowed_value_encoding_is_deterministic() {
    let coder = WindowedValueCoder::new(WindowCoder::Interval);
    let value = WindowedValue::in_window(
        "abc".to_string(),
        77,
        Window::interval(0, 100),
        PaneInfo::NO_FIRING,
    );
    assert_eq!(coder.encode(&value).unwrap(), coder.encode(&value).unwrap());
}

#[test]
fn test_windowed_value_decode_rejects_trailing_bytes() {
    let coder = WindowedValueCoder::new(WindowCoder::Interval);
    let value =
        WindowedValue::in_window(1i32, 0, Window::interval(0, 100), PaneInfo::NO_FIRING);
    let mut bytes = coder.encode(&value).unwrap();
    bytes.push(0);
    assert!(matches!(
        coder.decode::<i32>(&bytes),
        Err(WindowError::Codec(_))
    ));
}

#[test]
fn test_windowed_value_decode_rejects_empty_window_set() {
    // Hand-built frame: value 1i32, timestamp 0, zero windows, default pane.
    let mut bytes = bincode::serialize(&1i32).unwrap();
    bytes.extend_from_slice(&0i64.to_be_bytes());
    write_varint(&mut bytes, 0);
    bytes.push(Timing::OnTime as u8);
    bytes.extend_from_slice(&0i64.to_be_bytes());
    bytes.push(1);

    let coder = WindowedValueCoder::new(WindowCoder::Interval);
    assert!(matches!(
        coder.decode::<i32>(&bytes),
        Err(WindowError::Codec(_))
    ));
}
