use std::{io::Write as _, path::PathBuf};

use super::*;

fn shipped_config() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("config")
        .join("gestures.toml")
}

#[test]
fn shipped_config_matches_defaults() {
    let config = GestureConfig::load(&shipped_config()).expect("shipped config should load");
    assert_eq!(config, GestureConfig::default());
}

#[test]
fn missing_keys_fall_back_to_defaults() {
    let config = GestureConfig::from_toml_str("tap_tolerance_px = 10.0\n").expect("valid config");
    assert_eq!(config.tap_tolerance_px, 10.0);
    assert_eq!(config.tap_time_ms, DEFAULT_TAP_TIME_MS);
    assert_eq!(config.swipe_min_travel_px, DEFAULT_SWIPE_MIN_TRAVEL_PX);
    assert_eq!(config.tap_tolerance_sq(), 100.0);
}

#[test]
fn load_reads_from_disk() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(file, "swipe_time_ms = 320\nswipe_min_travel_px = 130.0").expect("write config");

    let config = GestureConfig::load(file.path()).expect("config should load");
    assert_eq!(config.swipe_time_ms, 320);
    assert_eq!(config.swipe_min_travel_sq(), 130.0 * 130.0);
}

#[test]
fn validation_rejects_invalid_values() {
    let cases = [
        ("tap_tolerance_px = 0.0", "tap_tolerance_px"),
        ("tap_tolerance_px = -4.0", "tap_tolerance_px"),
        ("tap_time_ms = 0", "tap_time_ms"),
        ("double_tap_time_ms = 0", "double_tap_time_ms"),
        ("swipe_time_ms = 0", "swipe_time_ms"),
        ("swipe_min_travel_px = 0.0", "swipe_min_travel_px"),
    ];

    for (source, key) in cases {
        let err = GestureConfig::from_toml_str(source).expect_err("config should be rejected");
        match err {
            ConfigError::Validation(msg) => {
                assert!(msg.contains(key), "expected message naming `{key}`, got `{msg}`");
            }
            other => panic!("expected validation error, got {other}"),
        }
    }
}

#[test]
fn parse_errors_are_reported_for_unknown_keys() {
    let err = GestureConfig::from_toml_str("tap_radius_px = 12.0").expect_err("unknown key");
    match err {
        ConfigError::Parse(msg) => {
            assert!(msg.contains("tap_radius_px"), "got `{msg}`");
        }
        other => panic!("expected parse error, got {other}"),
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let err = GestureConfig::load(&PathBuf::from("/nonexistent/gestures.toml"))
        .expect_err("missing file");
    assert!(matches!(err, ConfigError::Io(_)));
}
