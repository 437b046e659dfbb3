use crate::config::{ChannelConfig, ControlPlaneConfig, ControllerConfig, MAX_ACK_DELAY_MS, SenderConfig};
use crate::telemetry::ScriptedSource;
use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};

#[test]
fn defaults_are_valid() {
    SenderConfig::default().validate().expect("sender defaults");
    ChannelConfig::default().validate().expect("channel defaults");
    ControllerConfig::default().validate().expect("controller defaults");
    let c = ChannelConfig::default();
    assert_eq!(c.port, 5051);
    assert_eq!(c.ack_loss, 0.2);
}

#[test]
fn partial_json_fills_in_defaults() {
    let cfg: ControlPlaneConfig = serde_json::from_str(
        r#"{ "channel": { "port": 6000, "ack_loss": 0.0 }, "controller": { "junctions": 2 } }"#,
    )
    .expect("parse");
    assert_eq!(cfg.channel.port, 6000);
    assert_eq!(cfg.channel.ack_delay_max_ms, 300);
    assert_eq!(cfg.controller.junctions, 2);
    assert_eq!(cfg.controller.default_green, 20);
    cfg.validate().expect("valid");
}

#[test]
fn out_of_range_values_are_rejected() {
    let bad_loss = ChannelConfig {
        ack_loss: 1.5,
        ..ChannelConfig::default()
    };
    assert!(bad_loss.validate().is_err());

    let no_window = SenderConfig {
        window_size: 0,
        ..SenderConfig::default()
    };
    assert!(no_window.validate().is_err());

    let inverted = ControllerConfig {
        minimum: 70,
        ..ControllerConfig::default()
    };
    assert!(inverted.validate().is_err());
}

#[test]
fn ack_delay_upper_bound_is_enforced() {
    let at_limit = ChannelConfig {
        ack_delay_min_ms: MAX_ACK_DELAY_MS,
        ack_delay_max_ms: MAX_ACK_DELAY_MS,
        ..ChannelConfig::default()
    };
    at_limit.validate().expect("limit itself is allowed");

    let just_over = ChannelConfig {
        ack_delay_max_ms: MAX_ACK_DELAY_MS + 1,
        ..ChannelConfig::default()
    };
    assert!(just_over.validate().is_err());

    // 换算成微秒后会截断到同一个值的区间
    let huge = ChannelConfig {
        ack_delay_min_ms: 18_446_744_073_709_551,
        ack_delay_max_ms: 18_446_744_073_709_552,
        ..ChannelConfig::default()
    };
    assert!(huge.validate().is_err());
}

#[test]
fn files_load_from_disk() {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("signalnet-rs-config-{}-{nanos}", std::process::id()));
    fs::create_dir_all(&dir).expect("create temp dir");

    let cfg_path = dir.join("control.json");
    fs::write(&cfg_path, r#"{ "controller": { "maximum": 90 } }"#).expect("write config");
    let cfg = ControlPlaneConfig::from_json_file(&cfg_path).expect("load config");
    assert_eq!(cfg.controller.maximum, 90);

    let counts_path = dir.join("counts.json");
    fs::write(
        &counts_path,
        r#"[ { "counts": { "right": 3 } }, { "running": false } ]"#,
    )
    .expect("write counts");
    let source = ScriptedSource::from_json_file(&counts_path).expect("load counts");
    assert_eq!(source.remaining(), 2);

    fs::write(&counts_path, "{ not json").expect("overwrite counts");
    assert!(ScriptedSource::from_json_file(&counts_path).is_err());

    let _ = fs::remove_dir_all(&dir);
}
