//! Subscriber installation tests
//!
//! Kept in their own test binary: the global subscriber would otherwise
//! format output for every unit test in the crate.

#![cfg(feature = "subscriber")]

use svc_command::tracing_support::{init_subscriber_with_config, TracingConfig, TracingFormat};

#[test]
fn test_second_init_is_rejected() {
    let config = TracingConfig {
        filter: Some("svc_command=warn".to_string()),
        format: TracingFormat::Compact,
        timestamps: false,
        ..TracingConfig::default()
    };

    assert!(init_subscriber_with_config(config.clone()).is_ok());
    assert!(init_subscriber_with_config(config).is_err());
}
