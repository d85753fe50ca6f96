use crate::{LogLevel, LoggingConfig};

use log::LevelFilter;

#[test]
fn given_known_names_when_parsed_then_filters_match() {
    let cases = [
        ("off", LevelFilter::Off),
        ("error", LevelFilter::Error),
        ("warn", LevelFilter::Warn),
        ("info", LevelFilter::Info),
        ("debug", LevelFilter::Debug),
        ("trace", LevelFilter::Trace),
    ];
    for (name, filter) in cases {
        let level: LogLevel = name.parse().unwrap();
        assert_eq!(level, LogLevel(filter), "{name}");
    }
}

#[test]
fn given_mixed_case_and_padding_when_parsed_then_still_recognized() {
    let level: LogLevel = " TRACE ".parse().unwrap();
    assert_eq!(level, LogLevel(LevelFilter::Trace));
}

#[test]
fn given_unknown_name_when_parsed_then_falls_back_to_info() {
    let level: LogLevel = "loud".parse().unwrap();
    assert_eq!(level, LogLevel(LevelFilter::Info));
}

#[test]
fn given_logging_section_when_deserialized_then_level_applies() {
    let logging: LoggingConfig = toml::from_str("level = \"debug\"").unwrap();
    assert_eq!(logging.level, LogLevel(LevelFilter::Debug));
}

#[test]
fn given_empty_logging_section_when_deserialized_then_defaults_to_info() {
    let logging: LoggingConfig = toml::from_str("").unwrap();
    assert_eq!(logging.level, LogLevel::default());
    assert_eq!(logging.level, LogLevel(LevelFilter::Info));
}
