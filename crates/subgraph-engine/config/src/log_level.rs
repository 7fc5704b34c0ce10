use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};

const VALUES: &[(&str, LogLevel)] = &[
    ("off", LogLevel::Off),
    ("trace", LogLevel::Trace),
    ("debug", LogLevel::Debug),
    ("info", LogLevel::Info),
    ("warn", LogLevel::Warn),
    ("error", LogLevel::Error),
];

/// Crates whose events are governed by the configured level.
const ENGINE_TARGETS: &[&str] = &["subgraph_engine", "relation_mocks"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Off,
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// An `EnvFilter` compatible directive applying this level to the engine crates only,
    /// e.g. `subgraph_engine=debug,relation_mocks=debug`.
    pub fn filter_directive(&self) -> String {
        ENGINE_TARGETS
            .iter()
            .map(|target| format!("{target}={}", self.as_str()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Serialize for LogLevel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VALUES
            .iter()
            .find(|(string, _)| string.eq_ignore_ascii_case(s))
            .map(|(_, log_level)| *log_level)
            .ok_or_else(|| {
                let expected = VALUES.iter().map(|(string, _)| *string).collect::<Vec<_>>();
                format!(
                    r#""{s}" is not a valid log level (expected one of {})."#,
                    expected.join(", ")
                )
            })
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(serde::de::Error::custom)
    }
}
