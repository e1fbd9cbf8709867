//! Logger initialisation
//!
//! `RUST_LOG` wins when set; otherwise the level comes from the CLI or the config file.

use std::io::Write;

use env_logger::{Builder, Env};
use log::Record;

/// Output layout of log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Install the global logger; later calls are no-ops
pub fn init(level: &str, format: LogFormat) {
    let mut builder = Builder::from_env(Env::default().default_filter_or(level));

    if format == LogFormat::Json {
        builder.format(|buf, record| writeln!(buf, "{}", json_line(record)));
    } else {
        builder.format_timestamp_secs();
    }

    if builder.try_init().is_err() {
        log::debug!("Logger already initialised");
    }
}

fn json_line(record: &Record) -> String {
    serde_json::json!({
        "ts": chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string(),
        "level": record.level().to_string(),
        "target": record.target(),
        "msg": record.args().to_string(),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_line_fields() {
        let line = json_line(
            &Record::builder()
                .args(format_args!("Parsed {} operations", 3))
                .level(log::Level::Warn)
                .target("fmc_agent::operations")
                .build(),
        );

        let value: serde_json::Value = serde_json::from_str(&line).unwrap();

        assert_eq!(value["level"], "WARN");
        assert_eq!(value["target"], "fmc_agent::operations");
        assert_eq!(value["msg"], "Parsed 3 operations");
        assert!(value["ts"].as_str().is_some());
    }
}
