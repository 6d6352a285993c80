use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

/// Installs the global logger. `RUST_LOG` overrides `log_level`.
///
/// Output goes to stderr so command output on stdout stays machine-readable.
pub fn init(log_level: &str) {
    let env = Env::default().filter_or("RUST_LOG", parse_log_level(log_level).to_string());

    let _ = Builder::from_env(env)
        .format(|buf, record| {
            let target = if !record.target().is_empty() {
                record.target()
            } else {
                record.module_path().unwrap_or("unknown")
            };
            writeln!(
                buf,
                "[{}] {:<5} [{}] {}",
                buf.timestamp_millis(),
                record.level(),
                target,
                record.args()
            )
        })
        .try_init();
}

/// Maps a level name to a `LevelFilter`, defaulting to Info.
pub fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("error"), LevelFilter::Error);
        assert_eq!(parse_log_level("WARN"), LevelFilter::Warn);
        assert_eq!(parse_log_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_log_level("off"), LevelFilter::Off);
        assert_eq!(parse_log_level("invalid"), LevelFilter::Info);
    }
}
