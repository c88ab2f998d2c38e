use chrono::Local;
use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

/// Default filter when `RUST_LOG` is unset.
fn default_filter(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Installs the global logger. `RUST_LOG` takes precedence over `debug`.
/// Chatty transport crates are held at `warn` unless `RUST_LOG` says otherwise.
pub fn init(debug: bool) -> Result<(), log::SetLoggerError> {
    let env = Env::default().default_filter_or(default_filter(debug));
    let mut builder = Builder::new();
    builder
        .filter_module("hyper", LevelFilter::Warn)
        .filter_module("reqwest", LevelFilter::Warn)
        .filter_module("teloxide", LevelFilter::Info)
        .parse_env(env)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        });
    builder.try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(false), "info");
        assert_eq!(default_filter(true), "debug");
    }
}
