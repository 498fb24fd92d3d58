//! Subscriber setup for the binary.

use tracing_subscriber::{EnvFilter, fmt};

/// Install a stderr subscriber at `level`, unless `RUST_LOG` is set.
///
/// Unknown levels fall back to `info`.
pub(crate) fn init(level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive(level.unwrap_or("info"))));

    // A second call (tests, repeated commands) keeps the first subscriber.
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn directive(level: &str) -> &'static str {
    match level.to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" | "fatal" | "panic" => "error",
        "disabled" | "off" => "off",
        _ => "info",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_levels() {
        assert_eq!(directive("debug"), "debug");
        assert_eq!(directive("WARN"), "warn");
        assert_eq!(directive("fatal"), "error");
        assert_eq!(directive("verbose"), "info");
    }
}
