//! Diagnostics on stderr, filtered by `RUST_LOG` (default: warn).

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Filter built from `RUST_LOG`. Unparseable directives are skipped and an
/// unset variable falls back to warn.
pub fn env_filter() -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy()
}

pub fn init() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_default_level_is_warn() {
        // SAFETY: We use #[serial] to ensure single-threaded access
        unsafe { std::env::remove_var("RUST_LOG") };
        assert_eq!(env_filter().max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    #[serial]
    fn test_rust_log_level_is_honored() {
        // SAFETY: We use #[serial] to ensure single-threaded access
        unsafe { std::env::set_var("RUST_LOG", "debug") };
        assert_eq!(env_filter().max_level_hint(), Some(LevelFilter::DEBUG));

        unsafe { std::env::set_var("RUST_LOG", "info") };
        assert_eq!(env_filter().max_level_hint(), Some(LevelFilter::INFO));
        unsafe { std::env::remove_var("RUST_LOG") };
    }
}
