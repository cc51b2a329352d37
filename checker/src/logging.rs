//! Logging setup for the hierarchy checker
//!
//! The checker logs through the `log` facade; these helpers install
//! `env_logger` as the backend. Only the first call to any `init*` function
//! takes effect.
//!
//! Levels are used as follows:
//!
//! - `info!` - one line per checked input (format, class count, result)
//! - `debug!` - one line per validated class
//! - `trace!` - one line per method declaration
//!
//! The level is always passed in; nothing is read from the environment.

use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize logging at `Warn`
pub fn init() {
    init_with_level(LevelFilter::Warn);
}

pub fn init_with_level(level: LevelFilter) {
    INIT.call_once(|| {
        Builder::new()
            .filter_level(level)
            .format(|buf, record| {
                writeln!(
                    buf,
                    "[{:5}] {} - {}",
                    record.level(),
                    record.module_path().unwrap_or("checker"),
                    record.args()
                )
            })
            .init();
    });
}

/// Initialize logging for tests; safe to call from every test
pub fn init_test() {
    let _ = env_logger::builder()
        .filter_level(LevelFilter::Warn)
        .is_test(true)
        .try_init();
}

pub fn is_initialized() -> bool {
    INIT.is_completed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_is_idempotent() {
        init_test();
        init_test();
        log::debug!("checker test logging");
    }
}
