//! Tests for the logging helpers.

use opentherm_rs::logging::{init_logger, log_debug, log_error, log_info, log_warn};

#[test]
fn init_logger_is_idempotent() {
    init_logger();
    init_logger();
}

#[test]
fn log_helpers_do_not_panic() {
    init_logger();
    log_error("error message");
    log_warn("warn message");
    log_info("info message");
    log_debug("debug message");
}
