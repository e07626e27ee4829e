#![deny(missing_docs)]
//! Shared logging utilities for the translator workspace.
//!
//! This crate provides the `translator_*` logging macros used across the
//! codebase and a minimal test initializer for the global logger. Every
//! message is tagged with the number of the front-end invocation that
//! produced it, so a log of a long job reads as a sequence of steps.

use std::cell::Cell;

#[doc(hidden)]
pub use log;

thread_local! {
    /// Thread-local storage for the current invocation number.
    static INVOCATION: Cell<u64> = const { Cell::new(0) };
}

/// Sets the invocation number for the current thread.
/// The step driver calls this once per `advance_step`.
pub fn set_invocation(invocation: u64) {
    INVOCATION.with(|v| v.set(invocation));
}

/// Retrieves the invocation number for the current thread.
/// Returns 0 if no invocation has been recorded yet.
pub fn current_invocation() -> u64 {
    INVOCATION.with(|v| v.get())
}

/// Logs a trace-level message tagged with the current invocation.
#[macro_export]
macro_rules! translator_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!("[inv {}] {}", $crate::current_invocation(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message tagged with the current invocation.
#[macro_export]
macro_rules! translator_info {
    ($($arg:tt)*) => {{
        $crate::log::info!("[inv {}] {}", $crate::current_invocation(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message tagged with the current invocation.
#[macro_export]
macro_rules! translator_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!("[inv {}] {}", $crate::current_invocation(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message tagged with the current invocation.
#[macro_export]
macro_rules! translator_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!("[inv {}] {}", $crate::current_invocation(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message tagged with the current invocation.
#[macro_export]
macro_rules! translator_error {
    ($($arg:tt)*) => {{
        $crate::log::error!("[inv {}] {}", $crate::current_invocation(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
