#![deny(missing_docs)]
//! Shared logging utilities for the cvmatch workspace.
//!
//! This crate provides the `cvm_*` logging macros used across the codebase,
//! the per-thread screen label that prefixes every line, and a minimal test
//! initializer for the global logger.
//!
//! The per-thread label only follows synchronous code. An async task may
//! resume on another worker thread, so code that logs across `.await`
//! passes its label explicitly: `cvm_info!(screen = "matching"; "...")`.

use std::cell::RefCell;

#[doc(hidden)]
pub use log as __log;

thread_local! {
    /// Label of the screen currently driving this thread.
    static SCREEN: RefCell<Option<&'static str>> = const { RefCell::new(None) };
}

/// Sets the screen label for the current thread and returns the previous one.
/// Screens call this on entry and restore the previous label on exit.
pub fn set_screen(label: Option<&'static str>) -> Option<&'static str> {
    SCREEN.with(|s| s.replace(label))
}

/// Retrieves the screen label for the current thread.
/// Returns `"-"` if no screen has been entered.
pub fn current_screen() -> &'static str {
    SCREEN.with(|s| s.borrow().unwrap_or("-"))
}

/// Logs a trace-level message prefixed with the active screen.
#[macro_export]
macro_rules! cvm_trace {
    (screen = $screen:expr; $($arg:tt)+) => {{
        $crate::__log::trace!("[{}] {}", $screen, format_args!($($arg)+));
    }};
    ($($arg:tt)*) => {{
        $crate::__log::trace!("[{}] {}", $crate::current_screen(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message prefixed with the active screen.
#[macro_export]
macro_rules! cvm_debug {
    (screen = $screen:expr; $($arg:tt)+) => {{
        $crate::__log::debug!("[{}] {}", $screen, format_args!($($arg)+));
    }};
    ($($arg:tt)*) => {{
        $crate::__log::debug!("[{}] {}", $crate::current_screen(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message prefixed with the active screen.
#[macro_export]
macro_rules! cvm_info {
    (screen = $screen:expr; $($arg:tt)+) => {{
        $crate::__log::info!("[{}] {}", $screen, format_args!($($arg)+));
    }};
    ($($arg:tt)*) => {{
        $crate::__log::info!("[{}] {}", $crate::current_screen(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message prefixed with the active screen.
#[macro_export]
macro_rules! cvm_warn {
    (screen = $screen:expr; $($arg:tt)+) => {{
        $crate::__log::warn!("[{}] {}", $screen, format_args!($($arg)+));
    }};
    ($($arg:tt)*) => {{
        $crate::__log::warn!("[{}] {}", $crate::current_screen(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message prefixed with the active screen.
#[macro_export]
macro_rules! cvm_error {
    (screen = $screen:expr; $($arg:tt)+) => {{
        $crate::__log::error!("[{}] {}", $screen, format_args!($($arg)+));
    }};
    ($($arg:tt)*) => {{
        $crate::__log::error!("[{}] {}", $crate::current_screen(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Another test may already have installed the logger.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
