//! Verbosity-gated `tracing` events.
//!
//! Installing a subscriber is the caller's job. Call sites pass structured
//! fields followed by a constant message:
//!
//! ```ignore
//! log_changes!(verbosity, work_item = %id, start, end, "dates floored to today");
//! ```
//!
//! Verbosity levels:
//! - 0: SILENT
//! - 1: CHANGES (date floors, reschedule passes, run summaries), `info`
//! - 2: CHECKS (rejected schedules, gate decisions), `debug`
//! - 3: DEBUG (per-node pass internals), `trace`

pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_CHANGES: u8 = 1;
pub const VERBOSITY_CHECKS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

#[doc(hidden)]
#[macro_export]
macro_rules! __log_at {
    ($min:path, $event:ident, $verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $min {
            ::tracing::$event!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_changes {
    ($verbosity:expr, $($arg:tt)*) => {
        $crate::__log_at!($crate::logging::VERBOSITY_CHANGES, info, $verbosity, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_checks {
    ($verbosity:expr, $($arg:tt)*) => {
        $crate::__log_at!($crate::logging::VERBOSITY_CHECKS, debug, $verbosity, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        $crate::__log_at!($crate::logging::VERBOSITY_DEBUG, trace, $verbosity, $($arg)*)
    };
}
