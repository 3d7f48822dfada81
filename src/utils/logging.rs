//! Conditional logging macros gated by a module-level `ENABLE_LOGS` flag.
//!
//! Chatty loops (the reaper, per-frame paths) define the flag and use these
//! macros so their logging can be silenced per module without touching the
//! global filter:
//!
//! ```text
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_info, log_warn};
//! ```

/// Conditional info logging; checks `ENABLE_LOGS` in the calling module.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// Conditional warn logging; checks `ENABLE_LOGS` in the calling module.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// Conditional error logging; checks `ENABLE_LOGS` in the calling module.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}
