//! Logging macros.
//!
//! Each macro forwards to the matching `tracing` macro when the `tracing`
//! feature is on and expands to an empty block otherwise. Use them in
//! statement position.

macro_rules! trace_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        ::tracing::warn!($($arg)*);
    }};
}

macro_rules! trace_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        ::tracing::info!($($arg)*);
    }};
}

macro_rules! trace_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        ::tracing::debug!($($arg)*);
    }};
}
