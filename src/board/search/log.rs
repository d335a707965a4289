//! Search tracing.
//!
//! With the `logging` feature the macro forwards to `log::debug!`; without
//! it the arguments are still type-checked but compile to nothing.

macro_rules! search_log {
    ($($arg:tt)*) => {{
        #[cfg(feature = "logging")]
        {
            ::log::debug!($($arg)*);
        }
        #[cfg(not(feature = "logging"))]
        {
            let _ = format_args!($($arg)*);
        }
    }};
}

pub(crate) use search_log;
