//! Crate-internal logging macros.
//!
//! Device builds log through `defmt`. Host builds have no defmt logger to link against, so the
//! macros only evaluate their arguments there.

macro_rules! pwm_info {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[cfg(not(feature = "host"))]
        ::defmt::info!($fmt $(, $arg)*);
        #[cfg(feature = "host")]
        {
            let _ = ($(&$arg,)*);
        }
    }};
}

macro_rules! pwm_warn {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[cfg(not(feature = "host"))]
        ::defmt::warn!($fmt $(, $arg)*);
        #[cfg(feature = "host")]
        {
            let _ = ($(&$arg,)*);
        }
    }};
}

macro_rules! pwm_debug {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[cfg(not(feature = "host"))]
        ::defmt::debug!($fmt $(, $arg)*);
        #[cfg(feature = "host")]
        {
            let _ = ($(&$arg,)*);
        }
    }};
}
