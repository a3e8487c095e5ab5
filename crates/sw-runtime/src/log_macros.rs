/// Domain-aware logging macros.
///
/// Each macro injects a `domain` field automatically so callers never need to
/// remember the string literal. The domain value is one of: `sys`, `wave`,
/// `route`, `ocr`, `store`, `conf`, `fusion`.
///
/// # Usage
///
/// ```ignore
/// use crate::log_macros::*;
///
/// sw_info!(sys, waves = registry.len(), "orchestrator bootstrap complete");
/// sw_warn!(wave, error = %e, "wave execution error");
/// sw_debug!(route, route = ?decision.route, "routing decision cached");
/// ```
///
/// The macros accept any tracing-compatible field syntax after the domain
/// identifier. The domain identifier is **not** a string — it is a bare
/// identifier that the macro converts to a `&str` literal.

// ---------------------------------------------------------------------------
// Core macro — dispatches to the matching tracing level macro.
// ---------------------------------------------------------------------------

/// Internal helper. Do not call directly; use `sw_error!` … `sw_trace!`.
#[doc(hidden)]
macro_rules! sw_log {
    ($level:ident, $domain:ident, $($field:tt)*) => {
        tracing::$level!(domain = stringify!($domain), $($field)*)
    };
}

// ---------------------------------------------------------------------------
// Public per-level macros
// ---------------------------------------------------------------------------

/// Log at ERROR level with an automatic `domain` field.
///
/// ```ignore
/// sw_error!(ocr, error = %e, "ocr pipeline failed");
/// ```
macro_rules! sw_error {
    ($domain:ident, $($rest:tt)*) => {
        sw_log!(error, $domain, $($rest)*)
    };
}

/// Log at WARN level with an automatic `domain` field.
///
/// ```ignore
/// sw_warn!(wave, error = %e, wave = name, "wave skipped after timeout");
/// ```
macro_rules! sw_warn {
    ($domain:ident, $($rest:tt)*) => {
        sw_log!(warn, $domain, $($rest)*)
    };
}

/// Log at INFO level with an automatic `domain` field.
///
/// ```ignore
/// sw_info!(sys, image = %hash, "analysis complete");
/// ```
macro_rules! sw_info {
    ($domain:ident, $($rest:tt)*) => {
        sw_log!(info, $domain, $($rest)*)
    };
}

/// Log at DEBUG level with an automatic `domain` field.
///
/// ```ignore
/// sw_debug!(store, key = %hash, "cache hit");
/// ```
macro_rules! sw_debug {
    ($domain:ident, $($rest:tt)*) => {
        sw_log!(debug, $domain, $($rest)*)
    };
}

/// Log at TRACE level with an automatic `domain` field.
///
/// ```ignore
/// sw_trace!(fusion, candidates = n, "salience candidates ranked");
/// ```
#[allow(unused_macros)]
macro_rules! sw_trace {
    ($domain:ident, $($rest:tt)*) => {
        sw_log!(trace, $domain, $($rest)*)
    };
}
