/// Domain-aware logging macros.
///
/// Each macro injects a `domain` field so callers never spell the string
/// literal. Domains used by the engine: `sys`, `exec`, `conf`, `check`.
///
/// ```ignore
/// rg_debug!(exec, rules = 4, errors = 0, "run finished");
/// rg_warn!(exec, error = %e, "graph error, run aborted");
/// ```
///
/// The domain is a bare identifier, converted to a `&str` by the macro.

#[doc(hidden)]
macro_rules! rg_log {
    ($level:ident, $domain:ident, $($field:tt)*) => {
        tracing::$level!(domain = stringify!($domain), $($field)*)
    };
}

#[allow(unused_macros)]
macro_rules! rg_error {
    ($domain:ident, $($rest:tt)*) => {
        rg_log!(error, $domain, $($rest)*)
    };
}

macro_rules! rg_warn {
    ($domain:ident, $($rest:tt)*) => {
        rg_log!(warn, $domain, $($rest)*)
    };
}

#[allow(unused_macros)]
macro_rules! rg_info {
    ($domain:ident, $($rest:tt)*) => {
        rg_log!(info, $domain, $($rest)*)
    };
}

macro_rules! rg_debug {
    ($domain:ident, $($rest:tt)*) => {
        rg_log!(debug, $domain, $($rest)*)
    };
}

macro_rules! rg_trace {
    ($domain:ident, $($rest:tt)*) => {
        rg_log!(trace, $domain, $($rest)*)
    };
}
