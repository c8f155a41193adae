/// Domain-tagged logging for the command handlers, mirroring the engine's
/// macros. Domains used here: `sys` (run command), `check` (validate).
///
/// ```ignore
/// rg_info!(sys, rules = 3, "rule set loaded");
/// ```

#[doc(hidden)]
macro_rules! rg_log {
    ($level:ident, $domain:ident, $($field:tt)*) => {
        tracing::$level!(domain = stringify!($domain), $($field)*)
    };
}

macro_rules! rg_error {
    ($domain:ident, $($rest:tt)*) => {
        rg_log!(error, $domain, $($rest)*)
    };
}

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
