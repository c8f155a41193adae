//! Command handlers behind the `rulegraph` binary.

#[macro_use]
mod log_macros;

pub mod cmd_run;
pub mod cmd_validate;
pub mod tracing_init;
