pub mod engine;
pub mod input_types;
pub mod loader;
pub mod logging;
pub mod runtime;
mod validate;

pub use engine::EngineConfig;
pub use input_types::{load_input_types, parse_input_types};
pub use loader::{LoadError, RuleFormat, load_rule_file, parse_json, parse_yaml};
pub use logging::{LogFormat, LoggingConfig};
pub use runtime::{RunMode, RuntimeConfig};
