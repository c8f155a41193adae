#[macro_use]
mod log_macros;

pub mod artifact;
pub mod bindings;
pub mod definition;
pub mod dynamic;
pub mod engine;
pub mod error;
pub mod rule;
pub mod scope;
pub mod validate;

pub use artifact::Artifact;
pub use bindings::{Bindings, TypedInput};
pub use definition::{ParameterDefinition, RuleDefinition, RuleSetDefinition};
pub use dynamic::build_engine;
pub use engine::Engine;
pub use error::{BindingError, DefinitionError, EngineError, RuleError};
pub use rule::{Dependency, Operator, RuleNode};
