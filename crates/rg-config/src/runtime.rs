use serde::{Deserialize, Serialize};

/// `[runtime]` section. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Sequential or leveled-concurrent execution.
    pub mode: RunMode,
    /// Upper bound on concurrently evaluated rules per level
    /// (Semaphore size). `0` selects the available parallelism.
    pub max_concurrency: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::Sequential,
            max_concurrency: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Sequential,
    Concurrent,
}
