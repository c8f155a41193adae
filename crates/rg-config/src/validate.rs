use crate::engine::EngineConfig;

const MAX_CONCURRENCY: usize = 4096;
const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Internal validation, called from `EngineConfig::from_str` / `load`.
pub(crate) fn validate(config: &EngineConfig) -> anyhow::Result<()> {
    if config.runtime.max_concurrency > MAX_CONCURRENCY {
        anyhow::bail!(
            "runtime.max_concurrency must be <= {MAX_CONCURRENCY}, got {}",
            config.runtime.max_concurrency,
        );
    }

    if !is_known_level(&config.logging.level) {
        anyhow::bail!(
            "logging.level: unknown level {:?} (expected one of {})",
            config.logging.level,
            LEVELS.join(", "),
        );
    }
    for (module, level) in &config.logging.modules {
        if !is_known_level(level) {
            anyhow::bail!("logging.modules.{module}: unknown level {level:?}");
        }
    }

    Ok(())
}

fn is_known_level(level: &str) -> bool {
    LEVELS.iter().any(|l| l.eq_ignore_ascii_case(level.trim()))
}
