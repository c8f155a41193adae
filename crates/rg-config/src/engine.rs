use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::logging::LoggingConfig;
use crate::runtime::RuntimeConfig;
use crate::validate;

/// Resolved, validated `rulegraph.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub runtime: RuntimeConfig,
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Read and parse a `rulegraph.toml` file. A relative `logging.file` is
    /// resolved against the file's parent directory.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
        let mut config: EngineConfig = content.parse()?;
        if let Some(file) = &config.logging.file
            && file.is_relative()
            && let Some(base) = path.parent()
        {
            config.logging.file = Some(base.join(file));
        }
        Ok(config)
    }
}

impl FromStr for EngineConfig {
    type Err = anyhow::Error;

    fn from_str(toml_str: &str) -> anyhow::Result<Self> {
        let config: EngineConfig = toml::from_str(toml_str)?;
        validate::validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::logging::LogFormat;
    use crate::runtime::RunMode;

    const FULL_TOML: &str = r#"
[runtime]
mode = "concurrent"
max_concurrency = 8

[logging]
level = "warn"
format = "json"
file = "logs/rulegraph.log"

[logging.modules]
rg_core = "debug"
"#;

    #[test]
    fn parse_full_toml() {
        let config: EngineConfig = FULL_TOML.parse().unwrap();
        assert_eq!(config.runtime.mode, RunMode::Concurrent);
        assert_eq!(config.runtime.max_concurrency, 8);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.modules["rg_core"], "debug");
    }

    #[test]
    fn every_section_is_optional() {
        let config: EngineConfig = "".parse().unwrap();
        assert_eq!(config.runtime.mode, RunMode::Sequential);
        assert_eq!(config.runtime.max_concurrency, 0);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Plain);
    }

    #[test]
    fn reject_excessive_concurrency() {
        let err = "[runtime]\nmax_concurrency = 100000\n"
            .parse::<EngineConfig>()
            .unwrap_err();
        assert!(err.to_string().contains("max_concurrency"), "{err}");
    }

    #[test]
    fn reject_unknown_level() {
        let err = "[logging]\nlevel = \"loud\"\n"
            .parse::<EngineConfig>()
            .unwrap_err();
        assert!(err.to_string().contains("loud"), "{err}");
        assert!(
            "[logging.modules]\nrg_core = \"chatty\"\n"
                .parse::<EngineConfig>()
                .is_err()
        );
    }

    #[test]
    fn reject_unknown_mode() {
        assert!("[runtime]\nmode = \"parallel\"\n".parse::<EngineConfig>().is_err());
    }

    #[test]
    fn load_resolves_relative_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rulegraph.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "[logging]\nfile = \"out.log\"").unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.logging.file, Some(dir.path().join("out.log")));
    }

    #[test]
    fn load_missing_file() {
        let err = EngineConfig::load("/nonexistent/rulegraph.toml").unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
