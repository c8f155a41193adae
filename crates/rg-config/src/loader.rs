//! Rule-definition files: YAML or JSON, chosen by extension.

use std::path::{Path, PathBuf};

use rg_core::RuleSetDefinition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFormat {
    Yaml,
    Json,
}

impl RuleFormat {
    /// `.yaml` / `.yml` / `.json`, case-insensitive.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(RuleFormat::Yaml),
            "json" => Some(RuleFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Unsupported file format. Please use .yaml, .yml, or .json.")]
    UnsupportedFormat(PathBuf),
    #[error("Parse error: {0}")]
    Parse(String),
}

impl LoadError {
    /// Whether the file itself was unusable, as opposed to malformed.
    pub fn is_usage(&self) -> bool {
        !matches!(self, LoadError::Parse(_))
    }
}

pub fn load_rule_file(path: impl AsRef<Path>) -> Result<RuleSetDefinition, LoadError> {
    let path = path.as_ref();
    let format =
        RuleFormat::from_path(path).ok_or_else(|| LoadError::UnsupportedFormat(path.to_path_buf()))?;
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    match format {
        RuleFormat::Yaml => parse_yaml(&text),
        RuleFormat::Json => parse_json(&text),
    }
}

pub fn parse_yaml(text: &str) -> Result<RuleSetDefinition, LoadError> {
    // An empty document is an empty rule set.
    if text.trim().is_empty() {
        return Ok(RuleSetDefinition::default());
    }
    serde_yaml::from_str(text).map_err(|e| LoadError::Parse(e.to_string()))
}

pub fn parse_json(text: &str) -> Result<RuleSetDefinition, LoadError> {
    serde_json::from_str(text).map_err(|e| LoadError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const AGE_YAML: &str = r#"
Parameters:
  - Name: Age
    Expression: CurrentYear - Person.Birthdate.Year
Rules:
  - Id: IsAdult
    Condition: Age >= 18
    Then: '"Adult"'
    Operator: AND
    Rules:
      - Id: IsSenior
        Condition: Age >= 65
        Then: '"Senior"'
  - Id: NeedsGuardian
    Condition: "true"
    DependsOn:
      - IsAdult:false
    Parameters:
      - Name: Limit
        Expression: "21"
"#;

    #[test]
    fn yaml_rule_tree() {
        let def = parse_yaml(AGE_YAML).unwrap();
        assert_eq!(def.parameters[0].name, "Age");
        assert_eq!(def.rules.len(), 2);
        let adult = &def.rules[0];
        assert_eq!(adult.then.as_deref(), Some("\"Adult\""));
        assert_eq!(adult.operator.as_deref(), Some("AND"));
        assert_eq!(adult.rules[0].id, "IsSenior");
        assert_eq!(def.rules[1].depends_on, ["IsAdult:false"]);
        assert_eq!(def.rules[1].parameters[0].expression, "21");
    }

    #[test]
    fn json_accepts_lowercase_keys() {
        let json = r#"{
            "parameters": [{ "name": "Age", "expression": "40" }],
            "rules": [{ "id": "R", "condition": "Age > 1", "dependsOn": ["Q"] }]
        }"#;
        let def = parse_json(json).unwrap();
        assert_eq!(def.parameters[0].name, "Age");
        assert_eq!(def.rules[0].depends_on, ["Q"]);
        assert_eq!(def.rules[0].then, None);
    }

    #[test]
    fn malformed_documents_are_parse_errors() {
        let err = parse_yaml("Rules: [ { Id: ").unwrap_err();
        assert!(!err.is_usage());
        let err = parse_json("{ \"Rules\": [ { \"Condition\": \"true\" } ] }").unwrap_err();
        assert!(err.to_string().starts_with("Parse error:"), "{err}");
    }

    #[test]
    fn format_by_extension() {
        assert_eq!(RuleFormat::from_path(Path::new("a.YML")), Some(RuleFormat::Yaml));
        assert_eq!(RuleFormat::from_path(Path::new("a.json")), Some(RuleFormat::Json));
        assert_eq!(RuleFormat::from_path(Path::new("a.toml")), None);
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.yaml");
        std::fs::write(&path, AGE_YAML).unwrap();
        assert_eq!(load_rule_file(&path).unwrap().rules.len(), 2);

        let txt = dir.path().join("rules.txt");
        std::fs::write(&txt, AGE_YAML).unwrap();
        let err = load_rule_file(&txt).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(_)));
        assert!(err.is_usage());

        assert!(matches!(
            load_rule_file(dir.path().join("missing.json")),
            Err(LoadError::Read { .. })
        ));
    }
}
