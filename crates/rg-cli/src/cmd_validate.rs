use std::path::{Path, PathBuf};

use rg_config::{load_input_types, load_rule_file};
use rg_core::validate::validate;
use rg_lang::SymbolTable;

pub const USAGE: &str = "Usage: rulegraph validate <rule-file> [<comma-separated-type-files>]";

pub const EXIT_OK: i32 = 0;
pub const EXIT_USAGE: i32 = 1;
pub const EXIT_PARSE: i32 = 2;
pub const EXIT_INVALID: i32 = 3;

/// Result of one validation pass: process exit code plus the lines destined
/// for stdout (diagnostics and summary) and stderr (warnings, usage).
#[derive(Debug, Default)]
pub struct ValidateOutcome {
    pub code: i32,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

impl ValidateOutcome {
    fn fail(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            stdout: Vec::new(),
            stderr: vec![message.into()],
        }
    }
}

/// Print the outcome and exit with its code.
pub fn run(rule_file: Option<PathBuf>, types: Option<String>) {
    let outcome = match rule_file {
        Some(path) => validate_file(&path, types.as_deref()),
        None => ValidateOutcome::fail(EXIT_USAGE, USAGE),
    };
    for line in &outcome.stderr {
        eprintln!("{line}");
    }
    for line in &outcome.stdout {
        println!("{line}");
    }
    std::process::exit(outcome.code);
}

/// Validate every expression of `rule_file` against the inputs declared in
/// the comma-separated `type_files`.
pub fn validate_file(rule_file: &Path, type_files: Option<&str>) -> ValidateOutcome {
    if !rule_file.is_file() {
        return ValidateOutcome::fail(
            EXIT_USAGE,
            format!("File not found: {}", rule_file.display()),
        );
    }

    let mut outcome = ValidateOutcome::default();
    let inputs = declared_inputs(type_files, &mut outcome.stderr);

    let definition = match load_rule_file(rule_file) {
        Ok(def) => def,
        Err(e) => {
            let code = if e.is_usage() { EXIT_USAGE } else { EXIT_PARSE };
            return ValidateOutcome::fail(code, e.to_string());
        }
    };
    rg_debug!(
        check,
        rules = definition.rules.len(),
        inputs = inputs.len(),
        "validating rule file"
    );

    let report = validate(&definition, &inputs);
    outcome
        .stdout
        .extend(report.errors.iter().map(ToString::to_string));
    if report.is_valid() {
        outcome.stdout.push("All expressions are valid.".to_string());
        outcome.code = EXIT_OK;
    } else {
        outcome
            .stdout
            .push(format!("{} error(s) found.", report.error_count()));
        outcome.code = EXIT_INVALID;
    }
    outcome
}

/// Unreadable or malformed type files are reported and skipped.
fn declared_inputs(type_files: Option<&str>, warnings: &mut Vec<String>) -> SymbolTable {
    let mut inputs = SymbolTable::new();
    let paths = type_files
        .into_iter()
        .flat_map(|list| list.split(','))
        .map(str::trim)
        .filter(|p| !p.is_empty());
    for path in paths {
        if !Path::new(path).is_file() {
            warnings.push(format!("Warning: Type file '{path}' not found. Skipping."));
            continue;
        }
        match load_input_types(path) {
            Ok(declared) => {
                for (name, ty) in declared {
                    inputs.push(name, ty);
                }
            }
            Err(e) => warnings.push(format!("Warning: Could not load type file '{path}': {e}. Skipping.")),
        }
    }
    inputs
}
