use chrono::NaiveDate;
use rg_lang::{Record, Value};

use super::*;
use crate::bindings::Bindings;
use crate::rule::RuleBody;

fn person(birthdate: &str) -> Bindings {
    let date = NaiveDate::parse_from_str(birthdate, "%Y-%m-%d").unwrap();
    Bindings::new()
        .with("Person", Record::named("Person").with("Birthdate", date))
        .unwrap()
        .with("CurrentYear", 2025)
        .unwrap()
}

fn age_rules() -> RuleSetDefinition {
    RuleSetDefinition::new()
        .parameter("Age", "CurrentYear - Person.Birthdate.Year")
        .rule(RuleDefinition::new("IsAdult", "Age >= 18").then("\"Adult\""))
        .rule(
            RuleDefinition::new("IsSenior", "Age >= 65")
                .depends_on("IsAdult")
                .then("\"Senior\""),
        )
}

fn artifact_values(engine: &Engine) -> Vec<Value> {
    engine
        .artifacts()
        .into_iter()
        .filter_map(|a| a.value)
        .collect()
}

#[test]
fn senior_gets_both_artifacts() {
    let engine = build_engine(&age_rules()).unwrap();
    let errors = engine.run(&person("1950-01-01")).unwrap();
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(
        artifact_values(&engine),
        [Value::from("Adult"), Value::from("Senior")]
    );
}

#[test]
fn minor_fails_dependency_without_condition_error() {
    let engine = build_engine(&age_rules()).unwrap();
    let errors = engine.run(&person("2010-01-01")).unwrap();
    assert_eq!(
        errors,
        [
            "Rule 'IsAdult' failed.",
            "Rule 'IsSenior' failed due to unsatisfied dependencies: IsAdult:true.",
        ]
    );
    assert!(engine.artifacts().is_empty());
}

#[test]
fn malformed_condition_does_not_block_other_rules() {
    let def = RuleSetDefinition::new()
        .rule(RuleDefinition::new("Good", "CurrentYear > 2000").then("\"ok\""))
        .rule(RuleDefinition::new("Broken", "CurrentYear >>> 1").then("\"never\""));
    let engine = build_engine(&def).unwrap();
    let errors = engine.run(&person("1990-01-01")).unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Rule 'Broken' failed: condition compile error"));
    assert_eq!(artifact_values(&engine), [Value::from("ok")]);
}

#[test]
fn child_failure_is_attributed_to_the_child() {
    let def = RuleSetDefinition::new().rule(
        RuleDefinition::new("Parent", "CurrentYear > 0").child(RuleDefinition::new("Kid", "Bogus > 1")),
    );
    let engine = build_engine(&def).unwrap();
    let errors = engine.run(&person("1990-01-01")).unwrap();
    assert_eq!(
        errors,
        [
            "Rule 'Parent' failed: child 'Kid': condition compile error: unknown identifier 'Bogus'",
            "Rule 'Kid' failed: condition compile error: unknown identifier 'Bogus'",
        ]
    );
}

#[test]
fn local_parameter_shadows_global_for_subtree() {
    // A global that would fail to evaluate: shadowing means it is never run.
    let def = RuleSetDefinition::new()
        .parameter("Limit", "1 / 0")
        .rule(
            RuleDefinition::new("Outer", "Limit == 18")
                .parameter("Limit", "18")
                .then("\"outer\"")
                .child(RuleDefinition::new("Inner", "Limit + 1 == 19").then("\"inner\"")),
        );
    let engine = build_engine(&def).unwrap();
    let errors = engine.run(&person("1990-01-01")).unwrap();
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(
        artifact_values(&engine),
        [Value::from("outer"), Value::from("inner")]
    );
}

#[test]
fn unshadowed_global_failure_is_per_rule() {
    let def = RuleSetDefinition::new()
        .parameter("Limit", "CurrentYear / 0")
        .rule(RuleDefinition::new("UsesGlobal", "Limit > 0"));
    let engine = build_engine(&def).unwrap();
    let errors = engine.run(&person("1990-01-01")).unwrap();
    assert_eq!(
        errors,
        ["Rule 'UsesGlobal' failed: parameter 'Limit' evaluation error: division by zero"]
    );
}

#[test]
fn local_parameters_see_earlier_ones() {
    let def = RuleSetDefinition::new()
        .parameter("Age", "CurrentYear - Person.Birthdate.Year")
        .rule(
            RuleDefinition::new("IsTeen", "IsTeen")
                .parameter("IsTeen", "Age >= 13 && Age <= 19")
                .then("\"IsTeen\""),
        );
    let engine = build_engine(&def).unwrap();
    engine.run(&person("2010-01-01")).unwrap();
    assert_eq!(artifact_values(&engine), [Value::from("IsTeen")]);
}

#[test]
fn nested_children_combine_with_operator() {
    let def = RuleSetDefinition::new()
        .parameter("Age", "CurrentYear - Person.Birthdate.Year")
        .rule(
            RuleDefinition::new("Eligible", "Age >= 18")
                .operator("or")
                .child(RuleDefinition::new("Senior", "Age >= 65"))
                .child(RuleDefinition::new("Young", "Age < 30"))
                .then("\"eligible\""),
        );
    let engine = build_engine(&def).unwrap();
    engine.run(&person("2000-01-01")).unwrap();
    assert!(artifact_values(&engine).contains(&Value::from("eligible")));

    engine.clear_artifacts();
    engine.run(&person("1980-01-01")).unwrap();
    assert!(!artifact_values(&engine).contains(&Value::from("eligible")));
}

#[test]
fn rule_without_then_yields_empty_artifact() {
    let def = RuleSetDefinition::new().rule(RuleDefinition::new("Plain", "true").then("   "));
    let engine = build_engine(&def).unwrap();
    engine.run(&person("2000-01-01")).unwrap();
    let artifacts = engine.artifacts();
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].id.as_deref(), Some("Plain"));
    assert_eq!(artifacts[0].value, None);
}

#[test]
fn non_bool_condition_is_a_rule_failure() {
    let def = RuleSetDefinition::new().rule(RuleDefinition::new("Numeric", "CurrentYear"));
    let engine = build_engine(&def).unwrap();
    let errors = engine.run(&person("2000-01-01")).unwrap();
    assert!(errors[0].contains("not compatible with expected type bool"), "{errors:?}");
}

#[test]
fn cache_is_reused_for_stable_shape() {
    let scope = scope::global_scope(&[crate::ParameterDefinition::new(
        "Age",
        "CurrentYear - Person.Birthdate.Year",
    )]);
    let body = ExpressionBody::new("R".into(), scope, "Age > 40".into(), Some("Age".into()));

    let first = body.evaluate(&person("1950-01-01")).unwrap();
    let second = body.evaluate(&person("2000-01-01")).unwrap();
    assert!(first.matched);
    assert!(!second.matched);
    assert_eq!(
        body.produce(&person("1950-01-01"), &first).unwrap(),
        Some(Value::Int(75))
    );
    assert_eq!(body.compilations(), 1);
}

#[test]
fn cache_recompiles_when_shape_changes() {
    let body = ExpressionBody::new("R".into(), scope::global_scope(&[]), "X > 1".into(), None);
    let ints = Bindings::from_pairs([("X", 5)]).unwrap();
    let floats = Bindings::from_pairs([("X", 0.5)]).unwrap();
    assert!(body.evaluate(&ints).unwrap().matched);
    assert!(!body.evaluate(&floats).unwrap().matched);
    assert!(body.evaluate(&ints).unwrap().matched);
    assert_eq!(body.compilations(), 3);
}

#[test]
fn invalid_definitions_are_rejected() {
    let bad_dep = RuleSetDefinition::new()
        .rule(RuleDefinition::new("A", "true").depends_on("B:sometimes"));
    assert!(matches!(
        build_rules(&bad_dep),
        Err(DefinitionError::MalformedDependency { .. })
    ));

    let bad_op = RuleSetDefinition::new().rule(RuleDefinition::new("A", "true").operator("XOR"));
    assert!(matches!(
        build_rules(&bad_op),
        Err(DefinitionError::InvalidOperator { .. })
    ));

    let empty_id = RuleSetDefinition::new().rule(RuleDefinition::new(" ", "true"));
    assert_eq!(build_rules(&empty_id).unwrap_err(), DefinitionError::EmptyId);
}

#[test]
fn duplicate_nested_id_fails_engine_build() {
    let def = RuleSetDefinition::new()
        .rule(RuleDefinition::new("A", "true").child(RuleDefinition::new("B", "true")))
        .rule(RuleDefinition::new("B", "true"));
    assert_eq!(
        build_engine(&def).err(),
        Some(EngineError::DuplicateRule("B".into()))
    );
}

#[tokio::test]
async fn concurrent_matches_sequential() {
    let def = age_rules().rule(
        RuleDefinition::new("NotAdult", "true")
            .depends_on("IsAdult:false")
            .then("\"minor\""),
    );
    for birthdate in ["1950-01-01", "1970-01-01", "2010-01-01"] {
        let sequential = build_engine(&def).unwrap();
        let concurrent = build_engine(&def).unwrap();
        let bindings = person(birthdate);

        let mut seq_errors = sequential.run(&bindings).unwrap();
        let mut con_errors = concurrent.run_concurrent(&bindings, 2).await.unwrap();
        seq_errors.sort();
        con_errors.sort();
        assert_eq!(seq_errors, con_errors, "{birthdate}");

        let ids = |e: &Engine| {
            let mut ids: Vec<_> = e.artifacts().into_iter().filter_map(|a| a.id).collect();
            ids.sort();
            ids
        };
        assert_eq!(ids(&sequential), ids(&concurrent), "{birthdate}");
    }
}
