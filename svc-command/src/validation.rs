//! Argument validation
//!
//! Two-phase validation: commands are checked leniently at construction so
//! they can be configured incrementally, and strictly right before a request
//! is built. Lenient passes only inject defaults; strict passes also fail on
//! missing required arguments and on type or value mismatches.

use crate::error::{ValidationError, Violation};
use crate::params::ParameterStore;
use serde_json::Value;
use svc_command_schema::{ArgRule, ArgumentSchema, ParamDescriptor};

/// How hard a validation pass fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    /// Fill defaults, never fail (construction time)
    Lenient,
    /// Fill defaults, fail on any violation (pre-execution)
    Strict,
}

/// Validate a store against an attached argument schema
pub fn validate_against_schema(
    schema: &ArgumentSchema,
    store: &mut ParameterStore,
    strictness: Strictness,
) -> Result<(), ValidationError> {
    validate_rules(schema.args.iter(), store, strictness)
}

/// Validate a store against an operation's declared parameter table
pub fn validate_against_declared(
    params: &[ParamDescriptor],
    store: &mut ParameterStore,
    strictness: Strictness,
) -> Result<(), ValidationError> {
    validate_rules(params.iter(), store, strictness)
}

fn validate_rules<'a, R, I>(
    rules: I,
    store: &mut ParameterStore,
    strictness: Strictness,
) -> Result<(), ValidationError>
where
    R: ArgRule + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut violations = Vec::new();

    for rule in rules {
        let name = rule.name();

        // Explicit nulls count as missing
        let present = store.get(name).is_some_and(|v| !v.is_null());
        if !present {
            if let Some(default) = rule.default_value() {
                tracing::trace!(argument = name, default = %default, "Injecting default");
                store.set(name, default);
            } else if rule.is_required() && strictness == Strictness::Strict {
                violations.push(Violation::MissingRequired {
                    name: name.to_string(),
                });
            }
            continue;
        }

        if strictness == Strictness::Lenient {
            continue;
        }

        if let Some(value) = store.get(name) {
            check_value(rule, value, &mut violations);
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { violations })
    }
}

fn check_value<R: ArgRule + ?Sized>(rule: &R, value: &Value, violations: &mut Vec<Violation>) {
    let kind = rule.kind();
    if !kind.matches(value) {
        violations.push(Violation::TypeMismatch {
            name: rule.name().to_string(),
            expected: kind.to_string(),
            actual: json_type_name(value).to_string(),
        });
        return;
    }

    let allowed = rule.possible_values();
    if !allowed.is_empty() && !allowed.contains(value) {
        violations.push(Violation::NotAllowed {
            name: rule.name().to_string(),
            value: value.to_string(),
            allowed: allowed
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        });
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use svc_command_schema::{ArgDescriptor, ArgType, StaticValue};

    fn id_schema() -> ArgumentSchema {
        ArgumentSchema::new("GetUser").arg(ArgDescriptor::new("id").required())
    }

    fn lenient(schema: &ArgumentSchema, store: &mut ParameterStore) -> Result<(), ValidationError> {
        validate_against_schema(schema, store, Strictness::Lenient)
    }

    fn strict(schema: &ArgumentSchema, store: &mut ParameterStore) -> Result<(), ValidationError> {
        validate_against_schema(schema, store, Strictness::Strict)
    }

    #[test]
    fn test_lenient_allows_missing_required() {
        let mut store = ParameterStore::new();
        assert!(lenient(&id_schema(), &mut store).is_ok());
        assert!(store.is_empty());
    }

    #[test]
    fn test_strict_fails_on_missing_required() {
        let mut store = ParameterStore::new();
        let err = strict(&id_schema(), &mut store).unwrap_err();
        assert_eq!(err.missing_arguments(), vec!["id"]);
    }

    #[test]
    fn test_strict_passes_when_present() {
        let mut store = ParameterStore::new();
        store.set("id", 7);
        assert!(strict(&id_schema(), &mut store).is_ok());
    }

    #[test]
    fn test_null_counts_as_missing() {
        let mut store = ParameterStore::new();
        store.set("id", Value::Null);
        let err = strict(&id_schema(), &mut store).unwrap_err();
        assert_eq!(err.missing_arguments(), vec!["id"]);
    }

    #[test]
    fn test_defaults_injected_in_both_modes() {
        let schema = ArgumentSchema::new("ListUsers")
            .arg(ArgDescriptor::new("limit").required().default(25));

        let mut first = ParameterStore::new();
        lenient(&schema, &mut first).unwrap();
        assert_eq!(first.get("limit"), Some(&json!(25)));

        let mut second = ParameterStore::new();
        strict(&schema, &mut second).unwrap();
        assert_eq!(second.get("limit"), Some(&json!(25)));
    }

    #[test]
    fn test_default_does_not_override_value() {
        let limit = ArgDescriptor::new("limit").default(25);
        let schema = ArgumentSchema::new("ListUsers").arg(limit);
        let mut store = ParameterStore::new();
        store.set("limit", 5);

        strict(&schema, &mut store).unwrap();
        assert_eq!(store.get("limit"), Some(&json!(5)));
    }

    #[test]
    fn test_type_mismatch_only_in_strict_mode() {
        let schema = ArgumentSchema::new("GetUser")
            .arg(ArgDescriptor::new("id").required().kind(ArgType::Integer));
        let mut store = ParameterStore::new();
        store.set("id", "seven");

        assert!(lenient(&schema, &mut store).is_ok());

        let err = strict(&schema, &mut store).unwrap_err();
        assert_eq!(
            err.violations,
            vec![Violation::TypeMismatch {
                name: "id".to_string(),
                expected: "integer".to_string(),
                actual: "string".to_string(),
            }]
        );
    }

    #[test]
    fn test_possible_values() {
        let schema = ArgumentSchema::new("ListUsers")
            .arg(ArgDescriptor::new("order").possible_values(["asc", "desc"]));
        let mut store = ParameterStore::new();
        store.set("order", "sideways");

        let err = strict(&schema, &mut store).unwrap_err();
        assert!(matches!(
            &err.violations[0],
            Violation::NotAllowed { name, .. } if name == "order"
        ));

        store.set("order", "asc");
        assert!(strict(&schema, &mut store).is_ok());
    }

    #[test]
    fn test_all_violations_reported() {
        let schema = ArgumentSchema::new("CreateUser")
            .arg(ArgDescriptor::new("name").required())
            .arg(ArgDescriptor::new("email").required())
            .arg(ArgDescriptor::new("age").kind(ArgType::Integer));
        let mut store = ParameterStore::new();
        store.set("age", true);

        let err = strict(&schema, &mut store).unwrap_err();
        assert_eq!(err.violations.len(), 3);
        assert_eq!(err.missing_arguments(), vec!["name", "email"]);
    }

    #[test]
    fn test_declared_params_share_semantics() {
        const PARAMS: &[ParamDescriptor] = &[
            ParamDescriptor::required("id").of_kind(ArgType::Integer),
            ParamDescriptor::optional("verbose").with_default(StaticValue::Bool(false)),
        ];

        let mut store = ParameterStore::new();
        let result = validate_against_declared(PARAMS, &mut store, Strictness::Lenient);
        assert!(result.is_ok());
        assert_eq!(store.get("verbose"), Some(&json!(false)));

        let result = validate_against_declared(PARAMS, &mut store, Strictness::Strict);
        assert_eq!(result.unwrap_err().missing_arguments(), vec!["id"]);

        store.set("id", 3);
        let result = validate_against_declared(PARAMS, &mut store, Strictness::Strict);
        assert!(result.is_ok());
    }
}
