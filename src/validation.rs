//! Type conformance checks for framework values.
//!
//! This module validates an [`AttrValue`] against an [`AttributeType`] and reports
//! every mismatch with the dotted path of the offending element. Value constructors
//! run the same checks, so a collection can never hold an element of the wrong type.
//!
//! # Example
//!
//! ```
//! use immuta_provider_attrs::schema::AttributeType;
//! use immuta_provider_attrs::validation::validate;
//! use immuta_provider_attrs::value::AttrValue;
//!
//! let ty = AttributeType::list(AttributeType::String);
//!
//! // Valid input
//! let value = AttrValue::list(AttributeType::String, vec![AttrValue::string("a")]).unwrap();
//! assert!(validate(&ty, &value).is_empty());
//!
//! // Invalid input - a map where a list is expected
//! let value = AttrValue::Null(AttributeType::map(AttributeType::String));
//! let diagnostics = validate(&ty, &value);
//! assert_eq!(diagnostics.len(), 1);
//! ```

use std::collections::BTreeMap;

use serde_json::Value;

use crate::schema::{AttributeType, Diagnostic, DiagnosticSeverity, Diagnostics};
use crate::value::{AttrValue, ObjectValue};

/// Validate a framework value against an attribute type.
///
/// Returns a list of diagnostics for any mismatch found.
/// An empty list means the value conforms.
///
/// # Validation Rules
///
/// - Null and unknown values must carry exactly the expected type
/// - Lists and maps must declare the expected element type
/// - Every element is validated recursively
/// - Objects must contain every declared attribute and nothing else
pub fn validate(ty: &AttributeType, value: &AttrValue) -> Diagnostics {
    let mut diagnostics = Vec::new();
    validate_value(ty, value, "", &mut diagnostics);
    diagnostics.into()
}

/// Validate a framework value, returning Ok if it conforms or Err with diagnostics.
///
/// This is a convenience wrapper around [`validate`] that returns a Result.
pub fn validate_result(ty: &AttributeType, value: &AttrValue) -> Result<(), Diagnostics> {
    let diagnostics = validate(ty, value);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}

/// Check if a framework value conforms to an attribute type.
///
/// Use [`validate`] to get detailed error information.
pub fn is_valid(ty: &AttributeType, value: &AttrValue) -> bool {
    validate(ty, value).is_empty()
}

pub(crate) fn validate_value(
    ty: &AttributeType,
    value: &AttrValue,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match (ty, value) {
        (_, AttrValue::Null(declared)) | (_, AttrValue::Unknown(declared)) => {
            if declared != ty {
                diagnostics.push(type_error(path, ty, value));
            }
        },
        (AttributeType::String, AttrValue::String(_))
        | (AttributeType::Number, AttrValue::Number(_))
        | (AttributeType::Bool, AttrValue::Bool(_)) => {},
        (AttributeType::List(elem), AttrValue::List(list)) => {
            if list.element_type() != elem.as_ref() {
                diagnostics.push(type_error(path, ty, value));
                return;
            }
            for (i, element) in list.elements().iter().enumerate() {
                validate_value(elem, element, &join_path(path, &i.to_string()), diagnostics);
            }
        },
        (AttributeType::Map(elem), AttrValue::Map(map)) => {
            if map.element_type() != elem.as_ref() {
                diagnostics.push(type_error(path, ty, value));
                return;
            }
            for (key, element) in map.elements() {
                validate_value(elem, element, &join_path(path, key), diagnostics);
            }
        },
        (AttributeType::Object(attrs), AttrValue::Object(object)) => {
            validate_object(attrs, object, path, diagnostics);
        },
        _ => diagnostics.push(type_error(path, ty, value)),
    }
}

fn validate_object(
    attrs: &BTreeMap<String, AttributeType>,
    object: &ObjectValue,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for (name, attr_type) in attrs {
        let attr_path = join_path(path, name);
        match object.get(name) {
            Some(value) => validate_value(attr_type, value, &attr_path, diagnostics),
            None => diagnostics.push(
                Diagnostic::error(format!("Missing object attribute '{}'", attr_path))
                    .with_detail(format!("Expected a value of type {}", attr_type))
                    .with_attribute(attr_path),
            ),
        }
    }

    for name in object.attributes().keys() {
        if !attrs.contains_key(name) {
            let attr_path = join_path(path, name);
            diagnostics.push(
                Diagnostic::error(format!("Unsupported object attribute '{}'", attr_path))
                    .with_detail("The object type does not declare this attribute")
                    .with_attribute(attr_path),
            );
        }
    }
}

// Helper functions

pub(crate) fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", base, name)
    }
}

pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn describe(value: &AttrValue) -> String {
    match value {
        AttrValue::Null(ty) => format!("null {}", ty),
        AttrValue::Unknown(ty) => format!("unknown {}", ty),
        known => known.attr_type().to_string(),
    }
}

fn type_error(path: &str, expected: &AttributeType, got: &AttrValue) -> Diagnostic {
    Diagnostic {
        severity: DiagnosticSeverity::Error,
        summary: if path.is_empty() {
            "Invalid attribute value type".to_string()
        } else {
            format!("Invalid type for attribute '{}'", path)
        },
        detail: Some(format!("Expected {}, got {}", expected, describe(got))),
        attribute: None,
    }
    .with_attribute_if_not_empty(path)
}

trait DiagnosticExt {
    fn with_attribute_if_not_empty(self, path: &str) -> Self;
}

impl DiagnosticExt for Diagnostic {
    fn with_attribute_if_not_empty(self, path: &str) -> Self {
        if path.is_empty() {
            self
        } else {
            self.with_attribute(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn from_json(ty: &AttributeType, json: Value) -> AttrValue {
        AttrValue::from_json(ty, &json).unwrap()
    }

    #[test]
    fn test_validate_primitives() {
        assert!(is_valid(&AttributeType::String, &AttrValue::string("x")));
        assert!(is_valid(&AttributeType::Number, &AttrValue::number_from_int(1)));
        assert!(is_valid(&AttributeType::Bool, &AttrValue::Bool(false)));

        let diagnostics = validate(&AttributeType::String, &AttrValue::number_from_int(1));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Invalid attribute value type");
        assert_eq!(
            diagnostics[0].detail,
            Some("Expected string, got number".to_string())
        );
        assert!(diagnostics[0].attribute.is_none());
    }

    #[test]
    fn test_validate_null_and_unknown_types() {
        let ty = AttributeType::list(AttributeType::String);
        assert!(is_valid(&ty, &AttrValue::Null(ty.clone())));
        assert!(is_valid(&ty, &AttrValue::Unknown(ty.clone())));

        let diagnostics = validate(&ty, &AttrValue::Null(AttributeType::String));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].detail,
            Some("Expected list(string), got null string".to_string())
        );
    }

    #[test]
    fn test_validate_list_element_type() {
        let ty = AttributeType::list(AttributeType::String);
        let numbers = from_json(&AttributeType::list(AttributeType::Number), json!([1, 2]));

        let diagnostics = validate(&ty, &numbers);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].detail.as_ref().unwrap().contains("list(number)"));
    }

    #[test]
    fn test_validate_nested_paths() {
        let ty = AttributeType::object([
            ("tags", AttributeType::list(AttributeType::String)),
            (
                "owner",
                AttributeType::object([("name", AttributeType::String)]),
            ),
        ]);
        let value = from_json(&ty, json!({"tags": ["a"], "owner": {"name": "ops"}}));
        assert!(validate(&ty, &value).is_empty());

        let numeric_owner = AttributeType::object([
            ("tags", AttributeType::list(AttributeType::String)),
            (
                "owner",
                AttributeType::object([("name", AttributeType::Number)]),
            ),
        ]);
        let value = from_json(&numeric_owner, json!({"tags": [], "owner": {"name": 7}}));
        let diagnostics = validate(&ty, &value);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("owner.name".to_string()));
        assert_eq!(
            diagnostics[0].summary,
            "Invalid type for attribute 'owner.name'"
        );
    }

    #[test]
    fn test_validate_collection_element_type_mismatch() {
        let ty = AttributeType::map(AttributeType::String);
        let value = from_json(&AttributeType::map(AttributeType::Bool), json!({"on": true}));
        let diagnostics = validate(&ty, &value);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].attribute.is_none());
    }

    #[test]
    fn test_validate_object_attributes() {
        let ty = AttributeType::object([
            ("host", AttributeType::String),
            ("port", AttributeType::Number),
        ]);
        let value = from_json(&ty, json!({"host": "localhost", "port": 8080}));
        assert!(validate(&ty, &value).is_empty());

        let narrower = AttributeType::object([("host", AttributeType::String)]);
        let diagnostics = validate(&narrower, &value);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("port".to_string()));
        assert!(diagnostics[0].summary.contains("Unsupported"));

        let wider = AttributeType::object([
            ("host", AttributeType::String),
            ("port", AttributeType::Number),
            ("tls", AttributeType::Bool),
        ]);
        let diagnostics = validate(&wider, &value);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("tls".to_string()));
    }

    #[test]
    fn test_validate_result_helper() {
        let ty = AttributeType::String;
        assert!(validate_result(&ty, &AttrValue::string("ok")).is_ok());

        let result = validate_result(&ty, &AttrValue::Bool(true));
        assert_eq!(result.unwrap_err().len(), 1);
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "tags"), "tags");
        assert_eq!(join_path("tags", "0"), "tags.0");
    }
}
