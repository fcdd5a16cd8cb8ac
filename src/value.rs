//! Framework attribute values.
//!
//! An [`AttrValue`] is the typed, possibly-null, possibly-unknown value the plugin
//! runtime hands to a provider. Collection values carry their element type and can
//! only be built from elements that conform to it, so a value that exists is
//! always well-typed.
//!
//! # Example
//!
//! ```
//! use immuta_provider_attrs::schema::AttributeType;
//! use immuta_provider_attrs::value::AttrValue;
//! use serde_json::json;
//!
//! let ty = AttributeType::list(AttributeType::String);
//! let value = AttrValue::from_json(&ty, &json!(["a", "b"])).unwrap();
//! assert_eq!(value.attr_type(), ty);
//! assert_eq!(value.to_json().unwrap(), json!(["a", "b"]));
//! ```

use serde_json::{Number, Value};
use std::collections::BTreeMap;

use crate::error::BridgeError;
use crate::schema::{AttributeType, Diagnostics};
use crate::validation::{join_path, validate_value, value_type_name};

/// A typed framework attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// An absent value of the given type.
    Null(AttributeType),
    /// A value that is not yet known (only during planning).
    Unknown(AttributeType),
    /// A known string.
    String(String),
    /// A known number.
    Number(Number),
    /// A known boolean.
    Bool(bool),
    /// A known list.
    List(ListValue),
    /// A known map.
    Map(MapValue),
    /// A known object.
    Object(ObjectValue),
}

impl AttrValue {
    /// Create a string value.
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Create a number value from an integer, as used for numeric identifiers.
    pub fn number_from_int(value: i64) -> Self {
        Self::Number(Number::from(value))
    }

    /// Create a list value, validating every element against `element_type`.
    pub fn list(element_type: AttributeType, elements: Vec<AttrValue>) -> Result<Self, Diagnostics> {
        ListValue::new(element_type, elements).map(Self::List)
    }

    /// Create a map value, validating every element against `element_type`.
    pub fn map(
        element_type: AttributeType,
        elements: BTreeMap<String, AttrValue>,
    ) -> Result<Self, Diagnostics> {
        MapValue::new(element_type, elements).map(Self::Map)
    }

    /// The attribute type of this value.
    pub fn attr_type(&self) -> AttributeType {
        match self {
            Self::Null(ty) | Self::Unknown(ty) => ty.clone(),
            Self::String(_) => AttributeType::String,
            Self::Number(_) => AttributeType::Number,
            Self::Bool(_) => AttributeType::Bool,
            Self::List(list) => AttributeType::list(list.element_type.clone()),
            Self::Map(map) => AttributeType::map(map.element_type.clone()),
            Self::Object(object) => AttributeType::Object(object.attribute_types.clone()),
        }
    }

    /// Whether this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null(_))
    }

    /// Whether this value is unknown.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }

    /// The string content, if this is a known string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Build a value of type `ty` from its JSON state representation.
    ///
    /// JSON `null` becomes a typed null. Object attributes missing from the JSON
    /// become typed nulls; attributes not declared by the type are rejected.
    pub fn from_json(ty: &AttributeType, json: &Value) -> Result<Self, BridgeError> {
        from_json_at(ty, json, "")
    }

    /// Render this value as its JSON state representation.
    ///
    /// Fails for unknown values, which have no JSON form.
    pub fn to_json(&self) -> Result<Value, BridgeError> {
        to_json_at(self, "")
    }
}

/// A known list with a declared element type.
#[derive(Debug, Clone, PartialEq)]
pub struct ListValue {
    element_type: AttributeType,
    elements: Vec<AttrValue>,
}

impl ListValue {
    /// Create a list, validating every element against `element_type`.
    pub fn new(element_type: AttributeType, elements: Vec<AttrValue>) -> Result<Self, Diagnostics> {
        let mut diagnostics = Vec::new();
        for (i, element) in elements.iter().enumerate() {
            validate_value(&element_type, element, &i.to_string(), &mut diagnostics);
        }
        if diagnostics.is_empty() {
            Ok(Self {
                element_type,
                elements,
            })
        } else {
            Err(diagnostics.into())
        }
    }

    /// The declared element type.
    pub fn element_type(&self) -> &AttributeType {
        &self.element_type
    }

    /// The elements in order.
    pub fn elements(&self) -> &[AttrValue] {
        &self.elements
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the list has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// A known map with a declared element type.
#[derive(Debug, Clone, PartialEq)]
pub struct MapValue {
    element_type: AttributeType,
    elements: BTreeMap<String, AttrValue>,
}

impl MapValue {
    /// Create a map, validating every element against `element_type`.
    pub fn new(
        element_type: AttributeType,
        elements: BTreeMap<String, AttrValue>,
    ) -> Result<Self, Diagnostics> {
        let mut diagnostics = Vec::new();
        for (key, element) in &elements {
            validate_value(&element_type, element, key, &mut diagnostics);
        }
        if diagnostics.is_empty() {
            Ok(Self {
                element_type,
                elements,
            })
        } else {
            Err(diagnostics.into())
        }
    }

    /// The declared element type.
    pub fn element_type(&self) -> &AttributeType {
        &self.element_type
    }

    /// The elements keyed by name.
    pub fn elements(&self) -> &BTreeMap<String, AttrValue> {
        &self.elements
    }

    /// Look up an element by key.
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.elements.get(key)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the map has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// A known object with a fixed set of typed attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectValue {
    attribute_types: BTreeMap<String, AttributeType>,
    attributes: BTreeMap<String, AttrValue>,
}

impl ObjectValue {
    /// Create an object. Every declared attribute must be present and conform to
    /// its type, and no undeclared attribute may appear.
    pub fn new(
        attribute_types: BTreeMap<String, AttributeType>,
        attributes: BTreeMap<String, AttrValue>,
    ) -> Result<Self, Diagnostics> {
        let object = Self {
            attribute_types,
            attributes,
        };
        let mut diagnostics = Vec::new();
        let ty = AttributeType::Object(object.attribute_types.clone());
        validate_value(&ty, &AttrValue::Object(object.clone()), "", &mut diagnostics);
        if diagnostics.is_empty() {
            Ok(object)
        } else {
            Err(diagnostics.into())
        }
    }

    /// The declared attribute types.
    pub fn attribute_types(&self) -> &BTreeMap<String, AttributeType> {
        &self.attribute_types
    }

    /// The attribute values.
    pub fn attributes(&self) -> &BTreeMap<String, AttrValue> {
        &self.attributes
    }

    /// Look up an attribute by name.
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }
}

fn from_json_at(ty: &AttributeType, json: &Value, path: &str) -> Result<AttrValue, BridgeError> {
    if json.is_null() {
        return Ok(AttrValue::Null(ty.clone()));
    }
    match (ty, json) {
        (AttributeType::String, Value::String(s)) => Ok(AttrValue::String(s.clone())),
        (AttributeType::Number, Value::Number(n)) => Ok(AttrValue::Number(n.clone())),
        (AttributeType::Bool, Value::Bool(b)) => Ok(AttrValue::Bool(*b)),
        (AttributeType::List(elem), Value::Array(items)) => {
            let elements = items
                .iter()
                .enumerate()
                .map(|(i, item)| from_json_at(elem, item, &join_path(path, &i.to_string())))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(AttrValue::List(ListValue {
                element_type: (**elem).clone(),
                elements,
            }))
        },
        (AttributeType::Map(elem), Value::Object(entries)) => {
            let elements = entries
                .iter()
                .map(|(key, item)| {
                    from_json_at(elem, item, &join_path(path, key)).map(|v| (key.clone(), v))
                })
                .collect::<Result<BTreeMap<_, _>, _>>()?;
            Ok(AttrValue::Map(MapValue {
                element_type: (**elem).clone(),
                elements,
            }))
        },
        (AttributeType::Object(attribute_types), Value::Object(entries)) => {
            if let Some(extra) = entries.keys().find(|k| !attribute_types.contains_key(*k)) {
                return Err(BridgeError::decode(
                    join_path(path, extra),
                    format!("unsupported attribute \"{}\"", extra),
                ));
            }
            let mut attributes = BTreeMap::new();
            for (name, attr_type) in attribute_types {
                let item = entries.get(name).unwrap_or(&Value::Null);
                let value = from_json_at(attr_type, item, &join_path(path, name))?;
                attributes.insert(name.clone(), value);
            }
            Ok(AttrValue::Object(ObjectValue {
                attribute_types: attribute_types.clone(),
                attributes,
            }))
        },
        _ => Err(BridgeError::decode(
            path,
            format!("expected {}, got {}", ty, value_type_name(json)),
        )),
    }
}

fn to_json_at(value: &AttrValue, path: &str) -> Result<Value, BridgeError> {
    match value {
        AttrValue::Null(_) => Ok(Value::Null),
        AttrValue::Unknown(_) => Err(BridgeError::decode(path, "unhandled unknown value")),
        AttrValue::String(s) => Ok(Value::String(s.clone())),
        AttrValue::Number(n) => Ok(Value::Number(n.clone())),
        AttrValue::Bool(b) => Ok(Value::Bool(*b)),
        AttrValue::List(list) => list
            .elements
            .iter()
            .enumerate()
            .map(|(i, element)| to_json_at(element, &join_path(path, &i.to_string())))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        AttrValue::Map(map) => entries_to_json(&map.elements, path),
        AttrValue::Object(object) => entries_to_json(&object.attributes, path),
    }
}

fn entries_to_json(entries: &BTreeMap<String, AttrValue>, path: &str) -> Result<Value, BridgeError> {
    let mut out = serde_json::Map::new();
    for (key, element) in entries {
        out.insert(key.clone(), to_json_at(element, &join_path(path, key))?);
    }
    Ok(Value::Object(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn purpose_type() -> AttributeType {
        AttributeType::object([
            ("name", AttributeType::String),
            ("description", AttributeType::String),
            ("acknowledgement", AttributeType::String),
        ])
    }

    #[test]
    fn test_attr_type_reporting() {
        assert_eq!(AttrValue::string("x").attr_type(), AttributeType::String);
        assert_eq!(AttrValue::number_from_int(3).attr_type(), AttributeType::Number);
        assert_eq!(
            AttrValue::Null(AttributeType::list(AttributeType::String)).attr_type(),
            AttributeType::list(AttributeType::String)
        );

        let list = AttrValue::list(AttributeType::String, vec![AttrValue::string("a")]).unwrap();
        assert_eq!(list.attr_type(), AttributeType::list(AttributeType::String));
    }

    #[test]
    fn test_list_rejects_mismatched_elements() {
        let err = AttrValue::list(
            AttributeType::String,
            vec![AttrValue::string("a"), AttrValue::Bool(true)],
        )
        .unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err[0].attribute, Some("1".to_string()));
    }

    #[test]
    fn test_list_accepts_typed_nulls() {
        let list = ListValue::new(
            AttributeType::String,
            vec![AttrValue::Null(AttributeType::String)],
        )
        .unwrap();
        assert_eq!(list.len(), 1);

        let err = ListValue::new(
            AttributeType::String,
            vec![AttrValue::Null(AttributeType::Number)],
        )
        .unwrap_err();
        assert!(err.has_error());
    }

    #[test]
    fn test_map_rejects_mismatched_elements() {
        let mut elements = BTreeMap::new();
        elements.insert("env".to_string(), AttrValue::string("prod"));
        elements.insert("count".to_string(), AttrValue::number_from_int(1));

        let err = MapValue::new(AttributeType::String, elements).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err[0].attribute, Some("count".to_string()));
    }

    #[test]
    fn test_object_requires_declared_attributes() {
        let mut types = BTreeMap::new();
        types.insert("name".to_string(), AttributeType::String);
        types.insert("description".to_string(), AttributeType::String);

        let mut attributes = BTreeMap::new();
        attributes.insert("name".to_string(), AttrValue::string("Research"));

        let err = ObjectValue::new(types.clone(), attributes.clone()).unwrap_err();
        assert_eq!(err[0].attribute, Some("description".to_string()));

        attributes.insert("description".to_string(), AttrValue::string("d"));
        attributes.insert("extra".to_string(), AttrValue::string("x"));
        let err = ObjectValue::new(types, attributes).unwrap_err();
        assert_eq!(err[0].attribute, Some("extra".to_string()));
    }

    #[test]
    fn test_from_json_list_and_map() {
        let ty = AttributeType::map(AttributeType::String);
        let value = AttrValue::from_json(&ty, &json!({"k": "v", "n": null})).unwrap();
        match &value {
            AttrValue::Map(map) => {
                assert_eq!(map.get("k").and_then(AttrValue::as_str), Some("v"));
                assert!(map.get("n").unwrap().is_null());
            },
            other => panic!("expected map, got {:?}", other),
        }
        assert_eq!(value.to_json().unwrap(), json!({"k": "v", "n": null}));
    }

    #[test]
    fn test_from_json_null_is_typed() {
        let ty = AttributeType::list(AttributeType::String);
        let value = AttrValue::from_json(&ty, &Value::Null).unwrap();
        assert_eq!(value, AttrValue::Null(ty));
    }

    #[test]
    fn test_from_json_type_mismatch_reports_path() {
        let ty = AttributeType::list(AttributeType::String);
        let err = AttrValue::from_json(&ty, &json!(["a", 2])).unwrap_err();
        assert!(err.is_decode());
        assert_eq!(err.path(), "1");
        assert_eq!(err.message(), "expected string, got number");
    }

    #[test]
    fn test_from_json_object_fills_missing_with_null() {
        let ty = purpose_type();
        let value = AttrValue::from_json(&ty, &json!({"name": "Research"})).unwrap();
        match value {
            AttrValue::Object(object) => {
                assert_eq!(object.get("name").and_then(AttrValue::as_str), Some("Research"));
                assert!(object.get("acknowledgement").unwrap().is_null());
            },
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_from_json_object_rejects_extra_attributes() {
        let ty = AttributeType::list(purpose_type());
        let err = AttrValue::from_json(&ty, &json!([{"name": "a", "owner": "b"}])).unwrap_err();
        assert_eq!(err.path(), "0.owner");
    }

    #[test]
    fn test_to_json_rejects_unknown() {
        let err = AttrValue::Unknown(AttributeType::String).to_json().unwrap_err();
        assert_eq!(err.message(), "unhandled unknown value");

        let list = AttrValue::list(
            AttributeType::String,
            vec![AttrValue::string("a"), AttrValue::Unknown(AttributeType::String)],
        )
        .unwrap();
        assert_eq!(list.to_json().unwrap_err().path(), "1");
    }
}
