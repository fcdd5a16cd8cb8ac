//! The Purpose record attached to Immuta resources.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::convert::Element;
use crate::error::BridgeError;
use crate::schema::{Attribute, AttributeType};
use crate::validation::{describe, join_path};
use crate::value::{AttrValue, ObjectValue};

const NAME: &str = "name";
const DESCRIPTION: &str = "description";
const ACKNOWLEDGEMENT: &str = "acknowledgement";

/// A purpose users must acknowledge before accessing governed data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Purpose {
    /// Purpose name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Statement users acknowledge when working under this purpose.
    pub acknowledgement: String,
}

impl Purpose {
    /// Create a purpose.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        acknowledgement: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            acknowledgement: acknowledgement.into(),
        }
    }

    /// The object type purposes are encoded as.
    pub fn attr_type() -> AttributeType {
        AttributeType::Object(Self::attribute_types())
    }

    /// Optional list-of-purposes attribute for resource schemas.
    pub fn list_attribute() -> Attribute {
        Attribute::optional_list(Self::attr_type())
            .with_description("Purposes associated with the resource")
    }

    fn attribute_types() -> BTreeMap<String, AttributeType> {
        [NAME, DESCRIPTION, ACKNOWLEDGEMENT]
            .into_iter()
            .map(|name| (name.to_string(), AttributeType::String))
            .collect()
    }
}

impl Element for Purpose {
    fn attr_type() -> AttributeType {
        Purpose::attr_type()
    }

    fn decode(value: &AttrValue, path: &str) -> Result<Self, BridgeError> {
        let object = match value {
            AttrValue::Object(object) => object,
            AttrValue::Null(_) => return Err(BridgeError::decode(path, "unhandled null value")),
            AttrValue::Unknown(_) => {
                return Err(BridgeError::decode(path, "unhandled unknown value"))
            },
            other => {
                return Err(BridgeError::decode(
                    path,
                    format!("expected purpose object, got {}", describe(other)),
                ))
            },
        };

        if object.attribute_types() != &Self::attribute_types() {
            return Err(BridgeError::decode(
                path,
                format!(
                    "expected {}, got {}",
                    Purpose::attr_type(),
                    describe(value)
                ),
            ));
        }

        Ok(Self {
            name: string_field(object, NAME, path)?,
            description: string_field(object, DESCRIPTION, path)?,
            acknowledgement: string_field(object, ACKNOWLEDGEMENT, path)?,
        })
    }

    fn encode(&self, path: &str) -> Result<AttrValue, BridgeError> {
        let attributes = [
            (NAME, &self.name),
            (DESCRIPTION, &self.description),
            (ACKNOWLEDGEMENT, &self.acknowledgement),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), AttrValue::String(value.clone())))
        .collect();

        ObjectValue::new(Self::attribute_types(), attributes)
            .map(AttrValue::Object)
            .map_err(|diagnostics| {
                let details: Vec<String> = diagnostics
                    .into_iter()
                    .map(|d| d.detail.unwrap_or(d.summary))
                    .collect();
                BridgeError::encode(path, details.join("; "))
            })
    }
}

fn string_field(object: &ObjectValue, name: &str, path: &str) -> Result<String, BridgeError> {
    let field_path = join_path(path, name);
    match object.get(name) {
        Some(value) => String::decode(value, &field_path),
        None => Err(BridgeError::decode(field_path, "missing attribute")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn research() -> Purpose {
        Purpose::new("Research", "Academic research", "I agree to use data for research")
    }

    #[test]
    fn test_purpose_attr_type() {
        let ty = Purpose::attr_type();
        assert_eq!(
            ty.to_string(),
            "object({acknowledgement: string, description: string, name: string})"
        );

        let attr = Purpose::list_attribute();
        assert_eq!(attr.attr_type, AttributeType::list(ty));
        assert!(attr.flags.optional);
    }

    #[test]
    fn test_purpose_encode_decode() {
        let encoded = research().encode("").unwrap();
        assert_eq!(encoded.attr_type(), Purpose::attr_type());
        assert_eq!(
            encoded.to_json().unwrap(),
            json!({
                "name": "Research",
                "description": "Academic research",
                "acknowledgement": "I agree to use data for research"
            })
        );

        let decoded = Purpose::decode(&encoded, "").unwrap();
        assert_eq!(decoded, research());
    }

    #[test]
    fn test_purpose_decode_null_field() {
        let value = AttrValue::from_json(
            &Purpose::attr_type(),
            &json!({"name": "Research", "description": null, "acknowledgement": "ok"}),
        )
        .unwrap();

        let err = Purpose::decode(&value, "purposes.0").unwrap_err();
        assert!(err.is_decode());
        assert_eq!(err.path(), "purposes.0.description");
        assert_eq!(err.message(), "unhandled null value");
    }

    #[test]
    fn test_purpose_decode_wrong_shape() {
        let err = Purpose::decode(&AttrValue::string("Research"), "").unwrap_err();
        assert_eq!(err.message(), "expected purpose object, got string");

        let other = AttrValue::from_json(
            &AttributeType::object([("name", AttributeType::String)]),
            &json!({"name": "Research"}),
        )
        .unwrap();
        let err = Purpose::decode(&other, "").unwrap_err();
        assert!(err.message().starts_with("expected object({acknowledgement"));
    }

    #[test]
    fn test_purpose_deserializes_from_api_payload() {
        let purpose: Purpose = serde_json::from_value(json!({
            "name": "Research",
            "description": "Academic research",
            "acknowledgement": "I agree to use data for research"
        }))
        .unwrap();
        assert_eq!(purpose, research());
    }
}
