//! Conversions between framework values and native collections.
//!
//! A native collection is a plain `Vec` or `HashMap` whose elements implement
//! [`Element`]. The same three operations work for every collection:
//!
//! - [`decode`] unpacks a framework value into the collection
//! - [`encode`] builds a framework value from the collection
//! - [`reconcile_if_changed`] keeps the stored value unless the freshly fetched
//!   collection differs from it
//!
//! # Example
//!
//! ```
//! use immuta_provider_attrs::convert::{encode, reconcile_if_changed, StringList};
//!
//! let stored = encode(&vec!["a".to_string(), "b".to_string()]).0;
//!
//! // Same content: the stored value is kept verbatim.
//! let fresh: StringList = vec!["a".into(), "b".into()];
//! let (value, diagnostics) = reconcile_if_changed(&stored, &fresh);
//! assert!(diagnostics.is_empty());
//! assert_eq!(value, stored);
//!
//! // Order matters for lists.
//! let fresh: StringList = vec!["b".into(), "a".into()];
//! let (value, _) = reconcile_if_changed(&stored, &fresh);
//! assert_eq!(value, encode(&fresh).0);
//! ```

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument, trace, warn};

use crate::error::BridgeError;
use crate::purpose::Purpose;
use crate::schema::{AttributeType, Diagnostic, Diagnostics};
use crate::validation::{describe, join_path, value_type_name};
use crate::value::{AttrValue, ListValue, MapValue};

/// Map from string key to untyped value, as returned by the API.
pub type NativeMap = HashMap<String, Value>;

/// Ordered sequence of untyped values.
pub type NativeList = Vec<Value>;

/// Ordered sequence of strings.
pub type StringList = Vec<String>;

/// Ordered sequence of purposes.
pub type PurposeList = Vec<Purpose>;

/// A native value that can be stored as an element of a framework collection.
pub trait Element: Sized + PartialEq {
    /// The framework type elements are encoded as.
    fn attr_type() -> AttributeType;

    /// Whether a collection declaring `element_type` can be decoded into this element.
    fn accepts(element_type: &AttributeType) -> bool {
        *element_type == Self::attr_type()
    }

    /// Decode a single framework element found at `path`.
    fn decode(value: &AttrValue, path: &str) -> Result<Self, BridgeError>;

    /// Encode this element as a framework value destined for `path`.
    fn encode(&self, path: &str) -> Result<AttrValue, BridgeError>;
}

impl Element for String {
    fn attr_type() -> AttributeType {
        AttributeType::String
    }

    fn decode(value: &AttrValue, path: &str) -> Result<Self, BridgeError> {
        match value {
            AttrValue::String(s) => Ok(s.clone()),
            AttrValue::Null(_) => Err(BridgeError::decode(path, "unhandled null value")),
            AttrValue::Unknown(_) => Err(BridgeError::decode(path, "unhandled unknown value")),
            other => Err(BridgeError::decode(
                path,
                format!("expected string, got {}", describe(other)),
            )),
        }
    }

    fn encode(&self, _path: &str) -> Result<AttrValue, BridgeError> {
        Ok(AttrValue::String(self.clone()))
    }
}

/// Untyped elements are encoded as strings, the element type API payloads use
/// for free-form maps and lists. Decoding also accepts number and bool
/// collections, and null elements decode to [`Value::Null`].
impl Element for Value {
    fn attr_type() -> AttributeType {
        AttributeType::String
    }

    fn accepts(element_type: &AttributeType) -> bool {
        matches!(
            element_type,
            AttributeType::String | AttributeType::Number | AttributeType::Bool
        )
    }

    fn decode(value: &AttrValue, path: &str) -> Result<Self, BridgeError> {
        match value {
            AttrValue::Null(_) => Ok(Value::Null),
            AttrValue::Unknown(_) => Err(BridgeError::decode(path, "unhandled unknown value")),
            AttrValue::String(s) => Ok(Value::String(s.clone())),
            AttrValue::Number(n) => Ok(Value::Number(n.clone())),
            AttrValue::Bool(b) => Ok(Value::Bool(*b)),
            other => Err(BridgeError::decode(
                path,
                format!("expected a primitive value, got {}", describe(other)),
            )),
        }
    }

    fn encode(&self, path: &str) -> Result<AttrValue, BridgeError> {
        match self {
            Value::String(s) => Ok(AttrValue::String(s.clone())),
            Value::Null => Ok(AttrValue::Null(AttributeType::String)),
            other => Err(BridgeError::encode(
                path,
                format!("cannot represent {} as string", value_type_name(other)),
            )),
        }
    }
}

/// A native collection with a framework counterpart.
pub trait Collection: Sized + PartialEq {
    /// The framework type of the encoded collection.
    fn attr_type() -> AttributeType;

    /// Decode a framework value found at `path`.
    ///
    /// A null value decodes to an empty collection. On failure every element
    /// error is reported and no collection is returned.
    fn decode_at(value: &AttrValue, path: &str) -> Result<Self, Diagnostics>;

    /// Encode this collection as a framework value destined for `path`.
    fn encode_at(&self, path: &str) -> Result<AttrValue, Diagnostics>;

    /// A null value of the collection's framework type.
    fn null() -> AttrValue {
        AttrValue::Null(Self::attr_type())
    }
}

impl<T: Element> Collection for Vec<T> {
    fn attr_type() -> AttributeType {
        AttributeType::list(T::attr_type())
    }

    fn decode_at(value: &AttrValue, path: &str) -> Result<Self, Diagnostics> {
        let list = match value {
            AttrValue::List(list) if T::accepts(list.element_type()) => list,
            AttrValue::Null(AttributeType::List(elem)) if T::accepts(elem) => {
                return Ok(Vec::new())
            },
            other => return Err(shape_error::<Self>(other, path).into()),
        };

        let mut out = Vec::with_capacity(list.len());
        let mut diagnostics = Diagnostics::new();
        for (i, element) in list.elements().iter().enumerate() {
            match T::decode(element, &join_path(path, &i.to_string())) {
                Ok(v) => out.push(v),
                Err(e) => diagnostics.push(e),
            }
        }

        if diagnostics.is_empty() {
            Ok(out)
        } else {
            Err(diagnostics)
        }
    }

    fn encode_at(&self, path: &str) -> Result<AttrValue, Diagnostics> {
        let mut elements = Vec::with_capacity(self.len());
        let mut diagnostics = Diagnostics::new();
        for (i, element) in self.iter().enumerate() {
            match element.encode(&join_path(path, &i.to_string())) {
                Ok(v) => elements.push(v),
                Err(e) => diagnostics.push(e),
            }
        }
        if !diagnostics.is_empty() {
            return Err(diagnostics);
        }

        ListValue::new(T::attr_type(), elements)
            .map(AttrValue::List)
            .map_err(|mismatch| schema_mismatch(mismatch, path))
    }
}

impl<T: Element> Collection for HashMap<String, T> {
    fn attr_type() -> AttributeType {
        AttributeType::map(T::attr_type())
    }

    fn decode_at(value: &AttrValue, path: &str) -> Result<Self, Diagnostics> {
        let map = match value {
            AttrValue::Map(map) if T::accepts(map.element_type()) => map,
            AttrValue::Null(AttributeType::Map(elem)) if T::accepts(elem) => {
                return Ok(HashMap::new())
            },
            other => return Err(shape_error::<Self>(other, path).into()),
        };

        let mut out = HashMap::with_capacity(map.len());
        let mut diagnostics = Diagnostics::new();
        for (key, element) in map.elements() {
            match T::decode(element, &join_path(path, key)) {
                Ok(v) => {
                    out.insert(key.clone(), v);
                },
                Err(e) => diagnostics.push(e),
            }
        }

        if diagnostics.is_empty() {
            Ok(out)
        } else {
            Err(diagnostics)
        }
    }

    fn encode_at(&self, path: &str) -> Result<AttrValue, Diagnostics> {
        let mut elements = BTreeMap::new();
        let mut diagnostics = Diagnostics::new();
        for (key, element) in self {
            match element.encode(&join_path(path, key)) {
                Ok(v) => {
                    elements.insert(key.clone(), v);
                },
                Err(e) => diagnostics.push(e),
            }
        }
        if !diagnostics.is_empty() {
            return Err(diagnostics);
        }

        MapValue::new(T::attr_type(), elements)
            .map(AttrValue::Map)
            .map_err(|mismatch| schema_mismatch(mismatch, path))
    }
}

/// Decode a framework value into a native collection.
///
/// Fails with decode diagnostics if the value is unknown or its shape does not
/// match the collection. A failed decode never yields a partial collection.
pub fn decode<C: Collection>(value: &AttrValue) -> Result<C, Diagnostics> {
    C::decode_at(value, "")
}

/// Encode a native collection as a framework value.
///
/// On failure the value is a null of the collection's type and the diagnostics
/// describe every element that could not be encoded.
pub fn encode<C: Collection>(native: &C) -> (AttrValue, Diagnostics) {
    match native.encode_at("") {
        Ok(value) => (value, Diagnostics::new()),
        Err(diagnostics) => {
            warn!(
                attr_type = %C::attr_type(),
                diagnostics = diagnostics.len(),
                "Encoding native collection failed"
            );
            (C::null(), diagnostics)
        },
    }
}

/// Replace a stored value with a freshly fetched collection only if they differ.
///
/// The stored value is decoded and compared with `fresh`: lists compare element
/// by element in order, maps compare key sets and values. An equal collection
/// returns `stored` unchanged; a different one returns the encoded `fresh`.
/// Any conversion failure returns a null of the collection's type together with
/// the diagnostics, without attempting a partial merge.
#[instrument(skip_all, name = "bridge.reconcile_if_changed")]
pub fn reconcile_if_changed<C: Collection>(stored: &AttrValue, fresh: &C) -> (AttrValue, Diagnostics) {
    let current = match C::decode_at(stored, "") {
        Ok(current) => current,
        Err(diagnostics) => {
            warn!(
                attr_type = %C::attr_type(),
                diagnostics = diagnostics.len(),
                "Decoding stored value failed"
            );
            return (C::null(), diagnostics);
        },
    };

    if current == *fresh {
        trace!(attr_type = %C::attr_type(), "Stored value is current");
        return (stored.clone(), Diagnostics::new());
    }

    debug!(attr_type = %C::attr_type(), "Remote value drifted from stored value");
    encode(fresh)
}

fn shape_error<C: Collection>(value: &AttrValue, path: &str) -> BridgeError {
    let message = if value.is_unknown() {
        "unhandled unknown value".to_string()
    } else {
        format!("expected {}, got {}", C::attr_type(), describe(value))
    };
    BridgeError::decode(path, message)
}

fn schema_mismatch(mismatch: Diagnostics, path: &str) -> Diagnostics {
    mismatch
        .into_iter()
        .map(|d| {
            let at = join_path(path, d.attribute.as_deref().unwrap_or_default());
            Diagnostic::from(BridgeError::encode(at, d.detail.unwrap_or(d.summary)))
        })
        .collect()
}
