//! Immuta Provider Attributes
//!
//! Conversion helpers between the typed attribute values an infrastructure
//! provider receives from its host and the plain collections returned by the
//! Immuta API, plus drift reconciliation between the two.
//!
//! # Overview
//!
//! The crate provides:
//!
//! - **Value model**: [`AttrValue`], a typed, possibly-null, possibly-unknown attribute value
//! - **Schema types**: attribute types and definitions, including plan-stable identifiers
//! - **Conversions**: generic [`decode`], [`encode`] and [`reconcile_if_changed`]
//!   for maps, lists, string lists and [`Purpose`] lists
//! - **Validation**: conformance checks with path-annotated [`Diagnostics`]
//! - **Error types**: [`BridgeError`] for decode and encode failures
//! - **Logging**: Integration with `tracing` for structured logging
//!
//! # Quick Start
//!
//! ```
//! use immuta_provider_attrs::{decode, encode, reconcile_if_changed, Purpose, PurposeList};
//!
//! // State held by the host from the previous apply.
//! let stored_purposes = vec![Purpose::new("Research", "Academic research", "I agree")];
//! let (stored, diagnostics) = encode(&stored_purposes);
//! assert!(diagnostics.is_empty());
//!
//! // The API now reports an updated acknowledgement.
//! let fresh: PurposeList = vec![Purpose::new("Research", "Academic research", "I agree to v2")];
//! let (value, diagnostics) = reconcile_if_changed(&stored, &fresh);
//! assert!(diagnostics.is_empty());
//! assert_eq!(decode::<PurposeList>(&value).unwrap(), fresh);
//! ```
//!
//! # Failure Policy
//!
//! Conversions never panic and never return partial results. A failed decode
//! returns diagnostics and no collection; a failed encode or reconcile returns
//! a null value of the collection's type together with the diagnostics.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod convert;
pub mod error;
pub mod logging;
pub mod purpose;
pub mod schema;
pub mod testing;
pub mod validation;
pub mod value;

// Re-export main types at crate root
pub use convert::{
    decode, encode, reconcile_if_changed, Collection, Element, NativeList, NativeMap,
    PurposeList, StringList,
};
pub use error::BridgeError;
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use purpose::Purpose;
pub use schema::{Attribute, AttributeType, Diagnostic, DiagnosticSeverity, Diagnostics, Schema};
pub use validation::{is_valid, validate, validate_result};
pub use value::{AttrValue, ListValue, MapValue, ObjectValue};

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
