//! Testing utilities for attribute conversions.
//!
//! Conversions return a value together with the diagnostics collected while
//! producing it. These helpers turn that pair into a `Result` so tests can
//! assert on the outcome with `?` or `unwrap`.
//!
//! # Example
//!
//! ```
//! use immuta_provider_attrs::convert::{encode, StringList};
//! use immuta_provider_attrs::testing::{expect_failure, expect_value};
//! use serde_json::json;
//!
//! let tags: StringList = vec!["pii".into()];
//! let value = expect_value(encode(&tags)).unwrap();
//! assert_eq!(value.to_json().unwrap(), json!(["pii"]));
//!
//! let untyped = vec![json!(1)];
//! let diagnostics = expect_failure(encode(&untyped)).unwrap();
//! assert!(diagnostics.has_error());
//! ```

use crate::schema::{Diagnostic, Diagnostics};
use crate::value::AttrValue;

/// Error type for test assertions on conversion outcomes.
#[derive(Debug)]
pub enum TestError {
    /// The conversion failed with diagnostics.
    Diagnostics(Vec<Diagnostic>),
    /// A failure was expected but the conversion produced this value.
    UnexpectedSuccess(AttrValue),
    /// The conversion reported errors but did not fall back to a null value.
    NonNullOnFailure(AttrValue),
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::Diagnostics(diags) => {
                writeln!(f, "Conversion failed with {} diagnostic(s):", diags.len())?;
                for diag in diags {
                    write!(f, "  [{:?}] {}", diag.severity, diag.summary)?;
                    if let Some(detail) = &diag.detail {
                        write!(f, ": {}", detail)?;
                    }
                    if let Some(attr) = &diag.attribute {
                        write!(f, " (at {})", attr)?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            },
            TestError::UnexpectedSuccess(value) => {
                write!(f, "Expected conversion to fail, got {:?}", value)
            },
            TestError::NonNullOnFailure(value) => {
                write!(f, "Expected null value on failure, got {:?}", value)
            },
        }
    }
}

impl std::error::Error for TestError {}

/// Check diagnostics and return an error if there are any errors.
///
/// Warnings are ignored.
pub fn check_diagnostics(diagnostics: Diagnostics) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics.into_iter().filter(Diagnostic::is_error).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

/// Unwrap a successful conversion, failing on any error diagnostic.
pub fn expect_value(result: (AttrValue, Diagnostics)) -> Result<AttrValue, TestError> {
    let (value, diagnostics) = result;
    check_diagnostics(diagnostics)?;
    Ok(value)
}

/// Unwrap a failed conversion, returning its diagnostics.
///
/// Fails if the conversion reported no error, or if it reported errors
/// without falling back to a null value.
pub fn expect_failure(result: (AttrValue, Diagnostics)) -> Result<Diagnostics, TestError> {
    let (value, diagnostics) = result;
    if !diagnostics.has_error() {
        return Err(TestError::UnexpectedSuccess(value));
    }
    if !value.is_null() {
        return Err(TestError::NonNullOnFailure(value));
    }
    Ok(diagnostics)
}
