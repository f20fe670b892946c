//! Per-cell value coercion.
//!
//! Every statistic cell lands in one of four states: a parsed integer, raw
//! text, explicitly empty (the column is reported but carries nothing), or
//! unknown (the column does not exist in this balancer version's output).
//! Keeping `Empty` and `Unknown` apart is what makes derived rates safe to
//! compute downstream.

use std::fmt;

use super::schema;
use super::SnapshotError;

/// A single coerced statistic cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Integer-typed field with a value.
    Int(i64),
    /// Textual field with a non-empty value.
    Text(String),
    /// Field present in the snapshot but reported blank.
    Empty,
    /// Field absent from this snapshot's header entirely.
    Unknown,
}

impl FieldValue {
    /// Coerce a raw cell for the named registry field.
    ///
    /// `raw` is `None` when the column is missing from the snapshot header,
    /// `Some("")` when present but blank.
    pub(crate) fn coerce(
        name: &'static str,
        raw: Option<&str>,
    ) -> Result<Self, SnapshotError> {
        match raw {
            None => Ok(Self::Unknown),
            Some("") => Ok(Self::Empty),
            Some(text) if schema::is_integer_field(name) => text
                .parse::<i64>()
                .map(Self::Int)
                .map_err(|_| SnapshotError::InvalidInteger {
                    field: name,
                    value: text.to_string(),
                }),
            Some(text) => Ok(Self::Text(text.to_string())),
        }
    }

    /// Returns the integer value, if this cell holds one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the text value, if this cell holds one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// True when the field is absent from this balancer version's schema.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// True when the cell carries a value (integer or text).
    pub fn has_value(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Text(_))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Empty => Ok(()),
            Self::Unknown => f.write_str("-"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_column_is_unknown() {
        let v = FieldValue::coerce("qcur", None).unwrap();
        assert_eq!(v, FieldValue::Unknown);
        assert!(v.is_unknown());
        assert!(!v.has_value());
    }

    #[test]
    fn test_blank_cell_is_empty_not_unknown() {
        let v = FieldValue::coerce("qcur", Some("")).unwrap();
        assert_eq!(v, FieldValue::Empty);
        assert!(!v.is_unknown());
        assert_ne!(v, FieldValue::Int(0));
    }

    #[test]
    fn test_integer_field_parses() {
        let v = FieldValue::coerce("scur", Some("42")).unwrap();
        assert_eq!(v, FieldValue::Int(42));
        assert_eq!(v.as_int(), Some(42));
    }

    #[test]
    fn test_integer_field_accepts_negative() {
        let v = FieldValue::coerce("lastsess", Some("-1")).unwrap();
        assert_eq!(v, FieldValue::Int(-1));
    }

    #[test]
    fn test_integer_field_rejects_garbage() {
        let err = FieldValue::coerce("scur", Some("fast")).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::InvalidInteger {
                field: "scur",
                ref value,
            } if value == "fast"
        ));
    }

    #[test]
    fn test_text_field_passes_verbatim() {
        let v = FieldValue::coerce("status", Some("UP")).unwrap();
        assert_eq!(v, FieldValue::Text("UP".to_string()));
        assert_eq!(v.as_text(), Some("UP"));
    }

    #[test]
    fn test_text_field_keeps_numeric_text() {
        // pxname is textual even when it looks like a number.
        let v = FieldValue::coerce("pxname", Some("8080")).unwrap();
        assert_eq!(v, FieldValue::Text("8080".to_string()));
    }

    #[test]
    fn test_unknown_displays_as_dash() {
        assert_eq!(FieldValue::Unknown.to_string(), "-");
        assert_eq!(FieldValue::Empty.to_string(), "");
        assert_eq!(FieldValue::Int(7).to_string(), "7");
        assert_eq!(FieldValue::Text("DOWN".into()).to_string(), "DOWN");
    }
}
