use std::cmp::Ordering;
use std::fmt;

/// A single typed cell of a delimited table.
///
/// Cells are typed on read: an empty field is [`Value::Null`], anything that
/// parses as an integer or a finite float becomes numeric, everything else is
/// kept verbatim as text.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Missing value
    #[default]
    Null,
    /// Integer value
    Integer(i64),
    /// Floating point value
    Real(f64),
    /// Free text
    Text(String),
}

impl Value {
    /// Infer the type of a raw field.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Integer(i);
        }
        match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() => Value::Real(f),
            // pandas-style NaN markers are missing values, not text
            Ok(f) if f.is_nan() => Value::Null,
            _ => Value::Text(raw.to_string()),
        }
    }

    /// Keep a raw field as text (used for key columns), mapping empty to null.
    pub fn text(raw: &str) -> Self {
        if raw.is_empty() {
            Value::Null
        } else {
            Value::Text(raw.to_string())
        }
    }

    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the cell. Text and null have no numeric value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(f) => Some(*f),
            Value::Null | Value::Text(_) => None,
        }
    }

    /// Borrow the text of a [`Value::Text`] cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Ascending comparison used for `ORDER BY`: numbers first in numeric
    /// order, then everything without a numeric value.
    pub fn cmp_numeric_nulls_last(&self, other: &Value) -> Ordering {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Option<String>> for Value {
    fn from(value: Option<String>) -> Self {
        value.map(Value::Text).unwrap_or_default()
    }
}

impl From<Option<f64>> for Value {
    fn from(value: Option<f64>) -> Self {
        value.map(Value::Real).unwrap_or_default()
    }
}
