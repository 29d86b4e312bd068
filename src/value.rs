//! Typed cell values and the `office:value-type` mapping.

use crate::datatype::{Boolean, Date, DateTimeOdf, DurationOdf};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use phf::{Map, phf_map};

/// ODF cell value types, as carried by the `office:value-type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Text string
    String,
    /// Numeric value (covers ODF float, double and decimal)
    Float,
    /// Currency amount with a currency code
    Currency,
    /// Percentage
    Percentage,
    /// Boolean
    Boolean,
    /// Calendar date, optionally with a time component
    Date,
    /// Time duration
    Time,
}

/// `office:value-type` attribute values, including the aliases the ODF
/// specification allows for numbers.
static VALUE_TYPES: Map<&'static str, ValueType> = phf_map! {
    "string" => ValueType::String,
    "float" => ValueType::Float,
    "double" => ValueType::Float,
    "decimal" => ValueType::Float,
    "currency" => ValueType::Currency,
    "percentage" => ValueType::Percentage,
    "boolean" => ValueType::Boolean,
    "date" => ValueType::Date,
    "time" => ValueType::Time,
};

impl ValueType {
    /// Parse an `office:value-type` attribute value.
    pub fn from_odf(name: &str) -> Option<Self> {
        VALUE_TYPES.get(name).copied()
    }

    /// The canonical `office:value-type` attribute value.
    pub fn as_odf(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Float => "float",
            ValueType::Currency => "currency",
            ValueType::Percentage => "percentage",
            ValueType::Boolean => "boolean",
            ValueType::Date => "date",
            ValueType::Time => "time",
        }
    }
}

/// A typed spreadsheet cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Empty cell
    #[default]
    Empty,
    /// Text string
    Text(String),
    /// Numeric value
    Float(f64),
    /// Currency amount and its currency code (e.g. "EUR")
    Currency(f64, String),
    /// Percentage, stored as a fraction (0.42 displays as 42%)
    Percentage(f64),
    /// Boolean value
    Boolean(bool),
    /// Calendar date
    Date(NaiveDate),
    /// Date with time of day
    DateTime(DateTime<FixedOffset>),
    /// Time duration
    Time(Duration),
}

impl CellValue {
    /// The ODF value type of this value, or `None` for an empty cell.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(_) => Some(ValueType::String),
            CellValue::Float(_) => Some(ValueType::Float),
            CellValue::Currency(..) => Some(ValueType::Currency),
            CellValue::Percentage(_) => Some(ValueType::Percentage),
            CellValue::Boolean(_) => Some(ValueType::Boolean),
            CellValue::Date(_) | CellValue::DateTime(_) => Some(ValueType::Date),
            CellValue::Time(_) => Some(ValueType::Time),
        }
    }

    /// Check whether the value is [`CellValue::Empty`].
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// The numeric content for Float, Currency and Percentage values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(n) | CellValue::Currency(n, _) | CellValue::Percentage(n) => Some(*n),
            _ => None,
        }
    }

    /// The text content for Text values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Human-readable text for the value, as placed in the cell's `text:p`.
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Float(n) => format_number(*n),
            CellValue::Currency(n, code) => format!("{} {}", format_number(*n), code),
            CellValue::Percentage(n) => format!("{}%", format_number(n * 100.0)),
            CellValue::Boolean(b) => Boolean::encode(*b).to_string(),
            CellValue::Date(d) => Date::encode(d),
            CellValue::DateTime(dt) => DateTimeOdf::encode(dt),
            CellValue::Time(t) => DurationOdf::encode(t),
        }
    }

    /// Reconstruct a value from the parsed cell attributes and text content.
    ///
    /// Follows the lenient reading the ODF ecosystem expects: an attribute
    /// that fails to parse degrades to the cell's text content instead of
    /// failing the whole document.
    pub(crate) fn from_parts(
        value_type: Option<&str>,
        value: Option<&str>,
        currency: Option<&str>,
        text: &str,
    ) -> CellValue {
        let fallback = || {
            if text.trim().is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(text.to_string())
            }
        };

        let Some(value_type) = value_type.and_then(ValueType::from_odf) else {
            return fallback();
        };

        match value_type {
            ValueType::String => CellValue::Text(text.to_string()),
            ValueType::Float => match value.and_then(|v| v.parse().ok()) {
                Some(n) => CellValue::Float(n),
                None => fallback(),
            },
            ValueType::Currency => match value.and_then(|v| v.parse().ok()) {
                Some(n) => CellValue::Currency(n, currency.unwrap_or_default().to_string()),
                None => fallback(),
            },
            ValueType::Percentage => match value.and_then(|v| v.parse().ok()) {
                Some(n) => CellValue::Percentage(n),
                None => fallback(),
            },
            ValueType::Boolean => match value.and_then(|v| Boolean::decode(v).ok()) {
                Some(b) => CellValue::Boolean(b),
                None => fallback(),
            },
            ValueType::Date => match value {
                Some(v) if v.contains('T') => match DateTimeOdf::decode(v) {
                    Ok(dt) => CellValue::DateTime(dt),
                    Err(_) => fallback(),
                },
                Some(v) => match Date::decode(v) {
                    Ok(d) => CellValue::Date(d),
                    Err(_) => fallback(),
                },
                None => fallback(),
            },
            ValueType::Time => match value.and_then(|v| DurationOdf::decode(v).ok()) {
                Some(t) => CellValue::Time(t),
                None => fallback(),
            },
        }
    }
}

/// Format a float the way LibreOffice writes `office:value`: integral
/// values without a trailing ".0".
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        let mut buffer = itoa::Buffer::new();
        buffer.format(n as i64).to_string()
    } else {
        let mut buffer = ryu::Buffer::new();
        buffer.format(n).to_string()
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Float(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Float(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d)
    }
}
