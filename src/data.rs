use std::fmt;
use std::hash::{Hash, Hasher};

use anyhow::{Context, Result, anyhow, bail};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Target type for a configured column correction.
///
/// Deserialization accepts the common spellings seen in cleaning configs
/// (`int`, `float64`, `str`, `object`, `bool`, `timestamp`, ...); the
/// canonical names are the lowercase variant names.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[serde(alias = "str", alias = "text", alias = "object")]
    String,
    #[serde(alias = "int", alias = "int64")]
    Integer,
    #[serde(alias = "float64", alias = "double", alias = "number")]
    Float,
    #[serde(alias = "bool")]
    Boolean,
    Date,
    #[serde(alias = "timestamp")]
    DateTime,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::String => "string",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::String(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            // Normalize -0.0 so hashing stays consistent with equality.
            Value::Float(f) => {
                let bits = if *f == 0.0 { 0u64 } else { f.to_bits() };
                bits.hash(state);
            }
            Value::Boolean(b) => b.hash(state),
            Value::Date(d) => d.hash(state),
            Value::DateTime(dt) => dt.hash(state),
        }
    }
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => {
                if f.fract() == 0.0 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            Value::Boolean(b) => b.to_string(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::String(_) => ColumnType::String,
            Value::Integer(_) => ColumnType::Integer,
            Value::Float(_) => ColumnType::Float,
            Value::Boolean(_) => ColumnType::Boolean,
            Value::Date(_) => ColumnType::Date,
            Value::DateTime(_) => ColumnType::DateTime,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

pub fn parse_naive_date(value: &str) -> Result<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as date"))
}

pub fn parse_naive_datetime(value: &str) -> Result<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as datetime"))
}

/// Parses a raw string field into a typed value. Empty input is a missing
/// value, not a parse failure.
pub fn parse_typed_value(value: &str, ty: &ColumnType) -> Result<Option<Value>> {
    if value.is_empty() {
        return Ok(None);
    }
    let parsed = match ty {
        ColumnType::String => Value::String(value.to_string()),
        ColumnType::Integer => {
            let parsed: i64 = value
                .parse()
                .with_context(|| format!("Failed to parse '{value}' as integer"))?;
            Value::Integer(parsed)
        }
        ColumnType::Float => {
            let parsed: f64 = value
                .parse()
                .with_context(|| format!("Failed to parse '{value}' as float"))?;
            Value::Float(parsed)
        }
        ColumnType::Boolean => {
            let lowered = value.to_ascii_lowercase();
            let parsed = match lowered.as_str() {
                "true" | "t" | "yes" | "y" | "1" => true,
                "false" | "f" | "no" | "n" | "0" => false,
                _ => bail!("Failed to parse '{value}' as boolean"),
            };
            Value::Boolean(parsed)
        }
        ColumnType::Date => Value::Date(parse_naive_date(value)?),
        ColumnType::DateTime => Value::DateTime(parse_naive_datetime(value)?),
    };
    Ok(Some(parsed))
}

/// Converts an already-typed value to the target type. Lossy conversions
/// (fractional float to integer, out-of-range booleans) are errors; the
/// caller decides whether to keep or discard the result.
pub fn convert_value(value: &Value, target: &ColumnType) -> Result<Value> {
    match (value, target) {
        (value, ColumnType::String) => Ok(Value::String(value.as_display())),
        (Value::String(raw), target) => parse_typed_value(raw, target)?
            .ok_or_else(|| anyhow!("Cannot convert an empty value to {target}")),
        (Value::Integer(i), ColumnType::Integer) => Ok(Value::Integer(*i)),
        (Value::Integer(i), ColumnType::Float) => Ok(Value::Float(*i as f64)),
        (Value::Integer(i), ColumnType::Boolean) => match i {
            0 => Ok(Value::Boolean(false)),
            1 => Ok(Value::Boolean(true)),
            other => bail!("Cannot convert integer {other} to boolean"),
        },
        (Value::Float(f), ColumnType::Float) => Ok(Value::Float(*f)),
        (Value::Float(f), ColumnType::Integer) => {
            if f.fract() == 0.0 {
                Ok(Value::Integer(*f as i64))
            } else {
                bail!("Cannot convert {f} to integer without losing precision")
            }
        }
        (Value::Boolean(b), ColumnType::Boolean) => Ok(Value::Boolean(*b)),
        (Value::Boolean(b), ColumnType::Integer) => Ok(Value::Integer(i64::from(*b))),
        (Value::Date(d), ColumnType::Date) => Ok(Value::Date(*d)),
        (Value::Date(d), ColumnType::DateTime) => {
            let midnight = d
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| anyhow!("Cannot extend {d} to a datetime"))?;
            Ok(Value::DateTime(midnight))
        }
        (Value::DateTime(dt), ColumnType::DateTime) => Ok(Value::DateTime(*dt)),
        (Value::DateTime(dt), ColumnType::Date) => Ok(Value::Date(dt.date())),
        (value, target) => bail!("Cannot convert {} value to {target}", value.column_type()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parse_naive_date_supports_multiple_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        assert_eq!(parse_naive_date("2024-05-06").unwrap(), expected);
        assert_eq!(parse_naive_date("06/05/2024").unwrap(), expected);
        assert_eq!(parse_naive_date("2024/05/06").unwrap(), expected);
    }

    #[test]
    fn parse_typed_value_handles_empty_and_boolean_inputs() {
        assert_eq!(parse_typed_value("", &ColumnType::Integer).unwrap(), None);

        let truthy = parse_typed_value("Yes", &ColumnType::Boolean)
            .unwrap()
            .unwrap();
        assert_eq!(truthy, Value::Boolean(true));

        let falsy = parse_typed_value("0", &ColumnType::Boolean)
            .unwrap()
            .unwrap();
        assert_eq!(falsy, Value::Boolean(false));

        assert!(parse_typed_value("maybe", &ColumnType::Boolean).is_err());
    }

    #[test]
    fn convert_value_parses_strings_into_target_types() {
        let age = convert_value(&Value::String("25".into()), &ColumnType::Integer).unwrap();
        assert_eq!(age, Value::Integer(25));

        let ratio = convert_value(&Value::String("0.5".into()), &ColumnType::Float).unwrap();
        assert_eq!(ratio, Value::Float(0.5));

        assert!(convert_value(&Value::String("abc".into()), &ColumnType::Integer).is_err());
    }

    #[test]
    fn convert_value_rejects_lossy_numeric_casts() {
        let whole = convert_value(&Value::Float(42.0), &ColumnType::Integer).unwrap();
        assert_eq!(whole, Value::Integer(42));

        assert!(convert_value(&Value::Float(42.5), &ColumnType::Integer).is_err());
    }

    #[test]
    fn convert_value_renders_any_value_as_string() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        let rendered = convert_value(&Value::Date(date), &ColumnType::String).unwrap();
        assert_eq!(rendered, Value::String("2024-05-06".into()));
    }

    #[test]
    fn column_type_deserializes_common_aliases() {
        let ty: ColumnType = serde_json::from_str("\"int\"").unwrap();
        assert_eq!(ty, ColumnType::Integer);
        let ty: ColumnType = serde_json::from_str("\"object\"").unwrap();
        assert_eq!(ty, ColumnType::String);
        let ty: ColumnType = serde_json::from_str("\"float64\"").unwrap();
        assert_eq!(ty, ColumnType::Float);
        assert!(serde_json::from_str::<ColumnType>("\"category\"").is_err());
    }
}
