//! Per-operation argument validation.
//!
//! Walks the operation's parameter schema once. Fields the schema does not
//! name are ignored so newer callers can send extra keys.

use chrono::NaiveDate;
use core_types::{GroupBy, OperationSpec, ParamKind, ParamSpec, Tz, ValidationError, calendar};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const LIST_EXPECTED: &str = "a comma-separated string or an array of strings";
const TIMEZONE_EXPECTED: &str = "an IANA zone name such as UTC or America/New_York";

/// A single argument after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Date(NaiveDate),
    Text(String),
    List(Vec<String>),
    Integer(i64),
    /// One of the schema's allowed enum values.
    Choice(&'static str),
    Zone(Tz),
}

/// Arguments that passed validation, keyed by schema field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedArgs {
    values: BTreeMap<&'static str, ArgValue>,
}

impl ValidatedArgs {
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        match self.values.get(name) {
            Some(ArgValue::Date(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ArgValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(ArgValue::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn choice(&self, name: &str) -> Option<&'static str> {
        match self.values.get(name) {
            Some(ArgValue::Choice(c)) => Some(*c),
            _ => None,
        }
    }

    pub fn timezone(&self, name: &str) -> Option<Tz> {
        match self.values.get(name) {
            Some(ArgValue::Zone(tz)) => Some(*tz),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Validates `raw` against `spec`.
pub fn validate(spec: &OperationSpec, raw: &Map<String, Value>) -> Result<ValidatedArgs, ValidationError> {
    let mut args = ValidatedArgs::default();

    for param in spec.params {
        let value = match raw.get(param.name).filter(|v| !is_blank(v)) {
            Some(value) => parse_value(param, value)?,
            None => None,
        };
        match value {
            Some(value) => {
                args.values.insert(param.name, value);
            }
            None if param.required => return Err(ValidationError::missing(param.name)),
            None => {}
        }
    }

    // Grouping by the custom field needs to know which field that is.
    if args.choice("group_by") == Some(GroupBy::CustomField.as_str()) && !args.contains("custom_field") {
        return Err(ValidationError::missing("custom_field"));
    }

    Ok(args)
}

/// Null, empty strings and empty arrays count as "not supplied".
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Parses one present value. `Ok(None)` means it reduced to nothing (e.g. `",,"`).
fn parse_value(param: &ParamSpec, value: &Value) -> Result<Option<ArgValue>, ValidationError> {
    let parsed = match param.kind {
        ParamKind::Date => {
            let date = value
                .as_str()
                .and_then(|s| calendar::parse_date(s.trim()))
                .ok_or_else(|| ValidationError::invalid_format(param.name, "YYYY-MM-DD"))?;
            ArgValue::Date(date)
        }
        ParamKind::Enum(allowed) => {
            let choice = value
                .as_str()
                .and_then(|s| allowed.iter().copied().find(|a| *a == s))
                .ok_or_else(|| ValidationError::InvalidEnum {
                    field: param.name.to_string(),
                    allowed: allowed.to_vec(),
                })?;
            ArgValue::Choice(choice)
        }
        ParamKind::Text => match value {
            Value::String(s) => ArgValue::Text(s.trim().to_string()),
            Value::Number(n) => ArgValue::Text(n.to_string()),
            _ => return Err(ValidationError::invalid_format(param.name, "a string")),
        },
        ParamKind::List => {
            let items = parse_list(value)
                .ok_or_else(|| ValidationError::invalid_format(param.name, LIST_EXPECTED))?;
            if items.is_empty() {
                return Ok(None);
            }
            ArgValue::List(items)
        }
        ParamKind::Integer { min, max } => {
            let n = parse_integer(value)
                .ok_or_else(|| ValidationError::invalid_format(param.name, "an integer"))?;
            if n < min || n > max {
                return Err(ValidationError::OutOfRange {
                    field: param.name.to_string(),
                    value: n,
                    min,
                    max,
                });
            }
            ArgValue::Integer(n)
        }
        ParamKind::Timezone => {
            let zone = value
                .as_str()
                .and_then(|s| calendar::parse_timezone(s.trim()))
                .ok_or_else(|| ValidationError::invalid_format(param.name, TIMEZONE_EXPECTED))?;
            ArgValue::Zone(zone)
        }
    };
    Ok(Some(parsed))
}

fn parse_list(value: &Value) -> Option<Vec<String>> {
    let pieces: Vec<&str> = match value {
        Value::String(s) => s.split(',').collect(),
        Value::Array(items) => items
            .iter()
            .map(Value::as_str)
            .collect::<Option<Vec<_>>>()?,
        _ => return None,
    };
    Some(
        pieces
            .into_iter()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < 1e15).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
