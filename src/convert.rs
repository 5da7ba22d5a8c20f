// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Type converter registry (§4.6, C6): maps a target-type tag plus a
//! captured string to a typed value. Built once at startup, consulted
//! read-only by the binder thereafter (§5).

use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};

/// A value produced by a successful conversion. The binder matches on
/// this to hand the handler invoker a concrete Rust value; the registry
/// itself never needs to know about handler signatures.
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertedValue {
    String(String),
    I32(i32),
    I64(i64),
    F64(f64),
    Bool(bool),
    DateTime(chrono::DateTime<chrono::FixedOffset>),
    Date(NaiveDate),
    Time(NaiveTime),
    Duration(Duration),
    Uuid(uuid::Uuid),
    Url(url::Url),
    Path(PathBuf),
    IpAddr(IpAddr),
    Array(Vec<ConvertedValue>),
}

/// Conversion failed for a reason specific to the target type (bad
/// int literal, malformed UUID, ...). Wrapped by the binder into
/// `ConversionFailed { parameter, source_text, target_type }` (§4.8).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionError {
    pub message: String,
    /// A "did you mean" suggestion, set only for an unregistered type
    /// tag that is close to one that is registered (§4.6).
    pub suggestion: Option<String>,
}

impl ConversionError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
        }
    }

    fn unknown_type(type_tag: &str, suggestion: Option<String>) -> Self {
        Self {
            message: format!("no converter registered for type '{type_tag}'"),
            suggestion,
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ConversionError {}

type ConvertFn = Box<dyn Fn(&str) -> Result<ConvertedValue, ConversionError> + Send + Sync>;

/// `target_type -> convert(string) -> (value | fail)` (§4.6). Lookup is
/// case-insensitive on the type tag.
pub struct ConverterRegistry {
    converters: HashMap<String, ConvertFn>,
}

impl ConverterRegistry {
    /// An empty registry with no converters at all.
    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// A registry pre-populated with every built-in type tag listed in
    /// §4.6: string, int, int64, double, bool, datetime, date, time,
    /// duration, uuid, uri, file-path, directory-path, ip.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("string", |s| Ok(ConvertedValue::String(s.to_string())));
        registry.register("int", |s| {
            s.parse::<i32>()
                .map(ConvertedValue::I32)
                .map_err(|e| ConversionError::new(format!("'{s}' is not a valid int: {e}")))
        });
        registry.register("int64", |s| {
            s.parse::<i64>()
                .map(ConvertedValue::I64)
                .map_err(|e| ConversionError::new(format!("'{s}' is not a valid int64: {e}")))
        });
        registry.register("double", |s| {
            s.parse::<f64>()
                .map(ConvertedValue::F64)
                .map_err(|e| ConversionError::new(format!("'{s}' is not a valid double: {e}")))
        });
        registry.register("bool", |s| parse_bool(s).map(ConvertedValue::Bool));
        registry.register("datetime", |s| {
            chrono::DateTime::parse_from_rfc3339(s)
                .map(ConvertedValue::DateTime)
                .map_err(|e| ConversionError::new(format!("'{s}' is not a valid ISO-8601 datetime: {e}")))
        });
        registry.register("date", |s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(ConvertedValue::Date)
                .map_err(|e| ConversionError::new(format!("'{s}' is not a valid date: {e}")))
        });
        registry.register("time", |s| {
            NaiveTime::parse_from_str(s, "%H:%M:%S")
                .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
                .map(ConvertedValue::Time)
                .map_err(|e| ConversionError::new(format!("'{s}' is not a valid time: {e}")))
        });
        registry.register("duration", |s| {
            humantime::parse_duration(s)
                .map(ConvertedValue::Duration)
                .map_err(|e| ConversionError::new(format!("'{s}' is not a valid duration: {e}")))
        });
        registry.register("uuid", |s| {
            uuid::Uuid::from_str(s)
                .map(ConvertedValue::Uuid)
                .map_err(|e| ConversionError::new(format!("'{s}' is not a valid UUID: {e}")))
        });
        registry.register("uri", |s| {
            url::Url::parse(s)
                .map(ConvertedValue::Url)
                .map_err(|e| ConversionError::new(format!("'{s}' is not a valid URI: {e}")))
        });
        registry.register("file-path", |s| Ok(ConvertedValue::Path(PathBuf::from(s))));
        registry.register("directory-path", |s| Ok(ConvertedValue::Path(PathBuf::from(s))));
        registry.register("ip", |s| {
            s.parse::<IpAddr>()
                .map(ConvertedValue::IpAddr)
                .map_err(|e| ConversionError::new(format!("'{s}' is not a valid IP address: {e}")))
        });
        registry
    }

    /// Registers (or replaces) the converter for `type_tag`. The tag is
    /// stored lowercased so lookup stays case-insensitive.
    pub fn register<F>(&mut self, type_tag: impl Into<String>, f: F)
    where
        F: Fn(&str) -> Result<ConvertedValue, ConversionError> + Send + Sync + 'static,
    {
        self.converters.insert(type_tag.into().to_lowercase(), Box::new(f));
    }

    /// Converts `text` using the converter registered for `type_tag`.
    /// Fails if the tag is unregistered, or if the registered converter
    /// rejects the text (§4.6).
    pub fn try_convert(&self, text: &str, type_tag: &str) -> Result<ConvertedValue, ConversionError> {
        match self.converters.get(&type_tag.to_lowercase()) {
            Some(f) => f(text),
            None => Err(ConversionError::unknown_type(type_tag, self.suggest_type(type_tag))),
        }
    }

    /// The registered type tag closest to `type_tag` by Jaro similarity,
    /// if any scores above the same 0.7 threshold the teacher's
    /// `filter_suggestions` uses for unknown long options (§4.6).
    pub fn suggest_type(&self, type_tag: &str) -> Option<String> {
        let needle = type_tag.to_lowercase();
        self.converters
            .keys()
            .map(|tag| (tag, strsim::jaro(&needle, tag)))
            .filter(|(_, score)| *score > 0.7)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
            .map(|(tag, _)| tag.clone())
    }

    /// Converts a captured array value: splits `text` on single spaces
    /// (the resolver joins catch-all and repeated-option tokens with a
    /// single space) and converts each element independently. An empty
    /// string yields an empty array, which is the expected shape for a
    /// catch-all that captured zero tokens (§4.6).
    pub fn try_convert_array(&self, text: &str, type_tag: &str) -> Result<ConvertedValue, ConversionError> {
        if text.is_empty() {
            return Ok(ConvertedValue::Array(Vec::new()));
        }
        let elements = text
            .split(' ')
            .map(|piece| self.try_convert(piece, type_tag))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ConvertedValue::Array(elements))
    }
}

fn parse_bool(s: &str) -> Result<bool, ConversionError> {
    match s.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        other => Err(ConversionError::new(format!("'{other}' is not a valid bool"))),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builtin_int_conversion() {
        let registry = ConverterRegistry::with_builtins();
        assert_eq!(registry.try_convert("1000", "int").unwrap(), ConvertedValue::I32(1000));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = ConverterRegistry::with_builtins();
        assert!(registry.try_convert("hello", "STRING").is_ok());
    }

    #[test]
    fn bool_accepts_yes_no_and_digits() {
        let registry = ConverterRegistry::with_builtins();
        assert_eq!(registry.try_convert("yes", "bool").unwrap(), ConvertedValue::Bool(true));
        assert_eq!(registry.try_convert("0", "bool").unwrap(), ConvertedValue::Bool(false));
        assert_eq!(registry.try_convert("TRUE", "bool").unwrap(), ConvertedValue::Bool(true));
    }

    #[test]
    fn unregistered_type_fails() {
        let registry = ConverterRegistry::with_builtins();
        assert!(registry.try_convert("x", "not-a-type").is_err());
    }

    #[test]
    fn unregistered_type_suggests_the_nearest_registered_tag() {
        let registry = ConverterRegistry::with_builtins();
        let err = registry.try_convert("x", "duraton").unwrap_err();
        assert_eq!(err.suggestion.as_deref(), Some("duration"));
    }

    #[test]
    fn wildly_unrelated_type_gets_no_suggestion() {
        let registry = ConverterRegistry::with_builtins();
        let err = registry.try_convert("x", "zzzzzzzzzz").unwrap_err();
        assert_eq!(err.suggestion, None);
    }

    #[test]
    fn rejecting_converter_fails() {
        let registry = ConverterRegistry::with_builtins();
        assert!(registry.try_convert("not-an-int", "int").is_err());
    }

    #[test]
    fn array_conversion_splits_on_single_space() {
        let registry = ConverterRegistry::with_builtins();
        let ConvertedValue::Array(values) = registry.try_convert_array("run -it ubuntu", "string").unwrap() else {
            panic!("expected an array");
        };
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn empty_array_for_empty_catch_all() {
        let registry = ConverterRegistry::with_builtins();
        assert_eq!(
            registry.try_convert_array("", "string").unwrap(),
            ConvertedValue::Array(Vec::new())
        );
    }

    #[test]
    fn custom_converter_overrides_registration() {
        let mut registry = ConverterRegistry::with_builtins();
        registry.register("upper", |s| Ok(ConvertedValue::String(s.to_uppercase())));
        assert_eq!(
            registry.try_convert("abc", "upper").unwrap(),
            ConvertedValue::String("ABC".to_string())
        );
    }
}
