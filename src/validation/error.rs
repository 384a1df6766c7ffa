//! Validation failure report
//!
//! A failed request produces one [`Violation`] per offending field. The
//! collected list is rendered as the 422 body:
//! `{"detail": [{"type", "loc", "msg", "input", "ctx"?}, ...]}`.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Part of the request a value was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Path,
    Query,
    Body,
}

impl Location {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Body => "body",
        }
    }
}

/// One segment of a field path (`["body", "images", 0, "url"]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LocSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for LocSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<usize> for LocSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<Location> for LocSegment {
    fn from(location: Location) -> Self {
        Self::Key(location.as_str().to_string())
    }
}

/// The rule a value broke
#[derive(Debug, Clone, PartialEq)]
pub enum ViolationKind {
    Missing,
    StringType,
    StringTooShort { min_length: usize },
    StringTooLong { max_length: usize },
    IntParsing,
    IntFromFloat,
    IntType,
    FloatParsing,
    FloatType,
    BoolParsing,
    BoolType,
    GreaterThan { gt: f64 },
    GreaterThanEqual { ge: i64 },
    UrlType,
    UrlParsing { error: String },
    UrlScheme,
    ListType,
    SetType,
    ModelAttributesType,
    JsonInvalid { error: String },
}

impl ViolationKind {
    /// Machine-readable violation code
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::StringType => "string_type",
            Self::StringTooShort { .. } => "string_too_short",
            Self::StringTooLong { .. } => "string_too_long",
            Self::IntParsing => "int_parsing",
            Self::IntFromFloat => "int_from_float",
            Self::IntType => "int_type",
            Self::FloatParsing => "float_parsing",
            Self::FloatType => "float_type",
            Self::BoolParsing => "bool_parsing",
            Self::BoolType => "bool_type",
            Self::GreaterThan { .. } => "greater_than",
            Self::GreaterThanEqual { .. } => "greater_than_equal",
            Self::UrlType => "url_type",
            Self::UrlParsing { .. } => "url_parsing",
            Self::UrlScheme => "url_scheme",
            Self::ListType => "list_type",
            Self::SetType => "set_type",
            Self::ModelAttributesType => "model_attributes_type",
            Self::JsonInvalid { .. } => "json_invalid",
        }
    }

    /// Human-readable message
    pub fn message(&self) -> String {
        match self {
            Self::Missing => "Field required".to_string(),
            Self::StringType => "Input should be a valid string".to_string(),
            Self::StringTooShort { min_length } => format!(
                "String should have at least {min_length} {}",
                plural_characters(*min_length)
            ),
            Self::StringTooLong { max_length } => format!(
                "String should have at most {max_length} {}",
                plural_characters(*max_length)
            ),
            Self::IntParsing => {
                "Input should be a valid integer, unable to parse string as an integer".to_string()
            }
            Self::IntFromFloat => {
                "Input should be a valid integer, got a number with a fractional part".to_string()
            }
            Self::IntType => "Input should be a valid integer".to_string(),
            Self::FloatParsing | Self::FloatType => "Input should be a valid number".to_string(),
            Self::BoolParsing => {
                "Input should be a valid boolean, unable to interpret input".to_string()
            }
            Self::BoolType => "Input should be a valid boolean".to_string(),
            Self::GreaterThan { gt } => format!("Input should be greater than {gt}"),
            Self::GreaterThanEqual { ge } => {
                format!("Input should be greater than or equal to {ge}")
            }
            Self::UrlType => "URL input should be a string or URL".to_string(),
            Self::UrlParsing { error } => format!("Input should be a valid URL, {error}"),
            Self::UrlScheme => "URL scheme should be 'http' or 'https'".to_string(),
            Self::ListType => "Input should be a valid list".to_string(),
            Self::SetType => "Input should be a valid set".to_string(),
            Self::ModelAttributesType => {
                "Input should be a valid dictionary or object to extract fields from".to_string()
            }
            Self::JsonInvalid { .. } => "JSON decode error".to_string(),
        }
    }

    /// Constraint parameters quoted back to the caller
    pub fn context(&self) -> Option<Value> {
        match self {
            Self::StringTooShort { min_length } => Some(serde_json::json!({ "min_length": min_length })),
            Self::StringTooLong { max_length } => Some(serde_json::json!({ "max_length": max_length })),
            Self::GreaterThan { gt } => Some(serde_json::json!({ "gt": Value::from(*gt) })),
            Self::GreaterThanEqual { ge } => Some(serde_json::json!({ "ge": ge })),
            Self::UrlParsing { error } | Self::JsonInvalid { error } => {
                Some(serde_json::json!({ "error": error }))
            }
            Self::UrlScheme => Some(serde_json::json!({ "expected_schemes": "'http' or 'https'" })),
            _ => None,
        }
    }
}

const fn plural_characters(count: usize) -> &'static str {
    if count == 1 {
        "character"
    } else {
        "characters"
    }
}

/// Render a float as a JSON number, dropping the fraction when it is zero
#[allow(clippy::cast_possible_truncation)]
pub fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        Value::from(value as i64)
    } else {
        serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

/// A single field-scoped failure
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub loc: Vec<LocSegment>,
    pub input: Value,
}

impl Violation {
    pub const fn new(kind: ViolationKind, loc: Vec<LocSegment>, input: Value) -> Self {
        Self { kind, loc, input }
    }

    fn detail(&self) -> ViolationDetail<'_> {
        ViolationDetail {
            kind: self.kind.code(),
            loc: &self.loc,
            msg: self.kind.message(),
            input: &self.input,
            ctx: self.kind.context(),
        }
    }
}

#[derive(Serialize)]
struct ViolationDetail<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    loc: &'a [LocSegment],
    msg: String,
    input: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    ctx: Option<Value>,
}

/// Serializable 422 body
#[derive(Serialize)]
pub struct ValidationReport<'a> {
    detail: Vec<ViolationDetail<'a>>,
}

/// Request rejected before reaching its handler
#[derive(Debug, Clone, Error)]
#[error("request failed validation with {} violation(s)", .violations.len())]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    pub const fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn report(&self) -> ValidationReport<'_> {
        ValidationReport {
            detail: self.violations.iter().map(Violation::detail).collect(),
        }
    }
}
