//! Per-field constraint rules
//!
//! Each declared field carries a [`FieldRule`]: its wire key, whether it may
//! be absent, and the [`FieldKind`] constraints applied to its value. Rules
//! are plain data, built once and shared read-only.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use url::Url;

use super::error::{number_value, LocSegment, Violation, ViolationKind};

const TRUE_WORDS: [&str; 6] = ["true", "1", "yes", "on", "t", "y"];
const FALSE_WORDS: [&str; 6] = ["false", "0", "no", "off", "f", "n"];

/// Length bounds for text, counted in characters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextRule {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

impl TextRule {
    pub const fn min(min_length: usize) -> Self {
        Self {
            min_length: Some(min_length),
            max_length: None,
        }
    }

    pub const fn max(max_length: usize) -> Self {
        Self {
            min_length: None,
            max_length: Some(max_length),
        }
    }

    fn check(self, text: &str) -> Result<(), ViolationKind> {
        let length = text.chars().count();
        if let Some(min_length) = self.min_length {
            if length < min_length {
                return Err(ViolationKind::StringTooShort { min_length });
            }
        }
        if let Some(max_length) = self.max_length {
            if length > max_length {
                return Err(ViolationKind::StringTooLong { max_length });
            }
        }
        Ok(())
    }
}

/// Inclusive lower bound for integers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntRule {
    pub ge: Option<i64>,
}

impl IntRule {
    pub const fn at_least(ge: i64) -> Self {
        Self { ge: Some(ge) }
    }

    fn check(self, value: i64) -> Result<(), ViolationKind> {
        match self.ge {
            Some(ge) if value < ge => Err(ViolationKind::GreaterThanEqual { ge }),
            _ => Ok(()),
        }
    }
}

/// Exclusive lower bound for decimals
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DecimalRule {
    pub gt: Option<f64>,
}

impl DecimalRule {
    pub const fn greater_than(gt: f64) -> Self {
        Self { gt: Some(gt) }
    }

    fn check(self, value: f64) -> Result<(), ViolationKind> {
        match self.gt {
            Some(gt) if value <= gt => Err(ViolationKind::GreaterThan { gt }),
            _ => Ok(()),
        }
    }
}

/// Value shape and constraints of a field
#[derive(Debug, Clone)]
pub enum FieldKind {
    Text(TextRule),
    Integer(IntRule),
    Decimal(DecimalRule),
    Boolean,
    /// Absolute `http`/`https` URL
    Url,
    /// Unique elements, emitted sorted
    Set(Box<FieldKind>),
    List(Box<FieldKind>),
    Object(Arc<ObjectSchema>),
}

/// Whether a field may be left out, and what it becomes when it is
#[derive(Debug, Clone, PartialEq)]
pub enum Presence {
    Required,
    Optional,
    Default(Value),
}

/// A declared field
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub name: &'static str,
    pub alias: Option<&'static str>,
    pub kind: FieldKind,
    pub presence: Presence,
    pub description: Option<&'static str>,
}

impl FieldRule {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self::new(name, kind, Presence::Required)
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self::new(name, kind, Presence::Optional)
    }

    pub const fn with_default(name: &'static str, kind: FieldKind, default: Value) -> Self {
        Self::new(name, kind, Presence::Default(default))
    }

    const fn new(name: &'static str, kind: FieldKind, presence: Presence) -> Self {
        Self {
            name,
            alias: None,
            kind,
            presence,
            description: None,
        }
    }

    #[must_use]
    pub fn alias(mut self, alias: &'static str) -> Self {
        self.alias = Some(alias);
        self
    }

    #[must_use]
    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// Key the field is read from on the wire
    pub fn key(&self) -> &'static str {
        self.alias.unwrap_or(self.name)
    }

    pub fn is_required(&self) -> bool {
        self.presence == Presence::Required
    }
}

/// A named group of fields (a model)
#[derive(Debug, Clone)]
pub struct ObjectSchema {
    pub name: &'static str,
    pub fields: Vec<FieldRule>,
}

impl ObjectSchema {
    pub const fn new(name: &'static str, fields: Vec<FieldRule>) -> Self {
        Self { name, fields }
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.fields.iter().any(|field| field.key() == key)
    }

    /// Validate a JSON value against every field, normalized output keyed by field name
    pub(crate) fn check_json(&self, value: &Value, out: &mut Collector) -> Option<Value> {
        let Value::Object(map) = value else {
            out.push(ViolationKind::ModelAttributesType, value);
            return None;
        };

        let before = out.len();
        let mut normalized = Map::new();

        for field in &self.fields {
            let key = field.key();
            match (map.get(key), &field.presence) {
                (None, Presence::Required) => {
                    out.nested(key, |out| out.push(ViolationKind::Missing, value));
                }
                (None | Some(Value::Null), Presence::Optional) => {}
                (None | Some(Value::Null), Presence::Default(default)) => {
                    normalized.insert(field.name.to_string(), default.clone());
                }
                (Some(raw), _) => {
                    if let Some(checked) = out.nested(key, |out| field.kind.check_json(raw, out)) {
                        normalized.insert(field.name.to_string(), checked);
                    }
                }
            }
        }

        (out.len() == before).then_some(Value::Object(normalized))
    }
}

impl FieldKind {
    pub const fn text(rule: TextRule) -> Self {
        Self::Text(rule)
    }

    pub fn set_of(inner: Self) -> Self {
        Self::Set(Box::new(inner))
    }

    pub fn list_of(inner: Self) -> Self {
        Self::List(Box::new(inner))
    }

    /// Coerce a raw path or query string
    pub fn coerce_text(&self, raw: &str) -> Result<Value, ViolationKind> {
        match self {
            Self::Text(rule) => {
                rule.check(raw)?;
                Ok(Value::String(raw.to_string()))
            }
            Self::Integer(rule) => {
                let value = raw.parse::<i64>().map_err(|_| ViolationKind::IntParsing)?;
                rule.check(value)?;
                Ok(Value::from(value))
            }
            Self::Decimal(rule) => {
                let value = parse_decimal(raw).ok_or(ViolationKind::FloatParsing)?;
                rule.check(value)?;
                Ok(number_value(value))
            }
            Self::Boolean => parse_bool(raw)
                .map(Value::Bool)
                .ok_or(ViolationKind::BoolParsing),
            Self::Url => check_url(raw).map(Value::String),
            Self::Set(_) => Err(ViolationKind::SetType),
            Self::List(_) => Err(ViolationKind::ListType),
            Self::Object(_) => Err(ViolationKind::ModelAttributesType),
        }
    }

    /// Check a JSON value, recording every violation found beneath it
    pub(crate) fn check_json(&self, value: &Value, out: &mut Collector) -> Option<Value> {
        let outcome = match self {
            Self::Text(rule) => match value {
                Value::String(text) => rule.check(text).map(|()| value.clone()),
                _ => Err(ViolationKind::StringType),
            },
            Self::Integer(rule) => json_integer(value).and_then(|number| {
                rule.check(number)?;
                Ok(Value::from(number))
            }),
            Self::Decimal(rule) => json_decimal(value).and_then(|number| {
                rule.check(number)?;
                Ok(number_value(number))
            }),
            Self::Boolean => json_bool(value).map(Value::Bool),
            Self::Url => match value {
                Value::String(text) => check_url(text).map(Value::String),
                _ => Err(ViolationKind::UrlType),
            },
            Self::Set(inner) => return check_sequence(inner, value, true, out),
            Self::List(inner) => return check_sequence(inner, value, false, out),
            Self::Object(schema) => return schema.check_json(value, out),
        };

        match outcome {
            Ok(checked) => Some(checked),
            Err(kind) => {
                out.push(kind, value);
                None
            }
        }
    }
}

fn check_sequence(
    inner: &FieldKind,
    value: &Value,
    unique: bool,
    out: &mut Collector,
) -> Option<Value> {
    let Value::Array(elements) = value else {
        let kind = if unique {
            ViolationKind::SetType
        } else {
            ViolationKind::ListType
        };
        out.push(kind, value);
        return None;
    };

    let before = out.len();
    let checked: Vec<Value> = elements
        .iter()
        .enumerate()
        .filter_map(|(index, element)| out.nested(index, |out| inner.check_json(element, out)))
        .collect();

    if out.len() != before {
        return None;
    }

    if unique {
        let distinct: BTreeMap<String, Value> = checked
            .into_iter()
            .map(|element| (sort_key(&element), element))
            .collect();
        Some(Value::Array(distinct.into_values().collect()))
    } else {
        Some(Value::Array(checked))
    }
}

fn sort_key(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Interpret the usual spellings of a boolean (case-insensitive)
pub fn parse_bool(raw: &str) -> Option<bool> {
    let lowered = raw.to_ascii_lowercase();
    if TRUE_WORDS.contains(&lowered.as_str()) {
        Some(true)
    } else if FALSE_WORDS.contains(&lowered.as_str()) {
        Some(false)
    } else {
        None
    }
}

fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

#[allow(clippy::cast_possible_truncation)]
fn json_integer(value: &Value) -> Result<i64, ViolationKind> {
    match value {
        Value::Number(number) => {
            if let Some(integer) = number.as_i64() {
                return Ok(integer);
            }
            match number.as_f64() {
                Some(float) if float.fract() != 0.0 => Err(ViolationKind::IntFromFloat),
                Some(float) if float.abs() < 9.0e18 => Ok(float as i64),
                _ => Err(ViolationKind::IntParsing),
            }
        }
        Value::String(text) => text.parse::<i64>().map_err(|_| ViolationKind::IntParsing),
        _ => Err(ViolationKind::IntType),
    }
}

fn json_decimal(value: &Value) -> Result<f64, ViolationKind> {
    match value {
        Value::Number(number) => number.as_f64().ok_or(ViolationKind::FloatParsing),
        Value::String(text) => parse_decimal(text).ok_or(ViolationKind::FloatParsing),
        _ => Err(ViolationKind::FloatType),
    }
}

fn json_bool(value: &Value) -> Result<bool, ViolationKind> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(ViolationKind::BoolParsing),
        },
        Value::String(text) => parse_bool(text).ok_or(ViolationKind::BoolParsing),
        _ => Err(ViolationKind::BoolType),
    }
}

/// Accept only absolute `http`/`https` URLs; the original text is kept
fn check_url(raw: &str) -> Result<String, ViolationKind> {
    let parsed = Url::parse(raw).map_err(|e| ViolationKind::UrlParsing {
        error: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ViolationKind::UrlScheme);
    }
    Ok(raw.to_string())
}

/// Accumulates violations while walking a request
#[derive(Debug, Default)]
pub(crate) struct Collector {
    loc: Vec<LocSegment>,
    violations: Vec<Violation>,
}

impl Collector {
    pub fn push(&mut self, kind: ViolationKind, input: &Value) {
        self.violations
            .push(Violation::new(kind, self.loc.clone(), input.clone()));
    }

    /// Run `f` with `segment` appended to the current location
    pub fn nested<T>(
        &mut self,
        segment: impl Into<LocSegment>,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        self.loc.push(segment.into());
        let result = f(self);
        self.loc.pop();
        result
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tag_schema() -> ObjectSchema {
        ObjectSchema::new(
            "Tagged",
            vec![
                FieldRule::required("name", FieldKind::text(TextRule::min(1))),
                FieldRule::required("price", FieldKind::Decimal(DecimalRule::greater_than(0.0))),
                FieldRule::optional("note", FieldKind::text(TextRule::max(5))),
                FieldRule::with_default("tags", FieldKind::set_of(FieldKind::text(TextRule::default())), json!([])),
            ],
        )
    }

    fn check(schema: &ObjectSchema, value: &Value) -> (Option<Value>, Vec<Violation>) {
        let mut out = Collector::default();
        let checked = schema.check_json(value, &mut out);
        (checked, out.into_violations())
    }

    #[test]
    fn test_text_coercion_enforces_length() {
        let kind = FieldKind::text(TextRule::min(4));
        assert_eq!(kind.coerce_text("abcd"), Ok(json!("abcd")));
        assert_eq!(
            kind.coerce_text("abc"),
            Err(ViolationKind::StringTooShort { min_length: 4 })
        );
        // multi-byte characters count once
        assert_eq!(kind.coerce_text("äöüß"), Ok(json!("äöüß")));
    }

    #[test]
    fn test_integer_coercion() {
        let kind = FieldKind::Integer(IntRule::at_least(1));
        assert_eq!(kind.coerce_text("5"), Ok(json!(5)));
        assert_eq!(
            kind.coerce_text("0"),
            Err(ViolationKind::GreaterThanEqual { ge: 1 })
        );
        assert_eq!(kind.coerce_text("five"), Err(ViolationKind::IntParsing));
        assert_eq!(
            FieldKind::Integer(IntRule::default()).coerce_text("-3"),
            Ok(json!(-3))
        );
    }

    #[test]
    fn test_boolean_words() {
        for word in ["true", "True", "1", "yes", "on", "t", "Y"] {
            assert_eq!(parse_bool(word), Some(true), "{word}");
        }
        for word in ["false", "0", "no", "OFF", "f", "n"] {
            assert_eq!(parse_bool(word), Some(false), "{word}");
        }
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(
            FieldKind::Boolean.coerce_text("maybe"),
            Err(ViolationKind::BoolParsing)
        );
    }

    #[test]
    fn test_url_rules() {
        assert_eq!(
            FieldKind::Url.coerce_text("https://example.com/a.png"),
            Ok(json!("https://example.com/a.png"))
        );
        assert_eq!(
            FieldKind::Url.coerce_text("ftp://example.com/a.png"),
            Err(ViolationKind::UrlScheme)
        );
        assert!(matches!(
            FieldKind::Url.coerce_text("not a url"),
            Err(ViolationKind::UrlParsing { .. })
        ));
    }

    #[test]
    fn test_object_applies_defaults_and_drops_absent_optionals() {
        let (checked, violations) = check(&tag_schema(), &json!({"name": "Foo", "price": 1.5}));
        assert!(violations.is_empty());
        assert_eq!(checked, Some(json!({"name": "Foo", "price": 1.5, "tags": []})));
    }

    #[test]
    fn test_object_reports_every_violation() {
        let (checked, violations) = check(
            &tag_schema(),
            &json!({"name": "", "price": 0, "note": "too long", "tags": "x"}),
        );
        assert!(checked.is_none());
        let codes: Vec<&str> = violations.iter().map(|v| v.kind.code()).collect();
        assert_eq!(
            codes,
            vec!["string_too_short", "greater_than", "string_too_long", "set_type"]
        );
        assert_eq!(violations[1].loc, vec![LocSegment::from("price")]);
    }

    #[test]
    fn test_missing_and_null_required_fields() {
        let (_, violations) = check(&tag_schema(), &json!({"name": null}));
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].kind, ViolationKind::StringType);
        assert_eq!(violations[1].kind, ViolationKind::Missing);
        assert_eq!(violations[1].loc, vec![LocSegment::from("price")]);
    }

    #[test]
    fn test_set_deduplicates_and_sorts() {
        let (checked, _) = check(
            &tag_schema(),
            &json!({"name": "Foo", "price": 2, "tags": ["b", "a", "b"]}),
        );
        assert_eq!(checked.unwrap()["tags"], json!(["a", "b"]));
    }

    #[test]
    fn test_nested_list_locations() {
        let image = Arc::new(ObjectSchema::new(
            "Image",
            vec![FieldRule::required("url", FieldKind::Url)],
        ));
        let schema = ObjectSchema::new(
            "Gallery",
            vec![FieldRule::optional("images", FieldKind::list_of(FieldKind::Object(image)))],
        );
        let (_, violations) = check(
            &schema,
            &json!({"images": [{"url": "https://ok.example"}, {"url": "nope"}]}),
        );
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].loc,
            vec![
                LocSegment::from("images"),
                LocSegment::from(1),
                LocSegment::from("url")
            ]
        );
    }

    #[test]
    fn test_json_scalars() {
        assert_eq!(json_integer(&json!(3.0)), Ok(3));
        assert_eq!(json_integer(&json!(3.5)), Err(ViolationKind::IntFromFloat));
        assert_eq!(json_integer(&json!("7")), Ok(7));
        assert_eq!(json_integer(&json!(true)), Err(ViolationKind::IntType));
        assert_eq!(json_decimal(&json!("2.5")), Ok(2.5));
        assert_eq!(json_decimal(&json!([])), Err(ViolationKind::FloatType));
        assert_eq!(json_bool(&json!(1)), Ok(true));
        assert_eq!(json_bool(&json!(null)), Err(ViolationKind::BoolType));
    }
}
