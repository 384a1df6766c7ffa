//! Request-level schema
//!
//! A [`RequestSchema`] lists the path/query parameters and optional JSON body
//! an endpoint accepts. [`RequestSchema::validate`] evaluates all of them
//! before the handler runs and returns either typed-ready values or a
//! [`ValidationError`] naming every violation at once.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::error::{Location, ValidationError, ViolationKind};
use super::rules::{Collector, FieldRule, ObjectSchema, Presence};

/// Where a parameter is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSource {
    Path,
    Query,
}

impl ParamSource {
    pub const fn location(self) -> Location {
        match self {
            Self::Path => Location::Path,
            Self::Query => Location::Query,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParamRule {
    pub source: ParamSource,
    pub field: FieldRule,
}

impl ParamRule {
    pub const fn path(field: FieldRule) -> Self {
        Self {
            source: ParamSource::Path,
            field,
        }
    }

    pub const fn query(field: FieldRule) -> Self {
        Self {
            source: ParamSource::Query,
            field,
        }
    }
}

/// JSON body bound to a model
#[derive(Debug, Clone)]
pub struct BodyRule {
    /// Parameter name, also the envelope key
    pub name: &'static str,
    pub schema: Arc<ObjectSchema>,
    /// Accept `{"<name>": {...}}` in addition to the bare object
    pub allow_envelope: bool,
}

impl BodyRule {
    /// Strip the envelope when the body is `{"<name>": {..}}` and carries none of the model's own keys
    fn unwrap_envelope<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        if !self.allow_envelope {
            return None;
        }
        let Value::Object(map) = value else {
            return None;
        };
        match map.get(self.name) {
            Some(inner @ Value::Object(_)) if !map.keys().any(|key| self.schema.has_key(key)) => {
                Some(inner)
            }
            _ => None,
        }
    }

    fn check(&self, raw: Option<&[u8]>, out: &mut Collector) -> Option<Value> {
        out.nested(Location::Body, |out| {
            let Some(bytes) = raw.filter(|bytes| !bytes.iter().all(u8::is_ascii_whitespace)) else {
                out.push(ViolationKind::Missing, &Value::Null);
                return None;
            };

            let value: Value = match serde_json::from_slice(bytes) {
                Ok(value) => value,
                Err(e) => {
                    let input = Value::String(String::from_utf8_lossy(bytes).into_owned());
                    out.push(
                        ViolationKind::JsonInvalid {
                            error: e.to_string(),
                        },
                        &input,
                    );
                    return None;
                }
            };

            match self.unwrap_envelope(&value) {
                Some(inner) => out.nested(self.name, |out| self.schema.check_json(inner, out)),
                None => self.schema.check_json(&value, out),
            }
        })
    }
}

/// Raw, undecoded request inputs
#[derive(Debug, Default)]
pub struct RawRequest<'a> {
    pub path: Option<&'a HashMap<String, String>>,
    pub query: Option<&'a HashMap<String, String>>,
    pub body: Option<&'a [u8]>,
}

/// Inputs that passed every rule
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    params: Map<String, Value>,
    body: Option<Value>,
}

impl Validated {
    /// Bind parameters (keyed by field name, defaults applied) to a typed struct
    pub fn params<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.params.clone()))
    }

    /// Bind the normalized body to a typed model
    pub fn body<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.body.clone().unwrap_or(Value::Null))
    }
}

/// Everything an endpoint accepts
#[derive(Debug, Clone, Default)]
pub struct RequestSchema {
    pub params: Vec<ParamRule>,
    pub body: Option<BodyRule>,
}

impl RequestSchema {
    pub const fn expects_body(&self) -> bool {
        self.body.is_some()
    }

    pub fn validate(&self, raw: &RawRequest<'_>) -> Result<Validated, ValidationError> {
        let mut out = Collector::default();
        let mut params = Map::new();

        for param in &self.params {
            let source = match param.source {
                ParamSource::Path => raw.path,
                ParamSource::Query => raw.query,
            };
            let field = &param.field;
            let key = field.key();

            out.nested(param.source.location(), |out| {
                out.nested(key, |out| match (source.and_then(|s| s.get(key)), &field.presence) {
                    (None, Presence::Required) => out.push(ViolationKind::Missing, &Value::Null),
                    (None, Presence::Optional) => {}
                    (None, Presence::Default(default)) => {
                        params.insert(field.name.to_string(), default.clone());
                    }
                    (Some(text), _) => match field.kind.coerce_text(text) {
                        Ok(value) => {
                            params.insert(field.name.to_string(), value);
                        }
                        Err(kind) => out.push(kind, &Value::String(text.clone())),
                    },
                });
            });
        }

        let body = self.body.as_ref().and_then(|rule| rule.check(raw.body, &mut out));

        let violations = out.into_violations();
        if violations.is_empty() {
            Ok(Validated { params, body })
        } else {
            Err(ValidationError::new(violations))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::error::LocSegment;
    use crate::validation::{DecimalRule, FieldKind, IntRule, TextRule};
    use serde::Deserialize;
    use serde_json::json;

    fn widget_body() -> BodyRule {
        BodyRule {
            name: "widget",
            schema: Arc::new(ObjectSchema::new(
                "Widget",
                vec![
                    FieldRule::required("name", FieldKind::text(TextRule::min(1))),
                    FieldRule::required("price", FieldKind::Decimal(DecimalRule::greater_than(0.0))),
                ],
            )),
            allow_envelope: true,
        }
    }

    fn schema() -> RequestSchema {
        RequestSchema {
            params: vec![
                ParamRule::path(FieldRule::required("id", FieldKind::Integer(IntRule::default()))),
                ParamRule::query(
                    FieldRule::optional("count", FieldKind::Integer(IntRule::at_least(1))).alias("c"),
                ),
                ParamRule::query(FieldRule::with_default("short", FieldKind::Boolean, json!(false))),
            ],
            body: Some(widget_body()),
        }
    }

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Params {
        id: i64,
        count: Option<i64>,
        short: bool,
    }

    #[test]
    fn test_valid_request_binds_params_and_body() {
        let path = map(&[("id", "7")]);
        let query = map(&[("c", "3")]);
        let raw = RawRequest {
            path: Some(&path),
            query: Some(&query),
            body: Some(&br#"{"name": "w", "price": 2.5}"#[..]),
        };

        let validated = schema().validate(&raw).unwrap();
        let params: Params = validated.params().unwrap();
        assert_eq!(
            params,
            Params {
                id: 7,
                count: Some(3),
                short: false
            }
        );
        assert_eq!(
            validated.body::<Value>().unwrap(),
            json!({"name": "w", "price": 2.5})
        );
    }

    #[test]
    fn test_envelope_is_unwrapped() {
        let path = map(&[("id", "7")]);
        let raw = RawRequest {
            path: Some(&path),
            body: Some(&br#"{"widget": {"name": "w", "price": 1}}"#[..]),
            ..RawRequest::default()
        };
        let validated = schema().validate(&raw).unwrap();
        assert_eq!(validated.body::<Value>().unwrap()["name"], "w");
    }

    #[test]
    fn test_envelope_violations_include_envelope_key() {
        let path = map(&[("id", "7")]);
        let raw = RawRequest {
            path: Some(&path),
            body: Some(&br#"{"widget": {"name": "w", "price": -1}}"#[..]),
            ..RawRequest::default()
        };
        let error = schema().validate(&raw).unwrap_err();
        assert_eq!(
            error.violations()[0].loc,
            vec![
                LocSegment::from("body"),
                LocSegment::from("widget"),
                LocSegment::from("price")
            ]
        );
    }

    #[test]
    fn test_path_query_and_body_violations_reported_together() {
        let path = map(&[("id", "seven")]);
        let query = map(&[("c", "0"), ("short", "perhaps")]);
        let raw = RawRequest {
            path: Some(&path),
            query: Some(&query),
            body: Some(&br#"{"price": 0}"#[..]),
        };

        let error = schema().validate(&raw).unwrap_err();
        let summary: Vec<(&str, Vec<LocSegment>)> = error
            .violations()
            .iter()
            .map(|v| (v.kind.code(), v.loc.clone()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("int_parsing", vec!["path".into(), "id".into()]),
                ("greater_than_equal", vec!["query".into(), "c".into()]),
                ("bool_parsing", vec!["query".into(), "short".into()]),
                ("missing", vec!["body".into(), "name".into()]),
                ("greater_than", vec!["body".into(), "price".into()]),
            ]
        );
    }

    #[test]
    fn test_missing_and_malformed_body() {
        let path = map(&[("id", "1")]);
        let missing = RawRequest {
            path: Some(&path),
            ..RawRequest::default()
        };
        let error = schema().validate(&missing).unwrap_err();
        assert_eq!(error.violations()[0].kind, ViolationKind::Missing);
        assert_eq!(error.violations()[0].loc, vec![LocSegment::from("body")]);

        let malformed = RawRequest {
            path: Some(&path),
            body: Some(&b"{not json"[..]),
            ..RawRequest::default()
        };
        let error = schema().validate(&malformed).unwrap_err();
        assert_eq!(error.violations()[0].kind.code(), "json_invalid");
    }
}
