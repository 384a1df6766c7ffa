// OpenAPI document generation
// Derived from the same endpoint schemas that validate requests

use serde_json::{json, Map, Value};

use super::schema::EndpointSchema;
use crate::validation::{
    number_value, BodyRule, FieldKind, FieldRule, ObjectSchema, ParamRule, ParamSource, Presence,
};

const SCHEMA_REF: &str = "#/components/schemas/";

/// Build the OpenAPI 3.1 document for a set of endpoints
pub fn build_document(endpoints: &[EndpointSchema]) -> Value {
    let mut components = Map::new();
    let mut paths = Map::new();

    for endpoint in endpoints {
        let operation = operation_object(endpoint, &mut components);
        let methods = paths
            .entry(endpoint.path.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(methods) = methods {
            methods.insert(endpoint.method.as_str().to_ascii_lowercase(), operation);
        }
    }

    components.insert("ValidationError".to_string(), validation_error_schema());
    components.insert(
        "HTTPValidationError".to_string(),
        json!({
            "type": "object",
            "title": "HTTPValidationError",
            "properties": {
                "detail": {
                    "type": "array",
                    "title": "Detail",
                    "items": { "$ref": format!("{SCHEMA_REF}ValidationError") }
                }
            }
        }),
    );

    json!({
        "openapi": "3.1.0",
        "info": {
            "title": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION")
        },
        "paths": paths,
        "components": { "schemas": components }
    })
}

fn operation_object(endpoint: &EndpointSchema, components: &mut Map<String, Value>) -> Value {
    let mut operation = json!({
        "summary": endpoint.summary,
        "operationId": endpoint.operation.operation_id(),
        "responses": {
            "200": {
                "description": "Successful Response",
                "content": { "application/json": { "schema": {} } }
            }
        }
    });

    let request = &endpoint.request;
    if !request.params.is_empty() {
        operation["parameters"] = request
            .params
            .iter()
            .map(|param| parameter_object(param, components))
            .collect();
    }
    if let Some(body) = &request.body {
        operation["requestBody"] = json!({
            "required": true,
            "content": { "application/json": { "schema": body_schema(body, components) } }
        });
    }
    if !request.params.is_empty() || request.body.is_some() {
        operation["responses"]["422"] = json!({
            "description": "Validation Error",
            "content": {
                "application/json": {
                    "schema": { "$ref": format!("{SCHEMA_REF}HTTPValidationError") }
                }
            }
        });
    }
    operation
}

fn parameter_object(param: &ParamRule, components: &mut Map<String, Value>) -> Value {
    let field = &param.field;
    let mut parameter = json!({
        "name": field.key(),
        "in": param.source.location().as_str(),
        "required": param.source == ParamSource::Path || field.is_required(),
        "schema": field_schema(field, components),
    });
    if let Some(description) = field.description {
        parameter["description"] = Value::from(description);
    }
    parameter
}

fn body_schema(body: &BodyRule, components: &mut Map<String, Value>) -> Value {
    let model = object_ref(&body.schema, components);
    if !body.allow_envelope {
        return model;
    }
    json!({
        "anyOf": [
            model,
            {
                "type": "object",
                "properties": { (body.name): model },
                "required": [body.name]
            }
        ]
    })
}

fn field_schema(field: &FieldRule, components: &mut Map<String, Value>) -> Value {
    let mut schema = kind_schema(&field.kind, components);
    if let Value::Object(map) = &mut schema {
        if !map.contains_key("$ref") {
            map.insert("title".to_string(), Value::from(title_case(field.name)));
        }
        if let Presence::Default(default) = &field.presence {
            map.insert("default".to_string(), default.clone());
        }
        if let Some(description) = field.description {
            map.insert("description".to_string(), Value::from(description));
        }
    }
    schema
}

fn kind_schema(kind: &FieldKind, components: &mut Map<String, Value>) -> Value {
    match kind {
        FieldKind::Text(rule) => {
            let mut schema = json!({ "type": "string" });
            if let Some(min_length) = rule.min_length {
                schema["minLength"] = Value::from(min_length);
            }
            if let Some(max_length) = rule.max_length {
                schema["maxLength"] = Value::from(max_length);
            }
            schema
        }
        FieldKind::Integer(rule) => {
            let mut schema = json!({ "type": "integer" });
            if let Some(ge) = rule.ge {
                schema["minimum"] = Value::from(ge);
            }
            schema
        }
        FieldKind::Decimal(rule) => {
            let mut schema = json!({ "type": "number" });
            if let Some(gt) = rule.gt {
                schema["exclusiveMinimum"] = number_value(gt);
            }
            schema
        }
        FieldKind::Boolean => json!({ "type": "boolean" }),
        FieldKind::Url => json!({ "type": "string", "format": "uri", "minLength": 1 }),
        FieldKind::Set(inner) => json!({
            "type": "array",
            "items": kind_schema(inner, components),
            "uniqueItems": true
        }),
        FieldKind::List(inner) => json!({
            "type": "array",
            "items": kind_schema(inner, components)
        }),
        FieldKind::Object(schema) => object_ref(schema, components),
    }
}

/// Register a model under `components.schemas` and return a reference to it
fn object_ref(schema: &ObjectSchema, components: &mut Map<String, Value>) -> Value {
    if !components.contains_key(schema.name) {
        let mut properties = Map::new();
        for field in &schema.fields {
            properties.insert(field.key().to_string(), field_schema(field, components));
        }
        let required: Vec<&str> = schema
            .fields
            .iter()
            .filter(|field| field.is_required())
            .map(FieldRule::key)
            .collect();

        components.insert(
            schema.name.to_string(),
            json!({
                "type": "object",
                "title": schema.name,
                "properties": properties,
                "required": required
            }),
        );
    }
    json!({ "$ref": format!("{SCHEMA_REF}{}", schema.name) })
}

fn validation_error_schema() -> Value {
    json!({
        "type": "object",
        "title": "ValidationError",
        "properties": {
            "loc": {
                "type": "array",
                "title": "Location",
                "items": { "anyOf": [{ "type": "string" }, { "type": "integer" }] }
            },
            "msg": { "type": "string", "title": "Message" },
            "type": { "type": "string", "title": "Error Type" },
            "input": { "title": "Input" },
            "ctx": { "type": "object", "title": "Context" }
        },
        "required": ["loc", "msg", "type"]
    })
}

/// `item_id` -> `Item Id`
fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::schema::endpoints;

    #[test]
    fn test_paths_and_methods() {
        let document = build_document(&endpoints());
        let paths = document["paths"].as_object().unwrap();
        assert_eq!(paths.len(), 4);
        assert!(paths["/items/{item_id}"].get("get").is_some());
        assert!(paths["/items/{item_id}"].get("put").is_some());
        assert_eq!(paths["/"]["get"]["operationId"], "read_root");
        // no inputs, so no 422
        assert!(paths["/"]["get"]["responses"].get("422").is_none());
    }

    #[test]
    fn test_parameter_constraints() {
        let document = build_document(&endpoints());
        let parameters = document["paths"]["/items/{item_id}"]["get"]["parameters"]
            .as_array()
            .unwrap();

        assert_eq!(parameters[0]["name"], "item_id");
        assert_eq!(parameters[0]["in"], "path");
        assert_eq!(parameters[0]["required"], true);
        assert_eq!(parameters[0]["schema"]["minLength"], 4);

        assert_eq!(parameters[1]["name"], "q");
        assert_eq!(parameters[1]["required"], false);
        assert_eq!(parameters[1]["schema"]["minimum"], 1);

        assert_eq!(parameters[2]["schema"]["default"], false);
    }

    #[test]
    fn test_models_registered_once() {
        let document = build_document(&endpoints());
        let schemas = &document["components"]["schemas"];
        assert_eq!(schemas["Item"]["required"], json!(["name", "price"]));
        assert_eq!(schemas["Item"]["properties"]["price"]["exclusiveMinimum"], 0);
        assert_eq!(
            schemas["Item"]["properties"]["images"]["items"]["$ref"],
            "#/components/schemas/Image"
        );
        assert_eq!(schemas["Image"]["properties"]["url"]["format"], "uri");
        assert_eq!(
            schemas["Item"]["properties"]["tags"]["uniqueItems"],
            true
        );
        assert!(schemas.get("HTTPValidationError").is_some());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("item_id"), "Item Id");
        assert_eq!(title_case("short"), "Short");
    }
}
