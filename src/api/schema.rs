// Endpoint schemas
// Built once at startup; drive both request validation and the OpenAPI document

use std::sync::Arc;

use hyper::Method;
use serde_json::json;

use crate::validation::{
    BodyRule, DecimalRule, FieldKind, FieldRule, IntRule, ObjectSchema, ParamRule, RequestSchema,
    TextRule,
};

/// Longest accepted item or image description
pub const MAX_DESCRIPTION_LENGTH: usize = 300;

/// The operations the catalog service exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ReadRoot,
    ReadItem,
    UpdateItem,
    ReadItems,
    ReadUserItem,
}

impl Operation {
    pub const fn operation_id(self) -> &'static str {
        match self {
            Self::ReadRoot => "read_root",
            Self::ReadItem => "read_item",
            Self::UpdateItem => "update_item",
            Self::ReadItems => "read_items",
            Self::ReadUserItem => "read_user_item",
        }
    }
}

/// Route, documentation and request rules of one endpoint
#[derive(Debug, Clone)]
pub struct EndpointSchema {
    pub operation: Operation,
    pub method: Method,
    pub path: &'static str,
    pub summary: &'static str,
    pub request: RequestSchema,
}

pub fn image_schema() -> ObjectSchema {
    ObjectSchema::new(
        "Image",
        vec![
            FieldRule::required("url", FieldKind::Url),
            FieldRule::required("name", FieldKind::text(TextRule::default())),
            FieldRule::required("price", FieldKind::Decimal(DecimalRule::greater_than(0.0))),
            FieldRule::optional(
                "description",
                FieldKind::text(TextRule::max(MAX_DESCRIPTION_LENGTH)),
            ),
            FieldRule::optional("tax", FieldKind::Decimal(DecimalRule::default())),
        ],
    )
}

pub fn item_schema(image: Arc<ObjectSchema>) -> ObjectSchema {
    ObjectSchema::new(
        "Item",
        vec![
            FieldRule::required("name", FieldKind::text(TextRule::min(1))),
            FieldRule::required("price", FieldKind::Decimal(DecimalRule::greater_than(0.0)))
                .describe("The price must be greater than zero"),
            FieldRule::optional(
                "description",
                FieldKind::text(TextRule::max(MAX_DESCRIPTION_LENGTH)),
            )
            .describe("The description of the item"),
            FieldRule::optional("tax", FieldKind::Decimal(DecimalRule::default())),
            FieldRule::optional("is_offer", FieldKind::Boolean),
            FieldRule::with_default(
                "tags",
                FieldKind::set_of(FieldKind::text(TextRule::default())),
                json!([]),
            ),
            FieldRule::optional("images", FieldKind::list_of(FieldKind::Object(image))),
        ],
    )
}

fn short_flag() -> ParamRule {
    ParamRule::query(FieldRule::with_default("short", FieldKind::Boolean, json!(false)))
}

/// All endpoint schemas, in routing order
pub fn endpoints() -> Vec<EndpointSchema> {
    let item = Arc::new(item_schema(Arc::new(image_schema())));

    vec![
        EndpointSchema {
            operation: Operation::ReadRoot,
            method: Method::GET,
            path: "/",
            summary: "Read Root",
            request: RequestSchema::default(),
        },
        EndpointSchema {
            operation: Operation::ReadItem,
            method: Method::GET,
            path: "/items/{item_id}",
            summary: "Read Item",
            request: RequestSchema {
                params: vec![
                    ParamRule::path(
                        FieldRule::required("item_id", FieldKind::text(TextRule::min(4)))
                            .describe("item id"),
                    ),
                    ParamRule::query(
                        FieldRule::optional("quantity", FieldKind::Integer(IntRule::at_least(1)))
                            .alias("q")
                            .describe("must greater than equal 1"),
                    ),
                    short_flag(),
                ],
                body: None,
            },
        },
        EndpointSchema {
            operation: Operation::UpdateItem,
            method: Method::PUT,
            path: "/items/{item_id}",
            summary: "Update Item",
            request: RequestSchema {
                params: vec![ParamRule::path(FieldRule::required(
                    "item_id",
                    FieldKind::Integer(IntRule::default()),
                ))],
                body: Some(BodyRule {
                    name: "item",
                    schema: item,
                    allow_envelope: true,
                }),
            },
        },
        EndpointSchema {
            operation: Operation::ReadItems,
            method: Method::GET,
            path: "/items/",
            summary: "Read Items",
            request: RequestSchema {
                params: vec![
                    ParamRule::query(FieldRule::with_default(
                        "skip",
                        FieldKind::Integer(IntRule::default()),
                        json!(0),
                    )),
                    ParamRule::query(FieldRule::with_default(
                        "limit",
                        FieldKind::Integer(IntRule::default()),
                        json!(10),
                    )),
                ],
                body: None,
            },
        },
        EndpointSchema {
            operation: Operation::ReadUserItem,
            method: Method::GET,
            path: "/users/{user_id}/items/{item_id}",
            summary: "Read User Item",
            request: RequestSchema {
                params: vec![
                    ParamRule::path(FieldRule::required(
                        "user_id",
                        FieldKind::Integer(IntRule::default()),
                    )),
                    ParamRule::path(FieldRule::required(
                        "item_id",
                        FieldKind::text(TextRule::default()),
                    )),
                    ParamRule::query(FieldRule::optional(
                        "quantity",
                        FieldKind::text(TextRule::default()),
                    )),
                    short_flag(),
                ],
                body: None,
            },
        },
    ]
}
