// API type definitions module
// Request models, bound parameters and response shapes of the catalog endpoints

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Fixed text returned unless the caller asks for the short form
pub const LONG_DESCRIPTION: &str = "This is an amazing item that has a long description";

/// Item request model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_offer: Option<bool>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<Image>>,
}

/// Image nested inside an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<f64>,
}

// ============== Bound parameters ==============

#[derive(Debug, Deserialize)]
pub struct ReadItemParams {
    pub item_id: String,
    pub quantity: Option<i64>,
    pub short: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemParams {
    pub item_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub skip: i64,
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct UserItemParams {
    pub user_id: i64,
    pub item_id: String,
    pub quantity: Option<String>,
    pub short: bool,
}

// ============== Responses ==============

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Greeting {
    #[serde(rename = "Hello")]
    pub hello: &'static str,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ItemSummary {
    pub item_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ItemUpdate {
    pub item_id: i64,
    pub item: Item,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct UserItem {
    pub item_id: String,
    pub owner_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
}
