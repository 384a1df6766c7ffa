// Catalog endpoint handlers
// Pure functions of already-validated input; none of them can fail

use super::catalog::{Catalog, CatalogEntry};
use super::types::{
    Greeting, Item, ItemSummary, ItemUpdate, PageParams, ReadItemParams, UpdateItemParams,
    UserItem, UserItemParams, LONG_DESCRIPTION,
};

/// GET /
pub const fn read_root() -> Greeting {
    Greeting { hello: "World" }
}

/// GET /items/{item_id}
pub fn read_item(params: ReadItemParams) -> ItemSummary {
    ItemSummary {
        item_id: params.item_id,
        q: params.quantity.filter(|quantity| *quantity != 0),
        description: long_description(params.short),
    }
}

/// PUT /items/{item_id}
pub fn update_item(params: UpdateItemParams, item: Item) -> ItemUpdate {
    ItemUpdate {
        item_id: params.item_id,
        item,
    }
}

/// GET /items/
pub fn read_items<'a>(params: &PageParams, catalog: &'a Catalog) -> &'a [CatalogEntry] {
    catalog.page(params.skip, params.limit)
}

/// GET /users/{user_id}/items/{item_id}
pub fn read_user_item(params: UserItemParams) -> UserItem {
    UserItem {
        item_id: params.item_id,
        owner_id: params.user_id,
        quantity: params.quantity.filter(|quantity| !quantity.is_empty()),
        description: long_description(params.short),
    }
}

const fn long_description(short: bool) -> Option<&'static str> {
    if short {
        None
    } else {
        Some(LONG_DESCRIPTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_read_item_long_and_short() {
        let long = read_item(ReadItemParams {
            item_id: "abcd".to_string(),
            quantity: Some(5),
            short: false,
        });
        assert_eq!(long.q, Some(5));
        assert_eq!(long.description, Some(LONG_DESCRIPTION));

        let short = read_item(ReadItemParams {
            item_id: "abcd".to_string(),
            quantity: None,
            short: true,
        });
        assert_eq!(short.q, None);
        assert_eq!(short.description, None);
    }

    #[test]
    fn test_read_item_serialization_order() {
        let summary = read_item(ReadItemParams {
            item_id: "abcd".to_string(),
            quantity: Some(5),
            short: false,
        });
        assert_eq!(
            serde_json::to_string(&summary).unwrap(),
            r#"{"item_id":"abcd","q":5,"description":"This is an amazing item that has a long description"}"#
        );
    }

    #[test]
    fn test_update_item_echoes_item() {
        let item = Item {
            name: "Foo".to_string(),
            price: 35.4,
            description: None,
            tax: Some(3.2),
            is_offer: None,
            tags: BTreeSet::from(["rock".to_string()]),
            images: None,
        };
        let update = update_item(UpdateItemParams { item_id: 5 }, item.clone());
        assert_eq!(update.item_id, 5);
        assert_eq!(update.item, item);
    }

    #[test]
    fn test_read_user_item_skips_empty_quantity() {
        let user_item = read_user_item(UserItemParams {
            user_id: 3,
            item_id: "x".to_string(),
            quantity: Some(String::new()),
            short: true,
        });
        assert_eq!(
            user_item,
            UserItem {
                item_id: "x".to_string(),
                owner_id: 3,
                quantity: None,
                description: None,
            }
        );

        let with_quantity = read_user_item(UserItemParams {
            user_id: 3,
            item_id: "x".to_string(),
            quantity: Some("lots".to_string()),
            short: false,
        });
        assert_eq!(with_quantity.quantity.as_deref(), Some("lots"));
        assert_eq!(with_quantity.description, Some(LONG_DESCRIPTION));
    }

    #[test]
    fn test_read_items_uses_catalog_window() {
        let catalog = Catalog::placeholder();
        let page = read_items(&PageParams { skip: 1, limit: 1 }, &catalog);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "Bar");
    }
}
