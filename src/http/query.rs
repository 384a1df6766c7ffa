//! Query string decoding
//!
//! `application/x-www-form-urlencoded` pairs; the last occurrence of a
//! repeated key wins.

use std::collections::HashMap;

use url::form_urlencoded;

pub fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    query
        .map(|raw| {
            form_urlencoded::parse(raw.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_pairs() {
        let query = parse_query(Some("q=5&short=true&name=a+b%21"));
        assert_eq!(query["q"], "5");
        assert_eq!(query["short"], "true");
        assert_eq!(query["name"], "a b!");
    }

    #[test]
    fn test_last_value_wins() {
        let query = parse_query(Some("skip=1&skip=2"));
        assert_eq!(query["skip"], "2");
    }

    #[test]
    fn test_absent_and_empty_values() {
        assert!(parse_query(None).is_empty());
        let query = parse_query(Some("quantity="));
        assert_eq!(query["quantity"], "");
    }
}
