//! Path template matching
//!
//! Templates use `{name}` segments: `/users/{user_id}/items/{item_id}`.
//! A parameter matches exactly one non-empty path segment; the captured
//! value is percent-decoded.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// Parsed route template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn parse(template: &str) -> Self {
        let segments = split_path(template)
            .map(|segment| {
                segment
                    .strip_prefix('{')
                    .and_then(|rest| rest.strip_suffix('}'))
                    .map_or_else(
                        || Segment::Literal(segment.to_string()),
                        |name| Segment::Param(name.to_string()),
                    )
            })
            .collect();

        Self { segments }
    }

    /// Match a request path, returning the captured parameters
    pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let mut params = HashMap::new();
        let mut parts = split_path(path);

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(literal) => {
                    if literal != part {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if part.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), decode_segment(part));
                }
            }
        }

        if parts.next().is_some() {
            return None;
        }
        Some(params)
    }
}

fn split_path(path: &str) -> std::str::Split<'_, char> {
    path.strip_prefix('/').unwrap_or(path).split('/')
}

/// Percent-decode a path segment; invalid UTF-8 becomes U+FFFD
fn decode_segment(segment: &str) -> String {
    let bytes = urlencoding::decode_binary(segment.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_paths() {
        let root = PathTemplate::parse("/");
        assert!(root.matches("/").is_some());
        assert!(root.matches("/items").is_none());

        let items = PathTemplate::parse("/items/");
        assert!(items.matches("/items/").is_some());
        assert!(items.matches("/items").is_none());
    }

    #[test]
    fn test_param_capture() {
        let template = PathTemplate::parse("/users/{user_id}/items/{item_id}");
        let params = template.matches("/users/42/items/abcd").unwrap();
        assert_eq!(params["user_id"], "42");
        assert_eq!(params["item_id"], "abcd");
    }

    #[test]
    fn test_param_requires_non_empty_segment() {
        let template = PathTemplate::parse("/items/{item_id}");
        assert!(template.matches("/items/").is_none());
        assert!(template.matches("/items/abcd/extra").is_none());
    }

    #[test]
    fn test_param_is_percent_decoded() {
        let template = PathTemplate::parse("/items/{item_id}");
        let params = template.matches("/items/a%20b+c").unwrap();
        assert_eq!(params["item_id"], "a b+c");
    }

    #[test]
    fn test_invalid_utf8_is_replaced_not_kept_raw() {
        let template = PathTemplate::parse("/items/{item_id}");
        let params = template.matches("/items/%FF%FF").unwrap();
        assert_eq!(params["item_id"], "\u{FFFD}\u{FFFD}");
        assert_eq!(params["item_id"].chars().count(), 2);
    }
}
