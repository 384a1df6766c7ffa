// Fixed in-memory catalog

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub name: String,
}

/// Read-only list of placeholder records, created at startup
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn placeholder() -> Self {
        Self::from_names(&["Foo", "Bar", "Baz"])
    }

    pub fn from_names(names: &[&str]) -> Self {
        Self {
            entries: names
                .iter()
                .map(|name| CatalogEntry {
                    name: (*name).to_string(),
                })
                .collect(),
        }
    }

    /// `entries[skip:skip + limit]` with sub-sequence semantics.
    ///
    /// Negative bounds count from the end, out-of-range bounds clamp, and an
    /// empty slice comes back whenever start >= stop. Negative input is passed
    /// through unchanged, never rejected.
    pub fn page(&self, skip: i64, limit: i64) -> &[CatalogEntry] {
        let len = i64::try_from(self.entries.len()).unwrap_or(i64::MAX);
        let start = clamp_index(skip, len);
        let stop = clamp_index(skip.saturating_add(limit), len);
        if start >= stop {
            return &[];
        }
        match (usize::try_from(start), usize::try_from(stop)) {
            (Ok(start), Ok(stop)) => &self.entries[start..stop],
            _ => &[],
        }
    }
}

const fn clamp_index(index: i64, len: i64) -> i64 {
    if index < 0 {
        let shifted = index.saturating_add(len);
        if shifted < 0 {
            0
        } else {
            shifted
        }
    } else if index > len {
        len
    } else {
        index
    }
}
