// End-to-end drivers, one module per dataset family.
//
// Each driver wires the pure pieces together (readers, text analysis,
// aggregation, combine views) and owns the console output for its steps.

pub mod books;
pub mod lexicon;
pub mod lyrics;
pub mod merged;
pub mod shows;
pub mod views;
pub mod vocabulary;

use anyhow::{bail, Result};
use indexmap::IndexMap;

/// Naming used in headers, file columns and messages for one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemFamily {
    pub singular: &'static str,
    pub plural: &'static str,
}

pub const BOOKS: ItemFamily = ItemFamily {
    singular: "book",
    plural: "books",
};

pub const SHOWS: ItemFamily = ItemFamily {
    singular: "show",
    plural: "shows",
};

pub const ARTISTS: ItemFamily = ItemFamily {
    singular: "artist",
    plural: "artists",
};

pub const DATASETS: ItemFamily = ItemFamily {
    singular: "dataset",
    plural: "datasets",
};

/// Resolve `--book NAME` / `--all` style selection against a catalog.
/// `None` selects every item in file order.
pub fn select_items<V>(catalog: &IndexMap<String, V>, only: Option<&str>) -> Result<Vec<String>> {
    match only {
        None => Ok(catalog.keys().cloned().collect()),
        Some(name) if catalog.contains_key(name) => Ok(vec![name.to_string()]),
        Some(name) => {
            let available = catalog.keys().cloned().collect::<Vec<_>>().join(", ");
            bail!("'{name}' not in config.yaml. Available: {available}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> IndexMap<String, u8> {
        let mut map = IndexMap::new();
        map.insert("zeta".to_string(), 1);
        map.insert("alpha".to_string(), 2);
        map
    }

    #[test]
    fn test_select_all_keeps_file_order() {
        assert_eq!(select_items(&catalog(), None).unwrap(), vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_select_unknown_lists_available() {
        let err = select_items(&catalog(), Some("beta")).unwrap_err().to_string();
        assert!(err.contains("'beta' not in config.yaml"));
        assert!(err.contains("zeta, alpha"));
    }
}
