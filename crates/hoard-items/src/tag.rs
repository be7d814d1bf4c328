//! Tag registry
//!
//! Items carry tag names; the registry supplies the priority used when sorting
//! inventories and a display name for tools.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Registered information about a tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagInfo {
    pub name: String,
    pub priority: i32,
    pub display_name: String,
}

/// Lookup table from tag name to [`TagInfo`]
#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    tags: HashMap<String, TagInfo>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a tag
    pub fn register(&mut self, name: impl Into<String>, priority: i32, display_name: impl Into<String>) {
        let name = name.into();
        self.tags.insert(
            name.clone(),
            TagInfo {
                name,
                priority,
                display_name: display_name.into(),
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&TagInfo> {
        self.tags.get(name)
    }

    /// Sort priority of a tag. Unregistered tags sort at priority 0.
    pub fn priority(&self, name: &str) -> i32 {
        self.tags.get(name).map_or(0, |t| t.priority)
    }

    /// Display name of a tag, falling back to the raw name
    pub fn display_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.tags
            .get(name)
            .map_or(name, |t| t.display_name.as_str())
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
