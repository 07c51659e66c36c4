use serde::{Deserialize, Serialize};

pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub key: String,
    pub label: String,
    pub color: String,
    pub icon: String,
}

impl Category {
    pub fn new(key: &str, label: &str, color: &str, icon: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            color: color.to_string(),
            icon: icon.to_string(),
        }
    }

    pub fn is_all(&self) -> bool {
        self.key.eq_ignore_ascii_case(ALL_CATEGORIES)
    }
}

/// Appends `extra` after `base`, skipping any entry whose key (compared
/// case-insensitively) is already present. The first occurrence wins.
pub fn merge_categories(base: Vec<Category>, extra: Vec<Category>) -> Vec<Category> {
    let mut merged = base;
    for category in extra {
        let duplicate = merged
            .iter()
            .any(|c| c.key.eq_ignore_ascii_case(&category.key));
        if duplicate {
            tracing::debug!("Dropping duplicate category key {}", category.key);
        } else {
            merged.push(category);
        }
    }
    merged
}
