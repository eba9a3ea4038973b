//! Category color theme, persisted as `categoryColors.json`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Category;
use crate::error::{Error, Result};

/// Used for tasks without a category or with an unmapped one
pub const FALLBACK_COLOR: &str = "#9ca3af";

const DEFAULT_COLORS: [(Category, &str); 5] = [
    (Category::Strategy, "#6366f1"),
    (Category::Identity, "#ec4899"),
    (Category::Digital, "#0ea5e9"),
    (Category::Content, "#f59e0b"),
    (Category::Launch, "#10b981"),
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CategoryColors {
    colors: BTreeMap<String, String>,
}

impl Default for CategoryColors {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLORS
                .iter()
                .map(|(category, color)| (category.to_string(), color.to_string()))
                .collect(),
        }
    }
}

impl CategoryColors {
    pub fn color_for(&self, category: Option<Category>) -> &str {
        category
            .and_then(|category| self.colors.get(category.as_str()))
            .map(String::as_str)
            .unwrap_or(FALLBACK_COLOR)
    }

    pub fn set(&mut self, category: Category, value: &str) -> Result<String> {
        let normalized = normalize_hex(value).ok_or_else(|| Error::InvalidColor {
            category: category.to_string(),
            value: value.to_string(),
        })?;
        self.colors.insert(category.to_string(), normalized.clone());
        Ok(normalized)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.colors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn normalize_hex(value: &str) -> Option<String> {
    let digits = value.trim().strip_prefix('#')?;
    if digits.len() != 6 || !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("#{}", digits.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_category() {
        let colors = CategoryColors::default();
        for category in Category::ALL {
            assert_ne!(colors.color_for(Some(category)), FALLBACK_COLOR);
        }
        assert_eq!(colors.color_for(None), FALLBACK_COLOR);
    }

    #[test]
    fn set_normalizes_and_validates() {
        let mut colors = CategoryColors::default();
        assert_eq!(colors.set(Category::Launch, "#ABCDEF").unwrap(), "#abcdef");
        assert_eq!(colors.color_for(Some(Category::Launch)), "#abcdef");
        assert!(matches!(
            colors.set(Category::Launch, "red"),
            Err(Error::InvalidColor { .. })
        ));
        assert!(colors.set(Category::Launch, "#12345").is_err());
    }
}
