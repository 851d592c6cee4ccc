// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::ids::TopicId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Basics,
    ModernJava,
    Gui,
    Networking,
    Enterprise,
    Architecture,
}

impl Category {
    pub const ALL: [Self; 6] = [
        Self::Basics,
        Self::ModernJava,
        Self::Gui,
        Self::Networking,
        Self::Enterprise,
        Self::Architecture,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Basics => "Basics",
            Self::ModernJava => "Modern Java",
            Self::Gui => "GUI",
            Self::Networking => "Networking",
            Self::Enterprise => "Enterprise",
            Self::Architecture => "Architecture",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Basics" => Some(Self::Basics),
            "Modern Java" => Some(Self::ModernJava),
            "GUI" => Some(Self::Gui),
            "Networking" => Some(Self::Networking),
            "Enterprise" => Some(Self::Enterprise),
            "Architecture" => Some(Self::Architecture),
            _ => None,
        }
    }

    pub const fn style(self) -> CategoryStyle {
        match self {
            Self::Basics => CategoryStyle {
                icon: "¶",
                accent: Accent::Slate,
            },
            Self::ModernJava => CategoryStyle {
                icon: ">_",
                accent: Accent::Orange,
            },
            Self::Gui => CategoryStyle {
                icon: "▣",
                accent: Accent::Blue,
            },
            Self::Networking => CategoryStyle {
                icon: "◍",
                accent: Accent::Emerald,
            },
            Self::Enterprise => CategoryStyle {
                icon: "≡",
                accent: Accent::Purple,
            },
            Self::Architecture => CategoryStyle {
                icon: "⚙",
                accent: Accent::Red,
            },
        }
    }
}

/// Display metadata for a category. Renderers map [`Accent`] onto their own
/// palette so this crate stays free of terminal types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryStyle {
    pub icon: &'static str,
    pub accent: Accent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accent {
    Slate,
    Orange,
    Blue,
    Emerald,
    Purple,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub const ALL: [Self; 7] = [
        Self::All,
        Self::Only(Category::Basics),
        Self::Only(Category::ModernJava),
        Self::Only(Category::Gui),
        Self::Only(Category::Networking),
        Self::Only(Category::Enterprise),
        Self::Only(Category::Architecture),
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Only(category) => category.label(),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        if value == "All" {
            return Some(Self::All);
        }
        Category::parse(value).map(Self::Only)
    }

    pub fn admits(self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionUpdate {
    pub version: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Topic {
    pub id: TopicId,
    pub title: String,
    pub category: Category,
    pub version: Option<String>,
    pub description: String,
    pub code_snippet: String,
    pub explanation: String,
    pub expected_output: Option<String>,
    pub version_history: Vec<VersionUpdate>,
}

impl Topic {
    /// Sidebar subtitle: the version tag when present, else the category.
    pub fn subtitle(&self) -> &str {
        self.version.as_deref().unwrap_or(self.category.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppMode {
    Browse,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CopyTarget {
    Snippet,
    AllVisible,
}

#[cfg(test)]
mod tests {
    use super::{Category, CategoryFilter};

    #[test]
    fn category_labels_parse_back() {
        for category in Category::ALL {
            assert_eq!(Category::parse(category.label()), Some(category));
        }
        assert_eq!(Category::parse("Kotlin"), None);
    }

    #[test]
    fn category_filter_admits_matching_category_only() {
        assert!(CategoryFilter::All.admits(Category::Gui));
        assert!(CategoryFilter::Only(Category::Gui).admits(Category::Gui));
        assert!(!CategoryFilter::Only(Category::Gui).admits(Category::Basics));
    }

    #[test]
    fn category_filter_parses_all_sentinel() {
        assert_eq!(CategoryFilter::parse("All"), Some(CategoryFilter::All));
        assert_eq!(
            CategoryFilter::parse("Modern Java"),
            Some(CategoryFilter::Only(Category::ModernJava))
        );
        assert_eq!(CategoryFilter::parse("all"), None);
    }
}
