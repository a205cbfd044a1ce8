//! CMS content: blog posts and static pages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rahat_core::{BlogPostId, Language, PageId};

use super::{flexible_bool, lenient_timestamp};

/// A blog post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: BlogPostId,
    pub slug: String,
    pub en_title: String,
    #[serde(default)]
    pub fa_title: String,
    #[serde(default)]
    pub en_description: String,
    #[serde(default)]
    pub fa_description: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_featured: bool,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

impl BlogPost {
    /// Title in `language`, falling back to English.
    #[must_use]
    pub fn title(&self, language: Language) -> &str {
        match language {
            Language::Fa if !self.fa_title.is_empty() => &self.fa_title,
            _ => &self.en_title,
        }
    }
}

/// A dynamic CMS page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(
        default,
        rename = "showInFooter",
        alias = "show_in_footer",
        deserialize_with = "flexible_bool"
    )]
    pub show_in_footer: bool,
}
