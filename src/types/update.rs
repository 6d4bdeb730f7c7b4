use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{AuthorRef, Language, LocalizedText, first_parsed_date, string_or_number};
use crate::listing::{Facet, Listable};

// ---------------------------------------------------------------------------
// Update-specific enums
// ---------------------------------------------------------------------------

/// Update priority. Values the CMS invents later are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
    Other(String),
}

impl Priority {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for Priority {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "critical" => Self::Critical,
            "high" => Self::High,
            "medium" => Self::Medium,
            "low" => Self::Low,
            _ => Self::Other(s),
        }
    }
}

impl From<Priority> for String {
    fn from(p: Priority) -> Self {
        p.as_str().to_owned()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Update domain type
// ---------------------------------------------------------------------------

/// A product / process update from the updates index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Update {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub slug: String,
    pub title: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    #[serde(default)]
    pub summary: LocalizedText,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub update_category: Option<String>,
    #[serde(default)]
    pub change_type: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default)]
    pub author: Option<AuthorRef>,
}

impl Listable for Update {
    fn id(&self) -> &str {
        &self.id
    }

    fn published(&self) -> Option<DateTime<Utc>> {
        first_parsed_date([&self.published_at, &self.published_date, &self.date])
    }

    fn is_featured(&self) -> bool {
        self.featured
    }

    fn is_critical(&self) -> bool {
        self.priority == Priority::Critical
    }

    fn search_fields(&self, lang: Language) -> Vec<&str> {
        let mut fields = vec![
            self.title.get(lang),
            self.description.get(lang),
            self.summary.get(lang),
        ];
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }

    fn facet_values(&self, facet: Facet) -> Vec<&str> {
        match facet {
            Facet::Priority => vec![self.priority.as_str()],
            Facet::Category => self.update_category.as_deref().into_iter().collect(),
            Facet::ChangeType => self.change_type.as_deref().into_iter().collect(),
            Facet::Tag => self.tags.iter().map(String::as_str).collect(),
            Facet::Industry => Vec::new(),
        }
    }
}
