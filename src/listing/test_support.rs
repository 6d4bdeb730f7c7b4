use chrono::{DateTime, Utc};

use super::{Facet, Listable};
use crate::types::{Language, LocalizedText, parse_date};

/// Minimal listable record for unit tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Item {
    pub(crate) id: String,
    pub(crate) title: LocalizedText,
    pub(crate) date: Option<String>,
    pub(crate) featured: bool,
    pub(crate) critical: bool,
    pub(crate) industry: Option<String>,
    pub(crate) tags: Vec<String>,
}

impl Item {
    pub(crate) fn new(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            title: LocalizedText::new().with(Language::En, format!("Item {id}")),
            ..Self::default()
        }
    }

    pub(crate) fn title(mut self, lang: Language, text: &str) -> Self {
        self.title = self.title.with(lang, text);
        self
    }

    pub(crate) fn date(mut self, date: &str) -> Self {
        self.date = Some(date.to_owned());
        self
    }

    pub(crate) fn featured(mut self) -> Self {
        self.featured = true;
        self
    }

    pub(crate) fn critical(mut self) -> Self {
        self.critical = true;
        self
    }

    pub(crate) fn industry(mut self, industry: &str) -> Self {
        self.industry = Some(industry.to_owned());
        self
    }

    pub(crate) fn tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| (*t).to_owned()).collect();
        self
    }
}

impl Listable for Item {
    fn id(&self) -> &str {
        &self.id
    }

    fn published(&self) -> Option<DateTime<Utc>> {
        self.date.as_deref().and_then(parse_date)
    }

    fn is_featured(&self) -> bool {
        self.featured
    }

    fn is_critical(&self) -> bool {
        self.critical
    }

    fn search_fields(&self, lang: Language) -> Vec<&str> {
        let mut fields = vec![self.title.get(lang)];
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }

    fn facet_values(&self, facet: Facet) -> Vec<&str> {
        match facet {
            Facet::Industry => self.industry.as_deref().into_iter().collect(),
            Facet::Tag => self.tags.iter().map(String::as_str).collect(),
            Facet::Priority => vec![if self.critical { "critical" } else { "medium" }],
            Facet::Category | Facet::ChangeType => Vec::new(),
        }
    }
}

/// Ids of a page or filtered slice, for terse assertions.
pub(crate) fn ids(items: &[&Item]) -> Vec<String> {
    items.iter().map(|i| i.id.clone()).collect()
}
