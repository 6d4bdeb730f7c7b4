use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{AuthorRef, Language, LocalizedText, first_parsed_date, string_or_number};
use crate::listing::{Facet, Listable};

/// A customer case study, shown on the case-study tag pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStudy {
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
    pub client_name: String,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
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

impl Listable for CaseStudy {
    fn id(&self) -> &str {
        &self.id
    }

    fn published(&self) -> Option<DateTime<Utc>> {
        first_parsed_date([&self.published_at, &self.published_date, &self.date])
    }

    fn is_featured(&self) -> bool {
        self.featured
    }

    fn search_fields(&self, lang: Language) -> Vec<&str> {
        let mut fields = vec![
            self.title.get(lang),
            self.description.get(lang),
            self.summary.get(lang),
            self.client_name.as_str(),
        ];
        fields.extend(self.tags.iter().map(String::as_str));
        fields.extend(self.technologies.iter().map(String::as_str));
        fields
    }

    fn facet_values(&self, facet: Facet) -> Vec<&str> {
        match facet {
            Facet::Industry => self.industry.as_deref().into_iter().collect(),
            Facet::Tag => self.tags.iter().map(String::as_str).collect(),
            Facet::Priority | Facet::Category | Facet::ChangeType => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::parse_date;

    #[test]
    fn deserializes_cms_payload() {
        let json = r#"{
            "id": 12,
            "slug": "medical-housing",
            "title": {"en": "Medical housing", "hu": "Orvosi ház"},
            "clientName": "MedTech Kft.",
            "industry": "Medical",
            "technologies": ["Injection molding"],
            "tags": ["medical", "cleanroom"],
            "featured": true,
            "date": "2024-11-20"
        }"#;
        let study: CaseStudy = serde_json::from_str(json).unwrap();
        assert_eq!(study.id, "12");
        assert_eq!(study.title.get(Language::Hu), "Orvosi ház");
        assert_eq!(study.date.as_deref(), Some("2024-11-20"));
        assert_eq!(study.published(), parse_date("2024-11-20"));
        assert!(study.is_featured());
        assert_eq!(study.facet_values(Facet::Industry), vec!["Medical"]);
        assert!(study.facet_values(Facet::Priority).is_empty());
    }

    #[test]
    fn published_at_wins_over_legacy_date_keys() {
        let json = r#"{
            "id": 7,
            "title": "Both dates",
            "date": "2023-01-01",
            "publishedDate": "2023-06-01",
            "publishedAt": "2024-02-10T09:00:00Z"
        }"#;
        let study: CaseStudy = serde_json::from_str(json).unwrap();
        assert_eq!(study.published(), parse_date("2024-02-10T09:00:00Z"));
    }

    #[test]
    fn unparseable_published_at_falls_back_to_date() {
        let json = r#"{"id": 8, "title": "x", "publishedAt": "tbd", "date": "2023-01-01"}"#;
        let study: CaseStudy = serde_json::from_str(json).unwrap();
        assert_eq!(study.published(), parse_date("2023-01-01"));
    }

    #[test]
    fn search_fields_are_localized() {
        let json = r#"{
            "id": "a",
            "title": {"en": "Bio-Plastic Revolution", "hu": "Biobázisú műanyag"},
            "technologies": ["PLA"]
        }"#;
        let study: CaseStudy = serde_json::from_str(json).unwrap();
        assert!(study.search_fields(Language::En).contains(&"Bio-Plastic Revolution"));
        assert!(study.search_fields(Language::Hu).contains(&"Biobázisú műanyag"));
        assert!(study.search_fields(Language::Hu).contains(&"PLA"));
    }
}
