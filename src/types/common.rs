use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// Content languages served by the CMS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hu,
    De,
}

#[derive(Debug, Error)]
#[error("unsupported language code \"{0}\" (expected en, hu or de)")]
pub struct LanguageParseError(pub String);

impl Language {
    /// Language used when a field has no value for the requested one.
    pub const FALLBACK: Self = Self::En;

    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Hu => "hu",
            Self::De => "de",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = LanguageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "hu" => Ok(Self::Hu),
            "de" => Ok(Self::De),
            _ => Err(LanguageParseError(s.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Multilingual text
// ---------------------------------------------------------------------------

/// A text field keyed by language code (`{"en": "...", "hu": "..."}`).
///
/// A bare JSON string is accepted too and stored under the fallback language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for fixtures.
    pub fn with(mut self, lang: Language, text: impl Into<String>) -> Self {
        self.0.insert(lang.code().to_owned(), text.into());
        self
    }

    /// Text for `lang`, falling back to English, then to any non-empty value.
    pub fn get(&self, lang: Language) -> &str {
        self.exact(lang)
            .or_else(|| self.exact(Language::FALLBACK))
            .or_else(|| self.0.values().map(String::as_str).find(|s| !s.is_empty()))
            .unwrap_or("")
    }

    /// Text for `lang` only, without fallback.
    pub fn exact(&self, lang: Language) -> Option<&str> {
        self.0
            .get(lang.code())
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(String::is_empty)
    }
}

impl<'de> Deserialize<'de> for LocalizedText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Map(BTreeMap<String, Option<String>>),
            Plain(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Map(map) => Self(
                map.into_iter()
                    .filter_map(|(k, v)| v.map(|v| (k.to_ascii_lowercase(), v)))
                    .collect(),
            ),
            Raw::Plain(s) => Self::new().with(Language::FALLBACK, s),
        })
    }
}

// ---------------------------------------------------------------------------
// Author
// ---------------------------------------------------------------------------

/// Author reference as delivered by the CMS: either an id or an embedded record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorRef {
    Id(String),
    Person {
        #[serde(default)]
        id: Option<String>,
        name: String,
    },
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

/// Accept identifiers delivered as either JSON strings or numbers.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Int(n) => n.to_string(),
    })
}

/// Parse a CMS date: RFC 3339 timestamp or a bare `YYYY-MM-DD` day.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// First candidate that parses, in the order given.
pub(crate) fn first_parsed_date<const N: usize>(
    candidates: [&Option<String>; N],
) -> Option<DateTime<Utc>> {
    candidates
        .into_iter()
        .filter_map(Option::as_deref)
        .find_map(parse_date)
}
