use serde::Deserialize;

use crate::listing::{DEFAULT_PAGE_SIZE, SortOrder};
use crate::types::Language;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub defaults: Defaults,
}

// ---------------------------------------------------------------------------
// Content API
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Site origin serving `/api/combined-*` endpoints.
    pub base_url: String,
    pub timeout_secs: u64,
    /// Response cache lifetime; `0` disables the cache.
    pub cache_ttl_minutes: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_owned(),
            timeout_secs: 10,
            cache_ttl_minutes: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub language: Language,
    pub page_size: usize,
    pub sort: SortOrder,
    pub search_debounce_ms: u64,
    /// `strftime` pattern, or `"relative"`.
    pub date_format: String,
    pub related_tags: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            language: Language::En,
            page_size: DEFAULT_PAGE_SIZE,
            sort: SortOrder::Newest,
            search_debounce_ms: 300,
            date_format: "%Y-%m-%d".to_owned(),
            related_tags: 8,
        }
    }
}
