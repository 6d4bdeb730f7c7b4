use std::time::Duration;

use moka::future::Cache;
use reqwest::Url;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;

use crate::api::error::ApiError;
use crate::config::types::ApiConfig;

/// HTTP client for the CMS collection endpoints, with an LRU cache of raw
/// response bodies keyed by full request URL.
///
/// Cheap to clone: the reqwest client and the moka cache are both
/// reference-counted internally.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    cache: Option<Cache<String, String>>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = parse_base_url(&config.base_url)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .user_agent(concat!("listing-board/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network {
                url: base_url.to_string(),
                message: format!("building HTTP client: {e}"),
            })?;

        let cache = (config.cache_ttl_minutes > 0).then(|| {
            Cache::builder()
                .max_capacity(200)
                .time_to_live(Duration::from_secs(u64::from(config.cache_ttl_minutes) * 60))
                .build()
        });

        Ok(Self {
            http,
            base_url,
            cache,
        })
    }

    /// Resolve `path` against the base URL and append `params`.
    pub fn endpoint_url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                message: e.to_string(),
            })?;
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// GET `path` and decode the JSON body.
    ///
    /// Served from the cache unless `force` is set. Non-2xx statuses and bodies
    /// that do not decode as `T` are errors; only decodable bodies are cached.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        force: bool,
    ) -> Result<T, ApiError> {
        let url = self.endpoint_url(path, params)?;
        let key = url.to_string();

        if !force
            && let Some(c) = &self.cache
            && let Some(cached) = c.get(&key).await
            && let Ok(value) = serde_json::from_str::<T>(&cached)
        {
            tracing::debug!("cache hit for {key}");
            return Ok(value);
        }

        tracing::debug!("api: GET {key}");
        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&key, &e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("api: GET {key} -> {status}");
            return Err(ApiError::Status {
                url: key,
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::from_reqwest(&key, &e))?;
        let value = serde_json::from_str::<T>(&body).map_err(|e| ApiError::Parse {
            url: key.clone(),
            message: e.to_string(),
        })?;

        if let Some(c) = &self.cache {
            c.insert(key, body).await;
        }
        Ok(value)
    }
}

/// Parse the configured origin, making sure it ends in `/` so relative
/// endpoint paths keep any path prefix.
fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_owned()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash).map_err(|e| ApiError::InvalidUrl {
        url: raw.to_owned(),
        message: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidUrl {
            url: raw.to_owned(),
            message: "not a base URL".to_owned(),
        });
    }
    Ok(url)
}
