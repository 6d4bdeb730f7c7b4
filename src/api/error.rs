//! Error taxonomy for the collection endpoints.
//!
//! Everything except [`ApiError::TagNotFound`] is a fetch failure: the page
//! shows an error with a retry affordance. An empty result is not an error.

use thiserror::Error;

/// How the UI should surface an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network, status or parse failure; user-initiated retry.
    FetchFailure,
    /// The requested tag does not exist.
    TagNotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("invalid endpoint URL \"{url}\": {message}")]
    InvalidUrl { url: String, message: String },
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("malformed response from {url}: {message}")]
    Parse { url: String, message: String },
    #[error("tag \"{tag}\" not found")]
    TagNotFound { tag: String },
}

const TIMEOUT_MESSAGE: &str =
    "The content server took too long to answer. Type `retry` to try again.";
const FETCH_FAILURE_MESSAGE: &str = "Could not load content. Type `retry` to try again.";

impl ApiError {
    pub(crate) fn from_reqwest(url: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_owned(),
            }
        } else if let Some(status) = err.status() {
            Self::Status {
                url: url.to_owned(),
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            Self::Parse {
                url: url.to_owned(),
                message: err.to_string(),
            }
        } else {
            Self::Network {
                url: url.to_owned(),
                message: err.to_string(),
            }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TagNotFound { .. } => ErrorKind::TagNotFound,
            _ => ErrorKind::FetchFailure,
        }
    }

    /// Short text for the page-level error state.
    pub fn user_message(&self) -> String {
        match self {
            Self::TagNotFound { tag } => format!(
                "No case studies are tagged \"{tag}\". \
                 Check the tag name or browse all case studies."
            ),
            Self::Timeout { .. } => TIMEOUT_MESSAGE.to_owned(),
            _ => FETCH_FAILURE_MESSAGE.to_owned(),
        }
    }
}
