use shared::error::ErrorCode;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("catalog returned HTTP {status} ({code:?}) for {url}")]
    Status {
        status: u16,
        code: ErrorCode,
        url: String,
    },
    #[error("invalid resource reference '{url}': {source}")]
    InvalidReference {
        url: String,
        source: url::ParseError,
    },
    #[error("invalid catalog base url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
}

impl CatalogError {
    pub fn status(status: u16, url: impl Into<String>) -> Self {
        Self::Status {
            status,
            code: ErrorCode::from_status(status),
            url: url.into(),
        }
    }

    /// Classifies a failed request: an HTTP status the server answered with
    /// becomes [`CatalogError::Status`], anything else stays a transport error.
    pub fn from_http(err: reqwest::Error, requested: &Url) -> Self {
        match err.status() {
            Some(status) => {
                let url = err.url().unwrap_or(requested).as_str().to_string();
                Self::status(status.as_u16(), url)
            }
            None => Self::Transport(err),
        }
    }

    /// True for failures that came back from the wire rather than from local
    /// configuration or malformed references.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }

    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}
