use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors raised before a call is issued. Outcomes of an issued call are
/// never reported here; they resolve through [`crate::ResultHandle`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("operation name must not be empty")]
    EmptyOperationName,
    #[error("calls must be issued from within a Tokio runtime")]
    NoRuntime,
    #[error("invalid header name {name:?}")]
    InvalidHeaderName { name: String },
    #[error("invalid value for header {name:?}")]
    InvalidHeaderValue { name: String },
    #[error("invalid base url {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("base url {url:?} cannot take an operation path segment")]
    BaseUrlWithoutPath { url: String },
    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse client config: {0}")]
    Config(#[from] toml::de::Error),
}

impl ClientError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
