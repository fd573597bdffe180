use thiserror::Error;

#[derive(Error, Debug)]
pub enum GiziError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Upstream returned HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] ureq::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl GiziError {
    /// Whether this error came from talking to the upstream site
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            GiziError::Timeout(_) | GiziError::HttpStatus { .. } | GiziError::HttpError(_)
        )
    }

    /// Whether retrying the same request could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            GiziError::Timeout(_) => true,
            GiziError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            GiziError::HttpError(ureq::Error::Io(_))
            | GiziError::HttpError(ureq::Error::ConnectionFailed)
            | GiziError::HttpError(ureq::Error::Timeout(_)) => true,
            _ => false,
        }
    }

    /// Get an actionable hint for how to resolve this error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            GiziError::Timeout(_) => Some(
                "The nutrition site is slow to answer. Raise `timeout_secs` under [http] in:\n  gizi config path"
            ),
            GiziError::HttpStatus { .. } | GiziError::HttpError(_) => Some(
                "Check your internet connection, or verify `base_url` with `gizi config show`"
            ),
            GiziError::InvalidInput(_) => Some(
                "Use a plain food name, e.g. gizi facts \"nasi goreng\""
            ),
            GiziError::TomlError(_) | GiziError::ConfigError(_) => Some(
                "Fix the config file, or regenerate it with `gizi config init --force`"
            ),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GiziError>;
