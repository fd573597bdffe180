use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::config::{HttpConfig, SiteConfig};
use crate::error::{GiziError, Result};

/// Anything that can turn a URL into page markup.
///
/// The scraping modules only ever talk to this trait, so they can run against
/// the live site ([`HttpSource`]) or canned pages ([`StaticSource`]).
pub trait PageSource: Send + Sync {
    fn fetch_page(&self, url: &str) -> Result<String>;
}

/// Blocking HTTP source backed by a shared ureq agent
pub struct HttpSource {
    agent: ureq::Agent,
    user_agent: String,
    retries: u32,
    retry_backoff: Duration,
}

impl HttpSource {
    pub fn new(config: &HttpConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build()
            .into();

        Self {
            agent,
            user_agent: config.user_agent.clone(),
            retries: config.retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    fn fetch_once(&self, url: &str) -> Result<String> {
        let response = self
            .agent
            .get(url)
            .header("User-Agent", &self.user_agent)
            .call()
            .map_err(|e| classify_error(url, e))?;

        response
            .into_body()
            .read_to_string()
            .map_err(|e| classify_error(url, e))
    }
}

impl PageSource for HttpSource {
    fn fetch_page(&self, url: &str) -> Result<String> {
        let mut attempt = 0;
        loop {
            tracing::debug!(url, attempt, "fetching page");
            match self.fetch_once(url) {
                Ok(html) => return Ok(html),
                Err(e) if e.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    tracing::warn!(url, attempt, error = %e, "transient fetch failure, retrying");
                    std::thread::sleep(self.retry_backoff * attempt);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Map ureq failures onto the timeout / status / transport split callers rely on
fn classify_error(url: &str, err: ureq::Error) -> GiziError {
    match err {
        ureq::Error::Timeout(_) => GiziError::Timeout(url.to_string()),
        ureq::Error::StatusCode(status) => GiziError::HttpStatus {
            url: url.to_string(),
            status,
        },
        other => GiziError::HttpError(other),
    }
}

/// A canned response served by [`StaticSource`]
#[derive(Debug, Clone)]
pub enum Canned {
    Html(String),
    Timeout,
    Status(u16),
}

/// In-memory page source for tests and offline runs.
///
/// Unknown URLs answer with HTTP 404. Every requested URL is recorded.
#[derive(Debug, Default)]
pub struct StaticSource {
    pages: HashMap<String, Canned>,
    delays: HashMap<String, Duration>,
    requests: Mutex<Vec<String>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for `url`
    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), Canned::Html(html.to_string()));
        self
    }

    /// Make `url` fail as if the request timed out
    pub fn with_timeout(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), Canned::Timeout);
        self
    }

    /// Make `url` answer with a non-success status
    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.pages.insert(url.to_string(), Canned::Status(status));
        self
    }

    /// Hold the response for `url` back by `delay`
    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    /// URLs requested so far, in request order
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl PageSource for StaticSource {
    fn fetch_page(&self, url: &str) -> Result<String> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(url.to_string());

        if let Some(delay) = self.delays.get(url) {
            std::thread::sleep(*delay);
        }

        match self.pages.get(url) {
            Some(Canned::Html(html)) => Ok(html.clone()),
            Some(Canned::Timeout) => Err(GiziError::Timeout(url.to_string())),
            Some(Canned::Status(status)) => Err(GiziError::HttpStatus {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(GiziError::HttpStatus {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// Builds upstream URLs from already-encoded slugs
#[derive(Debug, Clone)]
pub struct Endpoints {
    base_url: String,
    food_path: String,
    search_path: String,
    search_param: String,
}

impl Endpoints {
    pub fn new(site: &SiteConfig) -> Self {
        Self {
            base_url: site.base_url.trim_end_matches('/').to_string(),
            food_path: site.food_path.clone(),
            search_path: site.search_path.clone(),
            search_param: site.search_param.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Food page URL; `query_suffix` is a serving fragment such as `?portionid=1`
    pub fn food_url(&self, slug: &str, query_suffix: &str) -> String {
        format!("{}{}{}{}", self.base_url, self.food_path, slug, query_suffix)
    }

    pub fn search_url(&self, slug: &str) -> String {
        format!(
            "{}{}?{}={}",
            self.base_url, self.search_path, self.search_param, slug
        )
    }
}
