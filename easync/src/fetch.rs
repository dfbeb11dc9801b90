//! The URL shorthand: attach a controller to a GET request instead of a
//! hand-written operation.

use crate::{AsyncController, AsyncOptions};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://swapi.dev/api/people/";

/// Environment variable overriding [`DEFAULT_BASE_URL`].
pub const BASE_URL_ENV: &str = "EASYNC_BASE_URL";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub base_url: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl FetchConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        FetchConfig {
            base_url: base_url.into(),
        }
    }

    /// Uses `EASYNC_BASE_URL` when set, the default base otherwise.
    pub fn from_env() -> Self {
        match std::env::var(BASE_URL_ENV) {
            Ok(base_url) if !base_url.trim().is_empty() => Self::new(base_url),
            _ => Self::default(),
        }
    }
}

/// Performs GET requests relative to a base URL and decodes JSON bodies.
#[derive(Debug, Clone, Default)]
pub struct FetchAdapter {
    client: reqwest::Client,
    config: FetchConfig,
}

impl FetchAdapter {
    pub fn new(config: FetchConfig) -> Self {
        FetchAdapter {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn with_client(client: reqwest::Client, config: FetchConfig) -> Self {
        FetchAdapter { client, config }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Resolves `path` against the base URL. Absolute URLs replace the base.
    pub fn url_for(&self, path: &str) -> Result<Url, FetchError> {
        Ok(Url::parse(&self.config.base_url)?.join(path)?)
    }

    pub async fn get(&self, path: &str) -> Result<Value, FetchError> {
        let url = self.url_for(path)?;
        debug!(%url, "GET");
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.json().await?)
    }
}

/// Fills each `{}` in `template` with the next argument. Placeholders beyond
/// the last argument are left as they are.
pub fn fill_template(template: &str, args: &[String]) -> String {
    let mut args = args.iter();
    let mut pieces = template.split("{}");
    let mut filled = pieces.next().unwrap_or_default().to_string();
    for piece in pieces {
        match args.next() {
            Some(arg) => filled.push_str(arg),
            None => filled.push_str("{}"),
        }
        filled.push_str(piece);
    }
    filled
}

impl AsyncController<Vec<String>, Value> {
    /// Attaches a controller that GETs `template`, with `{}` placeholders
    /// filled from the arguments, relative to the configured base URL.
    pub fn attach_url(
        template: impl Into<String>,
        watched_args: Vec<String>,
        options: AsyncOptions<Value>,
    ) -> Self {
        Self::attach_url_with(
            FetchAdapter::new(FetchConfig::from_env()),
            template,
            watched_args,
            options,
        )
    }

    pub fn attach_url_with(
        adapter: FetchAdapter,
        template: impl Into<String>,
        watched_args: Vec<String>,
        options: AsyncOptions<Value>,
    ) -> Self {
        let template = template.into();
        Self::attach(
            move |args: Vec<String>| {
                let adapter = adapter.clone();
                let path = fill_template(&template, &args);
                async move { adapter.get(&path).await }
            },
            watched_args,
            options,
        )
    }
}
