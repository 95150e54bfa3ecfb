// src/app/omdb.rs
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use urlencoding::encode;

use crate::app::types::{MovieDetail, MovieSummary};
use crate::config::AppConfig;

static IMDB_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^tt\d+$").expect("static regex"));

const NOT_FOUND_MSG: &str = "Movie not found!";
const BAD_ID_MSG: &str = "Incorrect IMDb ID.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("No OMDb API key configured (set omdb_api_key in config.json)")]
    MissingApiKey,

    /// Network error or non-2xx status.
    #[error("{0}")]
    Transport(String),

    /// `Response: "False"`; carries the service's `Error` text.
    #[error("{0}")]
    Service(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Text shown in place of the grid or inside the overlay.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) | Self::Decode(_) => format!("An error occurred: {self}"),
            Self::Service(msg) => msg.clone(),
            Self::MissingApiKey => self.to_string(),
        }
    }
}

/// Lookup operations the view controller dispatches.
pub trait MovieService: Send + Sync {
    fn search_by_title(&self, term: &str) -> Result<Vec<MovieSummary>, ServiceError>;
    fn fetch_detail(&self, id: &str) -> Result<MovieDetail, ServiceError>;
}

pub struct OmdbClient {
    client: Result<Client, String>,
    base_url: String,
    api_key: Option<String>,
}

impl OmdbClient {
    pub fn new(cfg: &AppConfig) -> Self {
        let client = Client::builder()
            .user_agent("cinelist/omdb")
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .map_err(|e| format!("http client build failed: {e}"));
        Self::with_client(cfg, client)
    }

    fn with_client(cfg: &AppConfig, client: Result<Client, String>) -> Self {
        Self {
            client,
            base_url: cfg.omdb_base_url.clone(),
            api_key: cfg.omdb_api_key.clone(),
        }
    }

    fn api_key(&self) -> Result<&str, ServiceError> {
        self.api_key.as_deref().ok_or(ServiceError::MissingApiKey)
    }

    pub fn search_url(&self, api_key: &str, term: &str) -> String {
        format!("{}?apikey={}&s={}", self.base_url, encode(api_key), encode(term))
    }

    pub fn detail_url(&self, api_key: &str, id: &str) -> String {
        format!("{}?apikey={}&i={}", self.base_url, encode(api_key), encode(id))
    }

    fn get_text(&self, url: &str) -> Result<String, ServiceError> {
        let client = self.client.as_ref().map_err(|e| ServiceError::Transport(e.clone()))?;
        let resp = client
            .get(url)
            .send()
            .map_err(|e| ServiceError::Transport(format!("request failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(ServiceError::Transport(format!(
                "Network response was not ok (HTTP {})",
                resp.status()
            )));
        }
        resp.text()
            .map_err(|e| ServiceError::Transport(format!("read body: {e}")))
    }
}

impl MovieService for OmdbClient {
    fn search_by_title(&self, term: &str) -> Result<Vec<MovieSummary>, ServiceError> {
        let key = self.api_key()?;
        debug!("OMDb search `{term}`");
        let body = self.get_text(&self.search_url(key, term))?;
        parse_search_response(&body)
    }

    fn fetch_detail(&self, id: &str) -> Result<MovieDetail, ServiceError> {
        let key = self.api_key()?;
        if !IMDB_ID.is_match(id) {
            return Err(ServiceError::Service(BAD_ID_MSG.into()));
        }
        debug!("OMDb detail {id}");
        let body = self.get_text(&self.detail_url(key, id))?;
        parse_detail_response(&body)
    }
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(rename = "Search", default)]
    search: Vec<MovieSummary>,
}

/// A search with zero matches is a failure, exactly as the service reports it.
pub(crate) fn parse_search_response(body: &str) -> Result<Vec<MovieSummary>, ServiceError> {
    let env: SearchEnvelope =
        serde_json::from_str(body).map_err(|e| ServiceError::Decode(e.to_string()))?;
    if env.response.eq_ignore_ascii_case("false") {
        return Err(ServiceError::Service(
            env.error.unwrap_or_else(|| NOT_FOUND_MSG.into()),
        ));
    }
    if env.search.is_empty() {
        return Err(ServiceError::Service(NOT_FOUND_MSG.into()));
    }
    Ok(env.search)
}

pub(crate) fn parse_detail_response(body: &str) -> Result<MovieDetail, ServiceError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| ServiceError::Decode(e.to_string()))?;
    let failed = value
        .get("Response")
        .and_then(Value::as_str)
        .is_some_and(|r| r.eq_ignore_ascii_case("false"));
    if failed {
        let msg = value
            .get("Error")
            .and_then(Value::as_str)
            .unwrap_or(NOT_FOUND_MSG);
        return Err(ServiceError::Service(msg.to_string()));
    }
    serde_json::from_value(value).map_err(|e| ServiceError::Decode(e.to_string()))
}
