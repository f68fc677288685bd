use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::{ComparerError, Result};
use crate::models::{ModelRecord, SearchCriteria, SearchRequest};
use crate::trace_request;

/// Header carrying the API key (`X-API-Key` on the wire; names are case-insensitive).
pub const API_KEY_HEADER: &str = "x-api-key";

pub const MODELS_PATH: &str = "/api/models/list";
pub const STATS_PATH: &str = "/api/models/stats";
pub const SEARCH_PATH: &str = "/api/agents/search";
pub const COMPARE_PATH: &str = "/api/agents/compare";
pub const CALCULATE_PATH: &str = "/api/agents/calculate";

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        Self::with_timeout(base_url, api_key, None)
    }

    pub fn with_timeout(base_url: &str, api_key: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(api_key).map_err(|_| ComparerError::InvalidApiKey)?;
        key.set_sensitive(true);
        headers.insert(HeaderName::from_static(API_KEY_HEADER), key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("comparer-cli/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn get_models(&self) -> Result<Vec<ModelRecord>> {
        let value = self.get(MODELS_PATH)?;
        decode(value)
    }

    /// Provider -> model count, as reported by the server.
    pub fn get_stats(&self) -> Result<BTreeMap<String, Value>> {
        let value = self.get(STATS_PATH)?;
        decode(value)
    }

    /// Provider -> model count, tallied from the model listing.
    pub fn get_providers(&self) -> Result<BTreeMap<String, usize>> {
        Ok(count_by_provider(&self.get_models()?))
    }

    pub fn search_models(&self, criteria: SearchCriteria) -> Result<Value> {
        self.post(SEARCH_PATH, &SearchRequest::new(criteria))
    }

    /// Send a compare spec as-is and return the raw response.
    pub fn compare_models(&self, spec: &Value) -> Result<Value> {
        self.post(COMPARE_PATH, spec)
    }

    /// Send a calculate spec as-is and return the raw response.
    pub fn calculate_price(&self, spec: &Value) -> Result<Value> {
        self.post(CALCULATE_PATH, spec)
    }

    fn get(&self, path: &str) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        trace_request!("GET", url);
        self.execute(self.client.get(&url))
    }

    fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        trace_request!("POST", url);
        if tracing::enabled!(tracing::Level::TRACE) {
            if let Ok(pretty) = serde_json::to_string_pretty(body) {
                tracing::trace!(target: "http", "Request body: {}", pretty);
            }
        }
        self.execute(self.client.post(&url).json(body))
    }

    fn execute(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        tracing::debug!(target: "http", "Response {} ({} bytes)", status, body.len());

        if !status.is_success() {
            return Err(ComparerError::from_response(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(ComparerError::Decode)
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(ComparerError::Decode)
}

pub fn count_by_provider(models: &[ModelRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for model in models {
        *counts.entry(model.provider.clone()).or_insert(0) += 1;
    }
    counts
}
