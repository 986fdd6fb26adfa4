//! Marketplace HTTP API client
//!
//! Thin typed wrappers over the backend endpoints. Non-2xx responses are
//! turned into errors carrying the backend's JSON `error` text when present.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::config::Config;
use crate::constants::api;
use crate::types::{Category, ContactRequest, ContactResponse, ListingDetail, ListingsPage, SearchQuery};

/// Backend operations the core depends on. `?Send` so the same trait object
/// works with the browser fetch backend.
#[async_trait(?Send)]
pub trait MarketApi {
    async fn search_listings(&self, query: &SearchQuery) -> Result<ListingsPage>;
    async fn get_listing(&self, id: &str) -> Result<ListingDetail>;
    async fn contact_seller(&self, request: &ContactRequest) -> Result<ContactResponse>;
    async fn categories(&self) -> Result<Vec<Category>>;
}

#[derive(Deserialize)]
struct CategoriesEnvelope {
    #[serde(default)]
    categories: Vec<Category>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
}

pub struct HttpMarketApi {
    client: reqwest::Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl HttpMarketApi {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            timeout: config.request_timeout_ms.map(Duration::from_millis),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_timeout(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.timeout {
            Some(t) => req.timeout(t),
            None => req,
        }
    }

    /// Send and return status plus body text.
    async fn fetch(&self, req: reqwest::RequestBuilder, what: &str) -> Result<(StatusCode, String)> {
        let response = self
            .with_timeout(req)
            .send()
            .await
            .map_err(|e| anyhow!("{what}: request failed: {e}"))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| anyhow!("{what}: failed to read body: {e}"))?;
        Ok((status, body))
    }

    async fn send_json<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder, what: &str) -> Result<T> {
        let (status, body) = self.fetch(req, what).await?;
        decode_json(what, status, &body)
    }
}

/// The backend's JSON `error` text, or the raw body when there is none.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error)
        .unwrap_or_else(|| body.to_string())
}

fn decode_json<T: DeserializeOwned>(what: &str, status: StatusCode, body: &str) -> Result<T> {
    if !status.is_success() {
        return Err(anyhow!("{what}: HTTP {status}: {}", error_detail(body)));
    }
    serde_json::from_str(body).map_err(|e| anyhow!("{what}: invalid response: {e}"))
}

/// Contact replies of any status that parse as `{success, error}` are a
/// result, not a transport error.
fn decode_contact(status: StatusCode, body: &str) -> Result<ContactResponse> {
    match serde_json::from_str::<ContactResponse>(body) {
        Ok(resp) => Ok(resp),
        Err(e) if status.is_success() => Err(anyhow!("contact seller: invalid response: {e}")),
        Err(_) => Err(anyhow!("contact seller: HTTP {status}: {}", error_detail(body))),
    }
}

/// Path for a single listing; the id is percent-encoded since it comes from
/// a DOM attribute or a start parameter.
pub fn listing_path(id: &str) -> String {
    format!("{}/{}", api::LISTINGS, urlencoding::encode(id.trim()))
}

#[async_trait(?Send)]
impl MarketApi for HttpMarketApi {
    async fn search_listings(&self, query: &SearchQuery) -> Result<ListingsPage> {
        log::debug!("[api] GET {} {:?}", api::LISTINGS, query.params());
        let req = self.client.get(self.url(api::LISTINGS)).query(&query.params());
        self.send_json(req, "search listings").await
    }

    async fn get_listing(&self, id: &str) -> Result<ListingDetail> {
        let path = listing_path(id);
        log::debug!("[api] GET {path}");
        let req = self.client.get(self.url(&path));
        self.send_json(req, "get listing").await
    }

    async fn contact_seller(&self, request: &ContactRequest) -> Result<ContactResponse> {
        log::debug!("[api] POST {} listing={}", api::CONTACT_SELLER, request.listing_id);
        let req = self.client.post(self.url(api::CONTACT_SELLER)).json(request);
        let (status, body) = self.fetch(req, "contact seller").await?;
        decode_contact(status, &body)
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        let req = self.client.get(self.url(api::CATEGORIES));
        let envelope: CategoriesEnvelope = self.send_json(req, "categories").await?;
        Ok(envelope.categories)
    }
}
