//! The Scheduled-Email Client (§4.3): typed operations against the upstream API that
//! owns `ScheduledEmail` records, plus the transparent pagination walk `list_due` relies
//! on. Every call attaches `Authorization: Token <token>`, sourced fresh from the token
//! cache on every request (the cache, not this client, decides whether that means a
//! cache hit or a refresh).

use std::sync::Arc;

use reqwest::Client;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::ScheduledEmail;
use crate::errors::ApiError;
use crate::token::TokenCache;
use crate::uri::ModelFetcher;

const DEFAULT_MAX_PAGES: usize = 10;

pub struct ScheduledEmailClient {
    client: Client,
    api_base_url: String,
    token_cache: Arc<TokenCache>,
}

impl ScheduledEmailClient {
    pub fn new(client: Client, api_base_url: String, token_cache: Arc<TokenCache>) -> Self {
        Self { client, api_base_url, token_cache }
    }

    async fn token_header(&self, url: &str) -> Result<String, ApiError> {
        let token = self
            .token_cache
            .get_token()
            .await
            .map_err(|e| ApiError::transport(url, e))?;
        Ok(format!("Token {}", token.token))
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, ApiError> {
        let header = self.token_header(url).await?;
        self.client
            .get(url)
            .header("Authorization", header)
            .send()
            .await
            .map_err(|source| ApiError::transport(url, source))
    }

    async fn post(&self, url: &str, body: Option<&Value>) -> Result<reqwest::Response, ApiError> {
        let header = self.token_header(url).await?;
        let mut request = self.client.post(url).header("Authorization", header);
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await.map_err(|source| ApiError::transport(url, source))
    }

    async fn as_scheduled_email(response: reqwest::Response, url: &str) -> Result<ScheduledEmail, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus { url: url.to_string(), status: status.as_u16() });
        }
        response.json::<ScheduledEmail>().await.map_err(|source| ApiError::transport(url, source))
    }

    /// Transparent pagination (§4.3): `url_template` contains a single `{}` placeholder
    /// for the 1-based page index. A 2xx page extends the accumulator and advances; any
    /// non-2xx status (404 included) ends the walk without error — it's treated as
    /// end-of-data, not a failure. `max_pages` is a hard safety cap independent of what
    /// the server does.
    pub async fn get_paginated(&self, url_template: &str, max_pages: usize) -> Result<Vec<Value>, ApiError> {
        let mut results = Vec::new();
        for page in 1..=max_pages {
            let url = url_template.replacen("{}", &page.to_string(), 1);
            let response = self.get(&url).await?;
            if !response.status().is_success() {
                break;
            }
            let body: PageResponse =
                response.json().await.map_err(|source| ApiError::transport(&url, source))?;
            results.extend(body.results);
        }
        Ok(results)
    }

    /// `list_due()` (§4.3).
    pub async fn list_due(&self) -> Result<Vec<ScheduledEmail>, ApiError> {
        let template = format!("{}/v2/scheduledemail/scheduled_to_run?page={{}}", self.api_base_url);
        let raw = self.get_paginated(&template, DEFAULT_MAX_PAGES).await?;
        raw.into_iter()
            .map(|value| {
                serde_json::from_value(value).map_err(|source| ApiError::transport(&template, source))
            })
            .collect()
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<ScheduledEmail, ApiError> {
        let url = format!("{}/v2/scheduledemail/{id}", self.api_base_url);
        let response = self.get(&url).await?;
        Self::as_scheduled_email(response, &url).await
    }

    /// `lock(uuid)` (§4.8.1). Failure here is reported as `LockError` by the caller, not
    /// as `ApiError` directly — see `pipeline.rs`.
    pub async fn lock(&self, id: Uuid) -> Result<ScheduledEmail, ApiError> {
        let url = format!("{}/v2/scheduledemail/{id}/lock", self.api_base_url);
        let response = self.post(&url, None).await?;
        Self::as_scheduled_email(response, &url).await
    }

    pub async fn fail(&self, id: Uuid, details: &str) -> Result<ScheduledEmail, ApiError> {
        let url = format!("{}/v2/scheduledemail/{id}/fail", self.api_base_url);
        let body = serde_json::json!({ "details": details });
        let response = self.post(&url, Some(&body)).await?;
        Self::as_scheduled_email(response, &url).await
    }

    pub async fn succeed(&self, id: Uuid, details: &str) -> Result<ScheduledEmail, ApiError> {
        let url = format!("{}/v2/scheduledemail/{id}/succeed", self.api_base_url);
        let body = serde_json::json!({ "details": details });
        let response = self.post(&url, Some(&body)).await?;
        Self::as_scheduled_email(response, &url).await
    }
}

impl ModelFetcher for ScheduledEmailClient {
    async fn fetch(&self, model: &str, id: &str) -> Result<Value, ApiError> {
        let url = format!("{}/v2/{model}/{id}", self.api_base_url);
        let response = self.get(&url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus { url, status: status.as_u16() });
        }
        response.json::<Value>().await.map_err(|source| ApiError::transport(&url, source))
    }
}

#[derive(serde::Deserialize)]
struct PageResponse {
    results: Vec<Value>,
}
