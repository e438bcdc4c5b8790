//! HTTP access to the LiftHub API
//!
//! [`CheckInApi`] is the seam between the resolver and the network. The
//! reqwest-backed [`HttpApiClient`] only maps transport, status and body
//! failures; interpreting `success: false` is left to the resolver.

use crate::api::error::{ResolveError, ResolveResult};
use crate::api::types::{
    EntryLogRequest, EntryLogResponse, LogsResponse, QrValidation, UserSearchResponse,
};
use crate::core::retry::{retry_async, RetryPolicy};
use crate::core::validation::validate_base_url;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub const VALIDATE_QR_CODE: &str = "validate_qr_code.php";
pub const ADD_ENTRY_LOG: &str = "add_entry_log.php";
pub const SEARCH_USERS: &str = "search_users.php";
pub const GET_LOGS: &str = "get_logs.php";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Remote operations the desk depends on
#[async_trait]
pub trait CheckInApi: Send + Sync {
    async fn validate_qr_code(&self, qr_code: &str) -> ResolveResult<QrValidation>;

    async fn add_entry_log(&self, request: &EntryLogRequest) -> ResolveResult<EntryLogResponse>;

    async fn search_users(&self, query: &str) -> ResolveResult<UserSearchResponse>;

    async fn fetch_logs(&self) -> ResolveResult<LogsResponse>;
}

/// reqwest implementation of [`CheckInApi`]
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl HttpApiClient {
    /// Build a client for `base_url`; reads retry under `retry`, writes never do
    pub fn new(base_url: &str, timeout: Duration, retry: RetryPolicy) -> ResolveResult<Self> {
        let base_url = validate_base_url(base_url)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        log::debug!(
            "API client for {} (timeout {:?}, {} read attempt(s))",
            base_url,
            timeout,
            retry.max_attempts
        );
        Ok(Self {
            client,
            base_url,
            retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> ResolveResult<T> {
        let url = self.endpoint(endpoint);
        let url = url.as_str();
        let client = &self.client;

        retry_async(endpoint, self.retry.clone(), ResolveError::is_transient, || async move {
            log::debug!("GET {}", url);
            let response = client.get(url).query(query).send().await?;
            decode_response(response).await
        })
        .await
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ResolveResult<T> {
        let url = self.endpoint(endpoint);
        log::debug!("POST {}", url);
        let response = self.client.post(&url).json(body).send().await?;
        decode_response(response).await
    }
}

async fn decode_response<T: DeserializeOwned>(response: reqwest::Response) -> ResolveResult<T> {
    let status = response.status();
    if !status.is_success() {
        log::debug!("{} answered {}", response.url(), status);
        return Err(ResolveError::Status {
            status: status.as_u16(),
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        log::debug!("Undecodable response body: {}", body);
        ResolveError::Malformed {
            message: e.to_string(),
        }
    })
}

#[async_trait]
impl CheckInApi for HttpApiClient {
    async fn validate_qr_code(&self, qr_code: &str) -> ResolveResult<QrValidation> {
        self.get_json(VALIDATE_QR_CODE, &[("qrCode", qr_code)]).await
    }

    async fn add_entry_log(&self, request: &EntryLogRequest) -> ResolveResult<EntryLogResponse> {
        self.post_json(ADD_ENTRY_LOG, request).await
    }

    async fn search_users(&self, query: &str) -> ResolveResult<UserSearchResponse> {
        self.get_json(SEARCH_USERS, &[("query", query)]).await
    }

    async fn fetch_logs(&self) -> ResolveResult<LogsResponse> {
        self.get_json(GET_LOGS, &[]).await
    }
}
