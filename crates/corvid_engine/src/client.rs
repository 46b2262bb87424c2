use std::time::Duration;

use corvid_core::{
    HistoryPage, Job, JobId, JobStatus, NewSubscription, Removal, Subscription, SubscriptionId,
    SubscriptionUpdate,
};
use corvid_logging::corvid_debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::types::{
    CancelAllResponse, CheckResponse, ClearResponse, ErrorBody, JobListResponse, RemoveResponse,
};
use crate::{ApiError, JobQuery};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// REST root, e.g. `http://localhost:8000/api`.
    pub base_url: String,
    /// Push channel endpoint.
    pub ws_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub history_page_size: u32,
    /// Page size used to list every job when rebuilding the active set.
    pub active_listing_limit: u32,
    pub reconnect_delay: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            ws_url: "ws://localhost:8000/ws".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            history_page_size: 25,
            active_listing_limit: 1000,
            reconnect_delay: Duration::from_secs(3),
        }
    }
}

/// The download server's REST surface.
#[async_trait::async_trait]
pub trait ApiClient: Send + Sync {
    async fn list_jobs(&self, query: &JobQuery) -> Result<HistoryPage, ApiError>;
    async fn create_job(&self, url: &str) -> Result<Job, ApiError>;
    async fn create_batch(&self, urls: &[String]) -> Result<Vec<Job>, ApiError>;
    /// Cancels an active job or deletes a finished one; the server decides.
    async fn remove_job(&self, id: JobId) -> Result<Removal, ApiError>;
    async fn retry_job(&self, id: JobId) -> Result<Job, ApiError>;
    async fn cancel_all(&self) -> Result<u64, ApiError>;
    /// Deletes finished jobs with `status`, or every finished job when `None`.
    async fn clear_history(&self, status: Option<JobStatus>) -> Result<u64, ApiError>;
    async fn list_subscriptions(&self) -> Result<Vec<Subscription>, ApiError>;
    async fn create_subscription(
        &self,
        subscription: &NewSubscription,
    ) -> Result<Subscription, ApiError>;
    async fn update_subscription(
        &self,
        id: SubscriptionId,
        update: &SubscriptionUpdate,
    ) -> Result<Subscription, ApiError>;
    async fn delete_subscription(&self, id: SubscriptionId) -> Result<(), ApiError>;
    /// Returns the number of new videos queued by the check.
    async fn check_subscription(&self, id: SubscriptionId) -> Result<u64, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApiClient {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestApiClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        Url::parse(&settings.base_url)
            .map_err(|err| ApiError::InvalidUrl(format!("{}: {err}", settings.base_url)))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let joined = format!("{}/{}", self.settings.base_url.trim_end_matches('/'), path);
        Url::parse(&joined).map_err(|err| ApiError::InvalidUrl(format!("{joined}: {err}")))
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        if !status.is_success() {
            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
                detail: error_detail(&body, status),
            });
        }

        serde_json::from_slice(&body).map_err(|err| ApiError::Decode(err.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        corvid_debug!("GET {url}");
        self.send(self.client.get(url)).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        corvid_debug!("POST {url}");
        let request = self.client.post(url);
        let request = match body {
            Some(body) => request.json(body),
            None => request,
        };
        self.send(request).await
    }

    async fn delete<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        corvid_debug!("DELETE {url}");
        self.send(self.client.delete(url)).await
    }
}

#[async_trait::async_trait]
impl ApiClient for ReqwestApiClient {
    async fn list_jobs(&self, query: &JobQuery) -> Result<HistoryPage, ApiError> {
        let mut url = self.endpoint("jobs")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("page", &query.page.to_string());
            pairs.append_pair("limit", &query.limit.to_string());
            if !query.statuses.is_empty() {
                pairs.append_pair("status", &join_statuses(&query.statuses));
            }
        }
        let response: JobListResponse = self.get(url).await?;
        Ok(response.into())
    }

    async fn create_job(&self, url: &str) -> Result<Job, ApiError> {
        let body = serde_json::json!({ "url": url });
        self.post(self.endpoint("jobs")?, Some(&body)).await
    }

    async fn create_batch(&self, urls: &[String]) -> Result<Vec<Job>, ApiError> {
        let body = serde_json::json!({ "urls": urls });
        self.post(self.endpoint("jobs/batch")?, Some(&body)).await
    }

    async fn remove_job(&self, id: JobId) -> Result<Removal, ApiError> {
        let response: RemoveResponse = self.delete(self.endpoint(&format!("jobs/{id}"))?).await?;
        match response.status.as_str() {
            "cancelled" => Ok(Removal::Cancelled),
            "deleted" => Ok(Removal::Deleted),
            other => Err(ApiError::Decode(format!("unknown removal status '{other}'"))),
        }
    }

    async fn retry_job(&self, id: JobId) -> Result<Job, ApiError> {
        self.post::<_, ()>(self.endpoint(&format!("jobs/{id}/retry"))?, None)
            .await
    }

    async fn cancel_all(&self) -> Result<u64, ApiError> {
        let response: CancelAllResponse = self
            .post::<_, ()>(self.endpoint("jobs/cancel-all")?, None)
            .await?;
        Ok(response.cancelled)
    }

    async fn clear_history(&self, status: Option<JobStatus>) -> Result<u64, ApiError> {
        let mut url = self.endpoint("jobs")?;
        // The server takes a single status here; omitting it clears them all.
        if let Some(status) = status {
            url.query_pairs_mut().append_pair("status", status.as_str());
        }
        let response: ClearResponse = self.delete(url).await?;
        Ok(response.deleted)
    }

    async fn list_subscriptions(&self) -> Result<Vec<Subscription>, ApiError> {
        self.get(self.endpoint("subscriptions")?).await
    }

    async fn create_subscription(
        &self,
        subscription: &NewSubscription,
    ) -> Result<Subscription, ApiError> {
        self.post(self.endpoint("subscriptions")?, Some(subscription))
            .await
    }

    async fn update_subscription(
        &self,
        id: SubscriptionId,
        update: &SubscriptionUpdate,
    ) -> Result<Subscription, ApiError> {
        let url = self.endpoint(&format!("subscriptions/{id}"))?;
        corvid_debug!("PATCH {url}");
        self.send(self.client.patch(url).json(update)).await
    }

    async fn delete_subscription(&self, id: SubscriptionId) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .delete(self.endpoint(&format!("subscriptions/{id}"))?)
            .await?;
        Ok(())
    }

    async fn check_subscription(&self, id: SubscriptionId) -> Result<u64, ApiError> {
        let response: CheckResponse = self
            .post::<_, ()>(self.endpoint(&format!("subscriptions/{id}/check"))?, None)
            .await?;
        Ok(response.new_videos)
    }
}

fn join_statuses(statuses: &[JobStatus]) -> String {
    statuses
        .iter()
        .map(|status| status.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// Pulls the human-readable reason out of an error body, falling back to the
/// status line.
fn error_detail(body: &[u8], status: reqwest::StatusCode) -> String {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(text),
        }) => text,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout;
    }
    if err.is_decode() {
        return ApiError::Decode(err.to_string());
    }
    ApiError::Network(err.to_string())
}
