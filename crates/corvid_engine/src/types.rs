use corvid_core::{
    Action, ActionOutcome, HistoryPage, Job, JobStatus, Msg, PullTarget, Subscription,
};
use serde::Deserialize;

/// What the engine reports back to the application.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    ActivePulled(Result<Vec<Job>, ApiError>),
    HistoryPulled(Result<HistoryPage, ApiError>),
    SubscriptionsPulled(Result<Vec<Subscription>, ApiError>),
    ActionCompleted {
        action: Action,
        result: Result<ActionOutcome, ApiError>,
    },
    Channel(ChannelEvent),
    /// A history-refresh timer ran to completion.
    TimerFired { generation: u64 },
}

impl EngineEvent {
    /// Translate into the message the reconciliation core understands.
    pub fn into_msg(self) -> Msg {
        match self {
            EngineEvent::ActivePulled(Ok(jobs)) => Msg::ActivePulled(jobs),
            EngineEvent::ActivePulled(Err(err)) => pull_failed(PullTarget::Active, err),
            EngineEvent::HistoryPulled(Ok(page)) => Msg::HistoryPulled(page),
            EngineEvent::HistoryPulled(Err(err)) => pull_failed(PullTarget::History, err),
            EngineEvent::SubscriptionsPulled(Ok(list)) => Msg::SubscriptionsPulled(list),
            EngineEvent::SubscriptionsPulled(Err(err)) => {
                pull_failed(PullTarget::Subscriptions, err)
            }
            EngineEvent::ActionCompleted { result: Ok(outcome), .. } => {
                Msg::ActionSucceeded(outcome)
            }
            EngineEvent::ActionCompleted {
                action,
                result: Err(err),
            } => Msg::ActionFailed {
                action,
                message: err.user_message(),
            },
            EngineEvent::Channel(ChannelEvent::Connected) => Msg::ChannelConnected,
            EngineEvent::Channel(ChannelEvent::Disconnected) => Msg::ChannelDisconnected,
            EngineEvent::Channel(ChannelEvent::Push(event)) => Msg::Push(event),
            EngineEvent::TimerFired { generation } => Msg::HistoryRefreshDue { generation },
        }
    }
}

fn pull_failed(target: PullTarget, err: ApiError) -> Msg {
    Msg::PullFailed {
        target,
        message: err.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Connected,
    Disconnected,
    Push(corvid_core::PushEvent),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("server returned {status}: {detail}")]
    HttpStatus { status: u16, detail: String },
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Text for a notice: the server's own reason when it gave one.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::HttpStatus { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}

/// Parameters of `GET /jobs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobQuery {
    pub page: u32,
    pub limit: u32,
    /// Empty means no status filter.
    pub statuses: Vec<JobStatus>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobListResponse {
    #[serde(alias = "downloads")]
    pub items: Vec<Job>,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "first_page")]
    pub pages: u32,
    #[serde(default)]
    pub total: u64,
}

impl From<JobListResponse> for HistoryPage {
    fn from(response: JobListResponse) -> Self {
        HistoryPage {
            items: response.items,
            page: response.page,
            pages: response.pages,
            total: response.total,
        }
    }
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub(crate) struct RemoveResponse {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CancelAllResponse {
    pub cancelled: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClearResponse {
    pub deleted: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CheckResponse {
    pub new_videos: u64,
}

/// FastAPI-style error body.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: serde_json::Value,
}
