use crate::{
    HistoryPage, Job, JobId, JobStatus, NewSubscription, PushEvent, Subscription, SubscriptionId,
    SubscriptionUpdate,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Client started; load everything once.
    Started,
    /// Periodic poll timer.
    PollTick,
    /// User asked for a full refresh.
    RefreshRequested,
    /// Push channel (re)established.
    ChannelConnected,
    /// Push channel lost; the engine keeps retrying.
    ChannelDisconnected,
    /// Decoded push event, in arrival order.
    Push(PushEvent),
    /// Result of an active-set pull: the full, unfiltered job listing.
    ActivePulled(Vec<Job>),
    HistoryPulled(HistoryPage),
    SubscriptionsPulled(Vec<Subscription>),
    PullFailed { target: PullTarget, message: String },
    /// Debounce timer for a history re-pull expired.
    HistoryRefreshDue { generation: u64 },
    /// User navigated to a page; any value is accepted and clamped.
    PageRequested(i64),
    NextPage,
    PrevPage,
    /// `None` shows every historical status.
    HistoryFilterChanged(Option<JobStatus>),
    ActionRequested(Action),
    ActionSucceeded(ActionOutcome),
    ActionFailed { action: Action, message: String },
    /// User acknowledged the oldest notice.
    NoticeDismissed,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullTarget {
    Active,
    History,
    Subscriptions,
}

/// Server-side operation requested by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Create { url: String },
    CreateBatch { urls: Vec<String> },
    /// Cancels an active job or deletes a finished one.
    Remove(JobId),
    Retry(JobId),
    CancelAll,
    ClearHistory { status: Option<JobStatus> },
    CreateSubscription(NewSubscription),
    UpdateSubscription {
        id: SubscriptionId,
        update: SubscriptionUpdate,
    },
    DeleteSubscription(SubscriptionId),
    CheckSubscription(SubscriptionId),
}

impl Action {
    pub fn describe(&self) -> String {
        match self {
            Action::Create { url } => format!("add {url}"),
            Action::CreateBatch { urls } => format!("add {} downloads", urls.len()),
            Action::Remove(id) => format!("remove download #{id}"),
            Action::Retry(id) => format!("retry download #{id}"),
            Action::CancelAll => "cancel all downloads".to_string(),
            Action::ClearHistory { status: Some(status) } => {
                format!("clear {} downloads", status.as_str())
            }
            Action::ClearHistory { status: None } => "clear history".to_string(),
            Action::CreateSubscription(new) => format!("subscribe to {}", new.url),
            Action::UpdateSubscription { id, .. } => format!("update subscription #{id}"),
            Action::DeleteSubscription(id) => format!("delete subscription #{id}"),
            Action::CheckSubscription(id) => format!("check subscription #{id}"),
        }
    }
}

/// What `DELETE /jobs/{id}` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Cancelled,
    Deleted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Created(Vec<Job>),
    Removed { id: JobId, removal: Removal },
    Retried(Job),
    CancelledAll { count: u64 },
    HistoryCleared { count: u64 },
    SubscriptionSaved(Subscription),
    SubscriptionDeleted(SubscriptionId),
    SubscriptionChecked { id: SubscriptionId, new_videos: u64 },
}
