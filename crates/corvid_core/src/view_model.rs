use chrono::{DateTime, Utc};

use crate::pagination::PageLink;
use crate::{ChannelState, Job, JobId, JobStatus, Notice, Subscription, SubscriptionId};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub channel: ChannelState,
    pub status_line: String,
    pub title_annotation: Option<String>,
    pub active: Vec<JobRowView>,
    pub history: Vec<JobRowView>,
    pub history_filter: Option<JobStatus>,
    pub history_total: u64,
    pub page: u32,
    pub total_pages: u32,
    pub page_links: Vec<PageLink>,
    pub subscriptions: Vec<SubscriptionRowView>,
    pub notices: Vec<Notice>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobRowView {
    pub job_id: JobId,
    pub title: String,
    pub source: Option<String>,
    pub status: JobStatus,
    pub progress: f64,
    pub speed: Option<String>,
    pub eta: Option<String>,
    /// Processing step while processing, error text once failed.
    pub detail: Option<String>,
    pub retryable: bool,
}

impl JobRowView {
    pub(crate) fn from_job(job: &Job) -> Self {
        let detail = match job.status {
            JobStatus::Processing => job.processing_step.clone(),
            JobStatus::Failed => job.error_message.clone(),
            _ => None,
        };
        let downloading = job.status == JobStatus::Downloading;
        Self {
            job_id: job.id,
            title: job.display_title().to_string(),
            source: job.source.clone(),
            status: job.status,
            progress: job.progress,
            speed: job.speed.clone().filter(|_| downloading),
            eta: job.eta.clone().filter(|_| downloading),
            detail,
            retryable: job.is_retryable(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionRowView {
    pub id: SubscriptionId,
    pub name: String,
    pub url: String,
    pub enabled: bool,
    pub next_check: String,
    pub overdue: bool,
    pub last_video_count: u32,
}

impl SubscriptionRowView {
    pub(crate) fn from_subscription(subscription: &Subscription, now: DateTime<Utc>) -> Self {
        let schedule = subscription.schedule(now);
        Self {
            id: subscription.id,
            name: if subscription.name.is_empty() {
                subscription.url.clone()
            } else {
                subscription.name.clone()
            },
            url: subscription.url.clone(),
            enabled: subscription.enabled,
            next_check: schedule.label,
            overdue: schedule.overdue,
            last_video_count: subscription.last_video_count,
        }
    }
}
