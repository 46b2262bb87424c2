use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timestamp;

pub type JobId = u64;

/// Lifecycle of a download job as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    FetchingInfo,
    Downloading,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Statuses shown in the historical listing when no filter is selected.
    pub const HISTORICAL: [JobStatus; 3] =
        [JobStatus::Completed, JobStatus::Failed, JobStatus::Cancelled];

    pub fn is_active(self) -> bool {
        !self.is_historical()
    }

    pub fn is_historical(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    /// Wire name, as used in query strings and push payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::FetchingInfo => "fetching_info",
            JobStatus::Downloading => "downloading",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let status = match raw.trim().to_ascii_lowercase().as_str() {
            "queued" => JobStatus::Queued,
            "fetching_info" => JobStatus::FetchingInfo,
            "downloading" => JobStatus::Downloading,
            "processing" => JobStatus::Processing,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            "cancelled" => JobStatus::Cancelled,
            _ => return None,
        };
        Some(status)
    }
}

/// Last known state of one download job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub speed: Option<String>,
    #[serde(default)]
    pub eta: Option<String>,
    /// Post-processing description; only ever set by push events.
    #[serde(default)]
    pub processing_step: Option<String>,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// A bare record, as created locally before any metadata arrives.
    pub fn new(id: JobId, url: impl Into<String>, status: JobStatus) -> Self {
        Self {
            id,
            status,
            url: url.into(),
            video_id: None,
            title: None,
            thumbnail: None,
            source: None,
            progress: 0.0,
            speed: None,
            eta: None,
            processing_step: None,
            output_path: None,
            error_message: None,
            created_at: None,
            completed_at: None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self.status, JobStatus::Failed | JobStatus::Cancelled)
    }

    /// Key for the historical listing: `completed_at`, falling back to `created_at`.
    pub fn history_timestamp(&self) -> Option<DateTime<Utc>> {
        self.completed_at.or(self.created_at)
    }

    /// Title if known, otherwise the source URL.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.url)
    }

    pub(crate) fn apply(&mut self, patch: &JobPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(progress) = patch.progress {
            self.progress = progress.clamp(0.0, 100.0);
        }
        if let Some(speed) = &patch.speed {
            self.speed = speed.clone();
        }
        if let Some(eta) = &patch.eta {
            self.eta = eta.clone();
        }
        if let Some(video_id) = &patch.video_id {
            self.video_id = Some(video_id.clone());
        }
        if let Some(title) = &patch.title {
            self.title = Some(title.clone());
        }
        if let Some(thumbnail) = &patch.thumbnail {
            self.thumbnail = Some(thumbnail.clone());
        }
        if let Some(source) = &patch.source {
            self.source = Some(source.clone());
        }
        if let Some(step) = &patch.processing_step {
            self.processing_step = Some(step.clone());
        }
        if let Some(path) = &patch.output_path {
            self.output_path = Some(path.clone());
        }
        if let Some(message) = &patch.error_message {
            self.error_message = Some(message.clone());
        }
    }
}

/// Partial update for a job. `None` leaves the field untouched.
///
/// `speed` and `eta` are doubly optional so an update can clear them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobPatch {
    pub status: Option<JobStatus>,
    pub progress: Option<f64>,
    pub speed: Option<Option<String>>,
    pub eta: Option<Option<String>>,
    pub video_id: Option<String>,
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    pub source: Option<String>,
    pub processing_step: Option<String>,
    pub output_path: Option<String>,
    pub error_message: Option<String>,
}

/// Status change produced by a store write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub id: JobId,
    pub from: JobStatus,
    pub to: JobStatus,
}

impl Transition {
    pub fn is_change(&self) -> bool {
        self.from != self.to
    }

    /// True when the job just left the active set for the historical one.
    pub fn entered_history(&self) -> bool {
        self.from.is_active() && self.to.is_historical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_partitions_are_disjoint_and_complete() {
        let all = [
            JobStatus::Queued,
            JobStatus::FetchingInfo,
            JobStatus::Downloading,
            JobStatus::Processing,
            JobStatus::Completed,
            JobStatus::Failed,
            JobStatus::Cancelled,
        ];
        for status in all {
            assert_ne!(status.is_active(), status.is_historical(), "{status:?}");
            assert_eq!(JobStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(all.iter().filter(|s| s.is_active()).count(), 4);
    }

    #[test]
    fn patch_keeps_absent_fields_and_can_clear_speed() {
        let mut job = Job::new(3, "https://example.com/v", JobStatus::Downloading);
        job.title = Some("Clip".into());
        job.speed = Some("1.2MiB/s".into());

        job.apply(&JobPatch {
            progress: Some(140.0),
            speed: Some(None),
            ..JobPatch::default()
        });

        assert_eq!(job.title.as_deref(), Some("Clip"));
        assert_eq!(job.progress, 100.0);
        assert_eq!(job.speed, None);
        assert_eq!(job.status, JobStatus::Downloading);
    }
}
