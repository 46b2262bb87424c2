use serde::Deserialize;

use crate::{JobId, JobPatch, JobStatus};

/// Server-initiated update for one job, tagged by `type` on the wire.
///
/// `status` and `info` frames share a shape: `info` simply carries more of it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushEvent {
    #[serde(alias = "info")]
    Status {
        id: JobId,
        #[serde(default)]
        status: Option<JobStatus>,
        #[serde(default)]
        video_id: Option<String>,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        thumbnail: Option<String>,
        #[serde(default)]
        source: Option<String>,
    },
    Progress {
        id: JobId,
        #[serde(default)]
        progress: f64,
        #[serde(default)]
        speed: Option<String>,
        #[serde(default)]
        eta: Option<String>,
    },
    Processing {
        id: JobId,
        #[serde(default, alias = "step")]
        processing_step: Option<String>,
    },
    Completed {
        id: JobId,
        #[serde(default)]
        output_path: Option<String>,
    },
    Error {
        id: JobId,
        #[serde(default, alias = "error_message")]
        error: Option<String>,
    },
    Cancelled {
        id: JobId,
    },
}

impl PushEvent {
    pub fn job_id(&self) -> JobId {
        match self {
            PushEvent::Status { id, .. }
            | PushEvent::Progress { id, .. }
            | PushEvent::Processing { id, .. }
            | PushEvent::Completed { id, .. }
            | PushEvent::Error { id, .. }
            | PushEvent::Cancelled { id } => *id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PushEvent::Status { .. } => "status",
            PushEvent::Progress { .. } => "progress",
            PushEvent::Processing { .. } => "processing",
            PushEvent::Completed { .. } => "completed",
            PushEvent::Error { .. } => "error",
            PushEvent::Cancelled { .. } => "cancelled",
        }
    }

    /// Status this event moves the job to, if any.
    pub fn target_status(&self) -> Option<JobStatus> {
        match self {
            PushEvent::Status { status, .. } => *status,
            PushEvent::Progress { .. } => None,
            PushEvent::Processing { .. } => Some(JobStatus::Processing),
            PushEvent::Completed { .. } => Some(JobStatus::Completed),
            PushEvent::Error { .. } => Some(JobStatus::Failed),
            PushEvent::Cancelled { .. } => Some(JobStatus::Cancelled),
        }
    }

    /// Field-level changes to merge onto the stored job.
    pub fn to_patch(&self) -> JobPatch {
        match self {
            PushEvent::Status {
                status,
                video_id,
                title,
                thumbnail,
                source,
                ..
            } => JobPatch {
                status: *status,
                video_id: video_id.clone(),
                title: title.clone(),
                thumbnail: thumbnail.clone(),
                source: source.clone(),
                ..JobPatch::default()
            },
            PushEvent::Progress {
                progress,
                speed,
                eta,
                ..
            } => JobPatch {
                progress: Some(*progress),
                speed: Some(speed.clone()),
                eta: Some(eta.clone()),
                ..JobPatch::default()
            },
            PushEvent::Processing {
                processing_step, ..
            } => JobPatch {
                status: Some(JobStatus::Processing),
                progress: Some(100.0),
                speed: Some(None),
                eta: Some(None),
                processing_step: Some(
                    processing_step
                        .clone()
                        .unwrap_or_else(|| "Processing...".to_string()),
                ),
                ..JobPatch::default()
            },
            PushEvent::Completed { output_path, .. } => JobPatch {
                status: Some(JobStatus::Completed),
                progress: Some(100.0),
                speed: Some(None),
                eta: Some(None),
                output_path: output_path.clone(),
                ..JobPatch::default()
            },
            PushEvent::Error { error, .. } => JobPatch {
                status: Some(JobStatus::Failed),
                speed: Some(None),
                eta: Some(None),
                error_message: Some(error.clone().unwrap_or_else(|| "Unknown error".to_string())),
                ..JobPatch::default()
            },
            PushEvent::Cancelled { .. } => JobPatch {
                status: Some(JobStatus::Cancelled),
                progress: Some(0.0),
                speed: Some(None),
                eta: Some(None),
                ..JobPatch::default()
            },
        }
    }
}
