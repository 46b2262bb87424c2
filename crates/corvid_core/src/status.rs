use crate::{Job, JobStatus};

/// Counts behind the persistent status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusSummary {
    /// Jobs fetching info, downloading or processing.
    pub in_progress: usize,
    pub queued: usize,
}

impl StatusSummary {
    pub fn from_jobs<'a>(jobs: impl IntoIterator<Item = &'a Job>) -> Self {
        jobs.into_iter()
            .fold(Self::default(), |mut summary, job| {
                match job.status {
                    JobStatus::FetchingInfo | JobStatus::Downloading | JobStatus::Processing => {
                        summary.in_progress += 1
                    }
                    JobStatus::Queued => summary.queued += 1,
                    JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled => {}
                }
                summary
            })
    }

    pub fn is_idle(&self) -> bool {
        self.in_progress == 0 && self.queued == 0
    }

    pub fn display(&self) -> String {
        match (self.in_progress, self.queued) {
            (0, 0) => "Idle".to_string(),
            (active, 0) => format!("{active} downloading"),
            (0, queued) => format!("{queued} queued"),
            (active, queued) => format!("{active} downloading, {queued} queued"),
        }
    }

    /// Prefix for the window/terminal title, cleared when nothing is pending.
    pub fn title_annotation(&self) -> Option<String> {
        if self.is_idle() {
            None
        } else {
            Some(format!("({}) ", self.in_progress + self.queued))
        }
    }
}
