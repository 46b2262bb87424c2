use std::time::Duration;

use crate::{Action, JobStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Fetch every job and rebuild the active set.
    PullActive,
    /// Fetch one page of the historical listing.
    PullHistory(HistoryQuery),
    PullSubscriptions,
    /// Replace any pending history-refresh timer with a new one.
    ScheduleHistoryRefresh { generation: u64, delay: Duration },
    /// A download finished; the file listing is out of date.
    RefreshFiles,
    Perform(Action),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryQuery {
    pub page: u32,
    /// Single status filter; `None` means every historical status.
    pub filter: Option<JobStatus>,
}

impl HistoryQuery {
    pub fn statuses(&self) -> Vec<JobStatus> {
        match self.filter {
            Some(status) => vec![status],
            None => JobStatus::HISTORICAL.to_vec(),
        }
    }
}
