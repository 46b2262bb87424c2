use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use crate::pagination::PageCursor;
use crate::{Job, JobId, JobPatch, Subscription, SubscriptionId, Transition};

/// One page of the historical listing as returned by a pull.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage {
    pub items: Vec<Job>,
    pub page: u32,
    pub pages: u32,
    pub total: u64,
}

/// Last known state of every job and subscription the client has seen.
///
/// Jobs are indexed into an active set and a historical set by status. The
/// historical page is the ordered slice most recently pulled for display.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SnapshotStore {
    jobs: BTreeMap<JobId, Job>,
    active: BTreeSet<JobId>,
    historical: BTreeSet<JobId>,
    history_page: Vec<JobId>,
    history_total: u64,
    subscriptions: BTreeMap<SubscriptionId, Subscription>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.jobs.get(&id)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn is_active(&self, id: JobId) -> bool {
        self.active.contains(&id)
    }

    pub fn is_historical(&self, id: JobId) -> bool {
        self.historical.contains(&id)
    }

    /// Insert or fully overwrite a job, re-indexing it by its status.
    pub fn put(&mut self, job: Job) -> Option<Transition> {
        let id = job.id;
        let to = job.status;
        let from = self.jobs.insert(id, job).map(|previous| previous.status);
        match from {
            Some(from) => {
                if from != to {
                    self.reindex(id, to);
                }
                Some(Transition { id, from, to })
            }
            None => {
                self.reindex(id, to);
                None
            }
        }
    }

    /// Merge a partial update onto a known job.
    ///
    /// Returns `None` for unknown ids; nothing is stored for them.
    pub fn merge(&mut self, id: JobId, patch: &JobPatch) -> Option<Transition> {
        let job = self.jobs.get_mut(&id)?;
        let from = job.status;
        job.apply(patch);
        let to = job.status;
        if from != to {
            self.reindex(id, to);
        }
        Some(Transition { id, from, to })
    }

    pub fn remove(&mut self, id: JobId) -> Option<Job> {
        self.active.remove(&id);
        if self.historical.remove(&id) {
            self.history_page.retain(|page_id| *page_id != id);
        }
        self.jobs.remove(&id)
    }

    /// Active jobs, newest first (ids increase monotonically).
    pub fn list_active(&self) -> Vec<&Job> {
        self.active
            .iter()
            .rev()
            .filter_map(|id| self.jobs.get(id))
            .collect()
    }

    /// Jobs on the current historical page, most recently finished first.
    pub fn list_historical(&self) -> Vec<&Job> {
        let mut jobs: Vec<&Job> = self
            .history_page
            .iter()
            .filter_map(|id| self.jobs.get(id))
            .filter(|job| job.status.is_historical())
            .collect();
        jobs.sort_by_key(|job| Reverse(job.history_timestamp()));
        jobs
    }

    pub fn history_total(&self) -> u64 {
        self.history_total
    }

    /// Replace the active set with an authoritative listing.
    ///
    /// Non-active records in `jobs` are ignored. Previously active jobs missing
    /// from the listing are dropped.
    pub fn replace_active(&mut self, jobs: Vec<Job>) {
        let incoming: Vec<Job> = jobs
            .into_iter()
            .filter(|job| job.status.is_active())
            .collect();
        let keep: BTreeSet<JobId> = incoming.iter().map(|job| job.id).collect();

        let stale: Vec<JobId> = self.active.difference(&keep).copied().collect();
        for id in stale {
            self.active.remove(&id);
            self.jobs.remove(&id);
        }
        for job in incoming {
            self.put(job);
        }
    }

    /// Replace the current historical page with an authoritative page.
    ///
    /// Historical records not on the new page are dropped. Returns the cursor
    /// the page implies (clamped to the reported page count).
    pub fn replace_history_page(&mut self, page: HistoryPage) -> PageCursor {
        let cursor = PageCursor::new(page.page, page.pages);
        let mut incoming: Vec<Job> = page
            .items
            .into_iter()
            .filter(|job| job.status.is_historical())
            .collect();
        incoming.sort_by_key(|job| Reverse(job.history_timestamp()));
        let keep: BTreeSet<JobId> = incoming.iter().map(|job| job.id).collect();

        let dropped: Vec<JobId> = self.historical.difference(&keep).copied().collect();
        for id in dropped {
            self.historical.remove(&id);
            self.jobs.remove(&id);
        }

        self.history_page = incoming.iter().map(|job| job.id).collect();
        self.history_total = page.total;
        for job in incoming {
            self.put(job);
        }
        cursor
    }

    pub fn subscription(&self, id: SubscriptionId) -> Option<&Subscription> {
        self.subscriptions.get(&id)
    }

    pub fn list_subscriptions(&self) -> Vec<&Subscription> {
        self.subscriptions.values().collect()
    }

    pub fn put_subscription(&mut self, subscription: Subscription) {
        self.subscriptions.insert(subscription.id, subscription);
    }

    pub fn remove_subscription(&mut self, id: SubscriptionId) -> Option<Subscription> {
        self.subscriptions.remove(&id)
    }

    pub fn replace_subscriptions(&mut self, subscriptions: Vec<Subscription>) {
        self.subscriptions = subscriptions
            .into_iter()
            .map(|subscription| (subscription.id, subscription))
            .collect();
    }

    fn reindex(&mut self, id: JobId, status: crate::JobStatus) {
        if status.is_historical() {
            self.active.remove(&id);
            self.historical.insert(id);
        } else {
            if self.historical.remove(&id) {
                self.history_page.retain(|page_id| *page_id != id);
            }
            self.active.insert(id);
        }
    }
}
