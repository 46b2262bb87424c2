use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::effect::{Effect, HistoryQuery};
use crate::pagination::PageCursor;
use crate::status::StatusSummary;
use crate::store::SnapshotStore;
use crate::view_model::{AppViewModel, JobRowView, SubscriptionRowView};
use crate::JobStatus;

/// Quiet period before re-pulling history after a terminal push event.
pub const HISTORY_REFRESH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Oldest notices are discarded beyond this many.
const MAX_NOTICES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelState {
    #[default]
    Connecting,
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Message shown to the user until dismissed. Errors are blocking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    store: SnapshotStore,
    cursor: PageCursor,
    history_filter: Option<JobStatus>,
    channel: ChannelState,
    summary: StatusSummary,
    /// Generation of the history-refresh timer currently armed, if any.
    pending_history_refresh: Option<u64>,
    refresh_generation: u64,
    notices: Vec<Notice>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut SnapshotStore {
        &mut self.store
    }

    pub fn cursor(&self) -> PageCursor {
        self.cursor
    }

    pub(crate) fn set_cursor(&mut self, cursor: PageCursor) {
        if self.cursor != cursor {
            self.cursor = cursor;
            self.dirty = true;
        }
    }

    pub fn history_filter(&self) -> Option<JobStatus> {
        self.history_filter
    }

    pub(crate) fn set_history_filter(&mut self, filter: Option<JobStatus>) {
        self.history_filter = filter;
        self.dirty = true;
    }

    pub fn channel(&self) -> ChannelState {
        self.channel
    }

    pub(crate) fn set_channel(&mut self, channel: ChannelState) -> ChannelState {
        let previous = self.channel;
        if previous != channel {
            self.channel = channel;
            self.dirty = true;
        }
        previous
    }

    pub fn summary(&self) -> StatusSummary {
        self.summary
    }

    /// Recount active jobs. Linear in the size of the active set.
    pub(crate) fn recompute_summary(&mut self) {
        let summary = StatusSummary::from_jobs(self.store.list_active());
        if summary != self.summary {
            self.summary = summary;
            self.dirty = true;
        }
    }

    pub fn pending_history_refresh(&self) -> Option<u64> {
        self.pending_history_refresh
    }

    /// Query for the page currently shown.
    pub fn history_query(&self) -> HistoryQuery {
        HistoryQuery {
            page: self.cursor.page(),
            filter: self.history_filter,
        }
    }

    /// Whether a job that just became `status` belongs in the current history view.
    pub(crate) fn history_filter_matches(&self, status: JobStatus) -> bool {
        match self.history_filter {
            Some(filter) => filter == status,
            None => status.is_historical(),
        }
    }

    /// Arm (or re-arm) the debounced history refresh.
    pub(crate) fn schedule_history_refresh(&mut self) -> Effect {
        self.refresh_generation += 1;
        self.pending_history_refresh = Some(self.refresh_generation);
        Effect::ScheduleHistoryRefresh {
            generation: self.refresh_generation,
            delay: HISTORY_REFRESH_DEBOUNCE,
        }
    }

    /// Disarm the timer if `generation` is the armed one.
    pub(crate) fn take_history_refresh(&mut self, generation: u64) -> bool {
        if self.pending_history_refresh == Some(generation) {
            self.pending_history_refresh = None;
            true
        } else {
            false
        }
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub(crate) fn push_notice(&mut self, level: NoticeLevel, text: impl Into<String>) {
        if self.notices.len() >= MAX_NOTICES {
            self.notices.remove(0);
        }
        self.notices.push(Notice {
            level,
            text: text.into(),
        });
        self.dirty = true;
    }

    pub(crate) fn dismiss_notice(&mut self) {
        if !self.notices.is_empty() {
            self.notices.remove(0);
            self.dirty = true;
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether a redraw is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Project the state for rendering. `now` drives subscription schedules.
    pub fn view(&self, now: DateTime<Utc>) -> AppViewModel {
        AppViewModel {
            channel: self.channel,
            status_line: self.summary.display(),
            title_annotation: self.summary.title_annotation(),
            active: self
                .store
                .list_active()
                .into_iter()
                .map(JobRowView::from_job)
                .collect(),
            history: self
                .store
                .list_historical()
                .into_iter()
                .map(JobRowView::from_job)
                .collect(),
            history_filter: self.history_filter,
            history_total: self.store.history_total(),
            page: self.cursor.page(),
            total_pages: self.cursor.total_pages(),
            page_links: self.cursor.window(),
            subscriptions: self
                .store
                .list_subscriptions()
                .into_iter()
                .map(|subscription| SubscriptionRowView::from_subscription(subscription, now))
                .collect(),
            notices: self.notices.clone(),
            dirty: self.dirty,
        }
    }
}
