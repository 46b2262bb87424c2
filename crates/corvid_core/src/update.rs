use corvid_logging::{corvid_debug, corvid_info, corvid_warn};

use crate::pagination::PageCursor;
use crate::{
    Action, ActionOutcome, AppState, ChannelState, Effect, HistoryPage, JobStatus, Msg,
    NoticeLevel, PushEvent, Removal,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Started | Msg::RefreshRequested => vec![
            Effect::PullActive,
            Effect::PullHistory(state.history_query()),
            Effect::PullSubscriptions,
        ],
        Msg::PollTick => vec![Effect::PullActive],
        Msg::ChannelConnected => {
            let previous = state.set_channel(ChannelState::Connected);
            if previous == ChannelState::Disconnected {
                // Events may have been missed while offline.
                vec![
                    Effect::PullActive,
                    Effect::PullHistory(state.history_query()),
                ]
            } else {
                Vec::new()
            }
        }
        Msg::ChannelDisconnected => {
            state.set_channel(ChannelState::Disconnected);
            Vec::new()
        }
        Msg::Push(event) => apply_push(&mut state, event),
        Msg::ActivePulled(jobs) => {
            state.store_mut().replace_active(jobs);
            state.recompute_summary();
            state.mark_dirty();
            Vec::new()
        }
        Msg::HistoryPulled(page) => apply_history_page(&mut state, page),
        Msg::SubscriptionsPulled(subscriptions) => {
            state.store_mut().replace_subscriptions(subscriptions);
            state.mark_dirty();
            Vec::new()
        }
        Msg::PullFailed { target, message } => {
            corvid_warn!("{:?} pull failed, keeping previous snapshot: {}", target, message);
            Vec::new()
        }
        Msg::HistoryRefreshDue { generation } => {
            if state.take_history_refresh(generation) {
                vec![Effect::PullHistory(state.history_query())]
            } else {
                corvid_debug!("Ignoring superseded history refresh {}", generation);
                Vec::new()
            }
        }
        Msg::PageRequested(requested) => go_to_page(&mut state, requested),
        Msg::NextPage => {
            let next = i64::from(state.cursor().page()) + 1;
            go_to_page(&mut state, next)
        }
        Msg::PrevPage => {
            let previous = i64::from(state.cursor().page()) - 1;
            go_to_page(&mut state, previous)
        }
        Msg::HistoryFilterChanged(filter) => {
            if filter.is_some_and(JobStatus::is_active) {
                corvid_warn!("Ignoring history filter on active status {:?}", filter);
                return (state, Vec::new());
            }
            state.set_history_filter(filter);
            let total = state.cursor().total_pages();
            state.set_cursor(PageCursor::new(1, total));
            vec![Effect::PullHistory(state.history_query())]
        }
        Msg::ActionRequested(action) => request_action(action),
        Msg::ActionSucceeded(outcome) => apply_outcome(&mut state, outcome),
        Msg::ActionFailed { action, message } => {
            corvid_warn!("Action failed ({}): {}", action.describe(), message);
            state.push_notice(
                NoticeLevel::Error,
                format!("Could not {}: {}", action.describe(), message),
            );
            Vec::new()
        }
        Msg::NoticeDismissed => {
            state.dismiss_notice();
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Merge a push event into the store.
///
/// Events for unknown jobs are dropped, as are progress events and active
/// statuses for a finished job; only a retry or a pull may reactivate it.
/// Metadata-only status frames still merge.
fn apply_push(state: &mut AppState, event: PushEvent) -> Vec<Effect> {
    let id = event.job_id();
    let Some(current) = state.store().get(id).map(|job| job.status) else {
        corvid_debug!("Dropping {} event for unknown job {}", event.kind(), id);
        return Vec::new();
    };
    if current.is_historical() {
        let reactivates = matches!(event, PushEvent::Progress { .. })
            || event.target_status().is_some_and(JobStatus::is_active);
        if reactivates {
            corvid_debug!(
                "Dropping late {} event for finished job {} ({:?})",
                event.kind(),
                id,
                current
            );
            return Vec::new();
        }
    }

    let Some(transition) = state.store_mut().merge(id, &event.to_patch()) else {
        return Vec::new();
    };
    state.mark_dirty();
    if !transition.is_change() {
        return Vec::new();
    }

    state.recompute_summary();
    let mut effects = Vec::new();
    if transition.entered_history() {
        if matches!(event, PushEvent::Completed { .. }) {
            effects.push(Effect::RefreshFiles);
        }
        if state.history_filter_matches(transition.to) {
            effects.push(state.schedule_history_refresh());
        }
    }
    effects
}

fn apply_history_page(state: &mut AppState, page: HistoryPage) -> Vec<Effect> {
    let reported = page.page;
    let cursor = state.store_mut().replace_history_page(page);
    state.set_cursor(cursor);
    state.mark_dirty();
    if cursor.page() < reported {
        // Listing shrank under us; show the last page that still exists.
        corvid_debug!(
            "History page {} beyond last page {}, re-pulling",
            reported,
            cursor.total_pages()
        );
        vec![Effect::PullHistory(state.history_query())]
    } else {
        Vec::new()
    }
}

fn go_to_page(state: &mut AppState, requested: i64) -> Vec<Effect> {
    let cursor = state.cursor();
    let page = cursor.clamp(requested);
    state.set_cursor(PageCursor::new(page, cursor.total_pages()));
    vec![Effect::PullHistory(state.history_query())]
}

fn request_action(action: Action) -> Vec<Effect> {
    let action = match action {
        Action::Create { url } => {
            let url = url.trim().to_string();
            if url.is_empty() {
                return Vec::new();
            }
            Action::Create { url }
        }
        Action::CreateBatch { urls } => {
            let urls: Vec<String> = urls
                .iter()
                .map(|url| url.trim())
                .filter(|url| !url.is_empty())
                .map(ToOwned::to_owned)
                .collect();
            match urls.len() {
                0 => return Vec::new(),
                1 => Action::Create {
                    url: urls.into_iter().next().unwrap_or_default(),
                },
                _ => Action::CreateBatch { urls },
            }
        }
        other => other,
    };
    vec![Effect::Perform(action)]
}

fn apply_outcome(state: &mut AppState, outcome: ActionOutcome) -> Vec<Effect> {
    match outcome {
        ActionOutcome::Created(jobs) => {
            corvid_info!("Server accepted {} new download(s)", jobs.len());
            for job in jobs {
                state.store_mut().put(job);
            }
            state.recompute_summary();
            state.mark_dirty();
            Vec::new()
        }
        ActionOutcome::Removed {
            id,
            removal: Removal::Cancelled,
        } => apply_push(state, PushEvent::Cancelled { id }),
        ActionOutcome::Removed {
            id,
            removal: Removal::Deleted,
        } => {
            state.store_mut().remove(id);
            state.recompute_summary();
            state.mark_dirty();
            vec![Effect::PullHistory(state.history_query())]
        }
        ActionOutcome::Retried(job) => {
            let was_listed = state.store().is_historical(job.id);
            state.store_mut().put(job);
            state.recompute_summary();
            state.mark_dirty();
            if was_listed {
                // The page lost a row; fetch the one that slides in.
                vec![state.schedule_history_refresh()]
            } else {
                Vec::new()
            }
        }
        ActionOutcome::CancelledAll { count } => {
            state.push_notice(NoticeLevel::Info, format!("Cancelled {count} download(s)"));
            vec![
                Effect::PullActive,
                Effect::PullHistory(state.history_query()),
            ]
        }
        ActionOutcome::HistoryCleared { count } => {
            state.push_notice(NoticeLevel::Info, format!("Removed {count} finished download(s)"));
            let total = state.cursor().total_pages();
            state.set_cursor(PageCursor::new(1, total));
            vec![Effect::PullHistory(state.history_query())]
        }
        ActionOutcome::SubscriptionSaved(subscription) => {
            state.store_mut().put_subscription(subscription);
            state.mark_dirty();
            Vec::new()
        }
        ActionOutcome::SubscriptionDeleted(id) => {
            state.store_mut().remove_subscription(id);
            state.mark_dirty();
            Vec::new()
        }
        ActionOutcome::SubscriptionChecked { id, new_videos } => {
            let name = state
                .store()
                .subscription(id)
                .map(|subscription| subscription.name.clone())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| format!("subscription #{id}"));
            state.push_notice(
                NoticeLevel::Info,
                format!("{name}: {new_videos} new video(s) queued"),
            );
            vec![Effect::PullSubscriptions, Effect::PullActive]
        }
    }
}
