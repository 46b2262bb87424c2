use chrono::{Duration, TimeZone, Utc};
use corvid_core::{
    update, AppState, ChannelState, Effect, HistoryPage, HistoryQuery, Job, JobStatus, Msg,
    PageLink, PullTarget, Subscription,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    corvid_logging::initialize_for_tests();
}

fn job(id: u64, status: JobStatus) -> Job {
    Job::new(id, format!("https://videos.example.com/watch?v={id}"), status)
}

fn finished(id: u64, status: JobStatus, minutes_ago: i64) -> Job {
    let base = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let mut job = job(id, status);
    job.created_at = Some(base - Duration::hours(5));
    job.completed_at = Some(base - Duration::minutes(minutes_ago));
    job
}

fn history(items: Vec<Job>, page: u32, pages: u32) -> HistoryPage {
    let total = u64::from(pages) * 25;
    HistoryPage {
        items,
        page,
        pages,
        total,
    }
}

fn active_ids(state: &AppState) -> Vec<u64> {
    state.store().list_active().iter().map(|job| job.id).collect()
}

fn history_ids(state: &AppState) -> Vec<u64> {
    state
        .store()
        .list_historical()
        .iter()
        .map(|job| job.id)
        .collect()
}

#[test]
fn started_pulls_everything() {
    init_logging();
    let (_state, effects) = update(AppState::new(), Msg::Started);

    assert_eq!(
        effects,
        vec![
            Effect::PullActive,
            Effect::PullHistory(HistoryQuery {
                page: 1,
                filter: None
            }),
            Effect::PullSubscriptions,
        ]
    );
}

#[test]
fn active_pull_filters_sorts_and_replaces_wholesale() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::ActivePulled(vec![
            job(3, JobStatus::Queued),
            job(9, JobStatus::Downloading),
            job(4, JobStatus::Completed),
            job(7, JobStatus::FetchingInfo),
        ]),
    );
    assert_eq!(active_ids(&state), vec![9, 7, 3]);
    assert!(state.store().get(4).is_none());
    assert_eq!(state.summary().in_progress, 2);
    assert_eq!(state.summary().queued, 1);

    let (state, _) = update(
        state,
        Msg::ActivePulled(vec![job(9, JobStatus::Processing), job(11, JobStatus::Queued)]),
    );
    assert_eq!(active_ids(&state), vec![11, 9]);
    assert!(state.store().get(3).is_none());
    assert!(state.store().get(7).is_none());
    assert_eq!(state.store().get(9).unwrap().status, JobStatus::Processing);
}

#[test]
fn pull_record_overwrites_pushed_fields() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::ActivePulled(vec![job(5, JobStatus::Downloading)]));
    let (state, _) = update(
        state,
        Msg::Push(corvid_core::PushEvent::Progress {
            id: 5,
            progress: 90.0,
            speed: None,
            eta: None,
        }),
    );

    // A stale pull lands after the push: the pull wins, progress regresses.
    let mut stale = job(5, JobStatus::Downloading);
    stale.progress = 40.0;
    let (state, _) = update(state, Msg::ActivePulled(vec![stale]));
    assert_eq!(state.store().get(5).unwrap().progress, 40.0);
}

#[test]
fn history_page_excludes_active_and_orders_by_completion() {
    init_logging();
    let mut no_completion = job(30, JobStatus::Cancelled);
    no_completion.created_at = Some(Utc.with_ymd_and_hms(2025, 6, 1, 11, 50, 0).unwrap());

    let (mut state, effects) = update(
        AppState::new(),
        Msg::HistoryPulled(history(
            vec![
                finished(21, JobStatus::Completed, 30),
                job(22, JobStatus::Downloading),
                finished(23, JobStatus::Failed, 5),
                no_completion,
            ],
            2,
            4,
        )),
    );

    assert!(effects.is_empty());
    assert!(state.consume_dirty());
    assert_eq!(history_ids(&state), vec![23, 30, 21]);
    assert!(state.store().get(22).is_none());
    assert_eq!(state.cursor().page(), 2);
    assert_eq!(state.cursor().total_pages(), 4);
}

#[test]
fn out_of_range_page_requests_are_clamped_before_pulling() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::HistoryPulled(history(vec![finished(1, JobStatus::Completed, 1)], 3, 10)),
    );

    let (state, effects) = update(state, Msg::PageRequested(0));
    assert_eq!(
        effects,
        vec![Effect::PullHistory(HistoryQuery {
            page: 1,
            filter: None
        })]
    );
    assert_eq!(state.cursor().page(), 1);

    let (state, effects) = update(state, Msg::PageRequested(999));
    assert_eq!(
        effects,
        vec![Effect::PullHistory(HistoryQuery {
            page: 10,
            filter: None
        })]
    );

    let (state, effects) = update(state, Msg::NextPage);
    assert_eq!(
        effects,
        vec![Effect::PullHistory(HistoryQuery {
            page: 10,
            filter: None
        })]
    );
    let (_state, effects) = update(state, Msg::PrevPage);
    assert_eq!(
        effects,
        vec![Effect::PullHistory(HistoryQuery {
            page: 9,
            filter: None
        })]
    );
}

#[test]
fn page_beyond_reported_total_is_clamped_and_repulled() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::HistoryPulled(history(Vec::new(), 6, 3)));

    assert_eq!(state.cursor().page(), 3);
    assert_eq!(
        effects,
        vec![Effect::PullHistory(HistoryQuery {
            page: 3,
            filter: None
        })]
    );
}

#[test]
fn filter_change_resets_to_first_page() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::HistoryPulled(history(vec![finished(1, JobStatus::Completed, 1)], 4, 7)),
    );

    let (state, effects) = update(state, Msg::HistoryFilterChanged(Some(JobStatus::Failed)));
    assert_eq!(
        effects,
        vec![Effect::PullHistory(HistoryQuery {
            page: 1,
            filter: Some(JobStatus::Failed)
        })]
    );
    assert_eq!(state.history_filter(), Some(JobStatus::Failed));

    let (state, effects) = update(state, Msg::HistoryFilterChanged(Some(JobStatus::Queued)));
    assert!(effects.is_empty());
    assert_eq!(state.history_filter(), Some(JobStatus::Failed));
}

#[test]
fn failed_pull_leaves_snapshot_untouched() {
    init_logging();
    let (mut state, _) = update(AppState::new(), Msg::ActivePulled(vec![job(1, JobStatus::Queued)]));
    state.consume_dirty();
    let before = state.clone();

    let (mut state, effects) = update(
        state,
        Msg::PullFailed {
            target: PullTarget::Active,
            message: "connection refused".into(),
        },
    );

    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
    assert_eq!(state, before);
}

#[test]
fn reconnect_after_disconnect_resyncs() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::ChannelConnected);
    assert!(effects.is_empty());
    assert_eq!(state.channel(), ChannelState::Connected);

    let (state, _) = update(state, Msg::ChannelDisconnected);
    assert_eq!(state.channel(), ChannelState::Disconnected);

    let (state, effects) = update(state, Msg::ChannelConnected);
    assert_eq!(
        effects,
        vec![
            Effect::PullActive,
            Effect::PullHistory(state.history_query())
        ]
    );
}

#[test]
fn view_projects_rows_pagination_and_schedule() {
    init_logging();
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let (state, _) = update(
        AppState::new(),
        Msg::ActivePulled(vec![job(2, JobStatus::Downloading), job(3, JobStatus::Queued)]),
    );
    let (state, _) = update(
        state,
        Msg::HistoryPulled(history(vec![finished(1, JobStatus::Failed, 3)], 1, 10)),
    );
    let (state, _) = update(
        state,
        Msg::SubscriptionsPulled(vec![Subscription {
            id: 1,
            url: "https://videos.example.com/@channel".into(),
            name: "Channel".into(),
            enabled: true,
            check_interval_hours: 6,
            last_checked: Some(now - Duration::hours(2)),
            last_video_count: 14,
            created_at: None,
            keep_last_n: Some(5),
            include_members: false,
            title_filter: None,
        }]),
    );

    let view = state.view(now);
    assert_eq!(view.status_line, "1 downloading, 1 queued");
    assert_eq!(view.title_annotation.as_deref(), Some("(2) "));
    assert_eq!(
        view.active.iter().map(|row| row.job_id).collect::<Vec<_>>(),
        vec![3, 2]
    );
    assert!(view.history[0].retryable);
    assert_eq!(view.page_links.len(), 7);
    assert_eq!(view.page_links[5], PageLink::Ellipsis);
    assert_eq!(view.subscriptions[0].next_check, "in 4h 0m");
    assert!(!view.subscriptions[0].overdue);
}
