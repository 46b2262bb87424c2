use std::sync::Once;

use corvid_core::{
    update, AppState, Effect, Job, JobStatus, Msg, PushEvent, HISTORY_REFRESH_DEBOUNCE,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(corvid_logging::initialize_for_tests);
}

fn job(id: u64, status: JobStatus) -> Job {
    Job::new(id, format!("https://videos.example.com/watch?v={id}"), status)
}

fn with_active(jobs: Vec<Job>) -> AppState {
    let (mut state, _) = update(AppState::new(), Msg::ActivePulled(jobs));
    state.consume_dirty();
    state
}

fn push(state: AppState, event: PushEvent) -> (AppState, Vec<Effect>) {
    update(state, Msg::Push(event))
}

#[test]
fn info_event_fills_metadata_and_status() {
    init_logging();
    let state = with_active(vec![job(1, JobStatus::FetchingInfo)]);

    let (mut state, effects) = push(
        state,
        PushEvent::Status {
            id: 1,
            status: Some(JobStatus::Downloading),
            video_id: Some("abc123".into()),
            title: Some("Launch stream".into()),
            thumbnail: Some("https://img.example.com/abc.jpg".into()),
            source: None,
        },
    );

    assert!(effects.is_empty());
    assert!(state.consume_dirty());
    let stored = state.store().get(1).unwrap();
    assert_eq!(stored.status, JobStatus::Downloading);
    assert_eq!(stored.title.as_deref(), Some("Launch stream"));
    assert_eq!(stored.video_id.as_deref(), Some("abc123"));
    assert_eq!(stored.source, None);
}

#[test]
fn progress_event_never_changes_status() {
    init_logging();
    let state = with_active(vec![job(2, JobStatus::Downloading)]);

    let (state, effects) = push(
        state,
        PushEvent::Progress {
            id: 2,
            progress: 37.5,
            speed: Some("3.1MiB/s".into()),
            eta: Some("00:42".into()),
        },
    );

    assert!(effects.is_empty());
    let stored = state.store().get(2).unwrap();
    assert_eq!(stored.status, JobStatus::Downloading);
    assert_eq!(stored.progress, 37.5);
    assert_eq!(stored.speed.as_deref(), Some("3.1MiB/s"));
    assert_eq!(stored.eta.as_deref(), Some("00:42"));
}

#[test]
fn processing_event_pins_progress_and_sets_step() {
    init_logging();
    let state = with_active(vec![job(3, JobStatus::Downloading)]);

    let (state, _) = push(
        state,
        PushEvent::Processing {
            id: 3,
            processing_step: Some("Merging formats".into()),
        },
    );

    let stored = state.store().get(3).unwrap();
    assert_eq!(stored.status, JobStatus::Processing);
    assert_eq!(stored.progress, 100.0);
    assert_eq!(stored.processing_step.as_deref(), Some("Merging formats"));
    assert_eq!(state.summary().in_progress, 1);
}

#[test]
fn completed_event_moves_job_once_even_when_repeated() {
    init_logging();
    let state = with_active(vec![job(4, JobStatus::Downloading), job(5, JobStatus::Queued)]);
    let completed = PushEvent::Completed {
        id: 4,
        output_path: Some("channel/20240101_clip.mp4".into()),
    };

    let (state, effects) = push(state, completed.clone());
    assert_eq!(
        effects,
        vec![
            Effect::RefreshFiles,
            Effect::ScheduleHistoryRefresh {
                generation: 1,
                delay: HISTORY_REFRESH_DEBOUNCE,
            },
        ]
    );
    let stored = state.store().get(4).unwrap();
    assert_eq!(stored.status, JobStatus::Completed);
    assert_eq!(stored.progress, 100.0);
    assert_eq!(stored.speed, None);
    assert_eq!(stored.output_path.as_deref(), Some("channel/20240101_clip.mp4"));
    assert!(state.store().is_historical(4));
    assert_eq!(state.summary().in_progress, 0);
    assert_eq!(state.summary().queued, 1);

    let (state, effects) = push(state, completed);
    assert!(effects.is_empty());
    assert!(state.store().is_historical(4));
    assert_eq!(state.store().list_active().len(), 1);
    assert_eq!(state.pending_history_refresh(), Some(1));
}

#[test]
fn error_event_keeps_progress_and_marks_retryable() {
    init_logging();
    let mut downloading = job(6, JobStatus::Downloading);
    downloading.progress = 61.0;
    let state = with_active(vec![downloading]);

    let (state, effects) = push(
        state,
        PushEvent::Error {
            id: 6,
            error: Some("HTTP Error 403: Forbidden".into()),
        },
    );

    assert!(!effects.contains(&Effect::RefreshFiles));
    let stored = state.store().get(6).unwrap();
    assert_eq!(stored.status, JobStatus::Failed);
    assert_eq!(stored.progress, 61.0);
    assert_eq!(stored.error_message.as_deref(), Some("HTTP Error 403: Forbidden"));
    assert!(stored.is_retryable());
    assert!(state.store().list_active().is_empty());
}

#[test]
fn cancelled_event_resets_progress() {
    init_logging();
    let mut downloading = job(7, JobStatus::Downloading);
    downloading.progress = 80.0;
    let state = with_active(vec![downloading]);

    let (state, _) = push(state, PushEvent::Cancelled { id: 7 });

    let stored = state.store().get(7).unwrap();
    assert_eq!(stored.status, JobStatus::Cancelled);
    assert_eq!(stored.progress, 0.0);
    assert!(stored.is_retryable());
}

#[test]
fn unknown_job_events_are_dropped() {
    init_logging();
    let state = with_active(vec![job(1, JobStatus::Queued)]);
    let before = state.clone();

    let (mut state, effects) = push(
        state,
        PushEvent::Completed {
            id: 999,
            output_path: None,
        },
    );

    assert!(effects.is_empty());
    assert!(state.store().get(999).is_none());
    assert!(!state.consume_dirty());
    assert_eq!(state, before);
}

#[test]
fn finished_job_never_reenters_active_from_push() {
    init_logging();
    let state = with_active(vec![job(8, JobStatus::Downloading)]);
    let (state, _) = push(state, PushEvent::Cancelled { id: 8 });

    let (state, _) = push(
        state,
        PushEvent::Progress {
            id: 8,
            progress: 55.0,
            speed: None,
            eta: None,
        },
    );
    let (state, _) = push(
        state,
        PushEvent::Status {
            id: 8,
            status: Some(JobStatus::Downloading),
            video_id: None,
            title: None,
            thumbnail: None,
            source: None,
        },
    );

    let stored = state.store().get(8).unwrap();
    assert_eq!(stored.status, JobStatus::Cancelled);
    assert_eq!(stored.progress, 0.0);
    assert!(state.store().list_active().is_empty());
}

#[test]
fn debounce_only_when_filter_matches() {
    init_logging();
    let state = with_active(vec![job(9, JobStatus::Downloading), job(10, JobStatus::Downloading)]);
    let (state, _) = update(state, Msg::HistoryFilterChanged(Some(JobStatus::Failed)));

    let (state, effects) = push(
        state,
        PushEvent::Completed {
            id: 9,
            output_path: None,
        },
    );
    assert_eq!(effects, vec![Effect::RefreshFiles]);
    assert_eq!(state.pending_history_refresh(), None);

    let (state, effects) = push(state, PushEvent::Error { id: 10, error: None });
    assert_eq!(
        effects,
        vec![Effect::ScheduleHistoryRefresh {
            generation: 1,
            delay: HISTORY_REFRESH_DEBOUNCE,
        }]
    );
    assert_eq!(state.pending_history_refresh(), Some(1));
}

#[test]
fn burst_of_terminal_events_reschedules_single_refresh() {
    init_logging();
    let state = with_active((1..=3).map(|id| job(id, JobStatus::Downloading)).collect());

    let (state, _) = push(state, PushEvent::Cancelled { id: 1 });
    let (state, _) = push(state, PushEvent::Cancelled { id: 2 });
    let (state, _) = push(state, PushEvent::Cancelled { id: 3 });
    assert_eq!(state.pending_history_refresh(), Some(3));

    // Stale timers fire and are ignored.
    let (state, effects) = update(state, Msg::HistoryRefreshDue { generation: 1 });
    assert!(effects.is_empty());
    let (state, effects) = update(state, Msg::HistoryRefreshDue { generation: 2 });
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::HistoryRefreshDue { generation: 3 });
    assert_eq!(effects, vec![Effect::PullHistory(state.history_query())]);
    assert_eq!(state.pending_history_refresh(), None);

    let (_state, effects) = update(state, Msg::HistoryRefreshDue { generation: 3 });
    assert!(effects.is_empty());
}

#[test]
fn push_events_decode_from_wire_json() {
    let event: PushEvent = serde_json::from_str(
        r#"{"type":"info","id":12,"video_id":"xyz","title":"Talk","thumbnail":null,"status":"downloading"}"#,
    )
    .unwrap();
    assert_eq!(
        event,
        PushEvent::Status {
            id: 12,
            status: Some(JobStatus::Downloading),
            video_id: Some("xyz".into()),
            title: Some("Talk".into()),
            thumbnail: None,
            source: None,
        }
    );

    let event: PushEvent =
        serde_json::from_str(r#"{"type":"progress","id":12,"progress":12,"speed":null}"#).unwrap();
    assert_eq!(event.job_id(), 12);
    assert_eq!(event.kind(), "progress");

    assert!(serde_json::from_str::<PushEvent>(r#"{"type":"heartbeat","id":1}"#).is_err());
}

#[test]
fn metadata_frame_for_finished_job_still_merges() {
    init_logging();
    let state = with_active(vec![job(11, JobStatus::Downloading)]);
    let (state, _) = push(
        state,
        PushEvent::Completed {
            id: 11,
            output_path: None,
        },
    );
    let before = state.pending_history_refresh();

    let (mut state, effects) = push(
        state,
        PushEvent::Status {
            id: 11,
            status: None,
            video_id: Some("late42".into()),
            title: Some("Late title".into()),
            thumbnail: None,
            source: Some("videos.example.com".into()),
        },
    );

    assert!(effects.is_empty());
    assert!(state.consume_dirty());
    assert_eq!(state.pending_history_refresh(), before);
    let stored = state.store().get(11).unwrap();
    assert_eq!(stored.status, JobStatus::Completed);
    assert_eq!(stored.title.as_deref(), Some("Late title"));
    assert_eq!(stored.video_id.as_deref(), Some("late42"));
    assert!(state.store().is_historical(11));
    assert!(state.store().list_active().is_empty());
}
