use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use corvid_core::{Action, ActionOutcome, HistoryPage, HistoryQuery, Job};
use corvid_logging::{corvid_debug, corvid_warn};
use tokio::task::JoinHandle;

use crate::channel::run_push_channel;
use crate::client::{ApiClient, ClientSettings, ReqwestApiClient};
use crate::{ApiError, EngineEvent, JobQuery};

/// Receives everything the engine produces, from any runtime thread.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Client(#[from] ApiError),
}

enum EngineCommand {
    PullActive,
    PullHistory(HistoryQuery),
    PullSubscriptions,
    Perform(Action),
    ScheduleHistoryRefresh { generation: u64, delay: Duration },
}

/// Owns the IO runtime. Commands are fire-and-forget; results arrive at the
/// sink. Dropping the handle stops the runtime and the push channel.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings, sink: Arc<dyn EventSink>) -> Result<Self, EngineError> {
        let client = Arc::new(ReqwestApiClient::new(settings.clone())?);
        Self::with_client(settings, client, sink)
    }

    pub fn with_client(
        settings: ClientSettings,
        client: Arc<dyn ApiClient>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        thread::spawn(move || {
            runtime.spawn(run_push_channel(
                settings.ws_url.clone(),
                settings.reconnect_delay,
                sink.clone(),
            ));

            let settings = Arc::new(settings);
            let mut refresh_timer: Option<JoinHandle<()>> = None;
            while let Ok(command) = cmd_rx.recv() {
                if let EngineCommand::ScheduleHistoryRefresh { generation, delay } = command {
                    if let Some(previous) = refresh_timer.take() {
                        previous.abort();
                    }
                    let sink = sink.clone();
                    refresh_timer = Some(runtime.spawn(async move {
                        tokio::time::sleep(delay).await;
                        sink.emit(EngineEvent::TimerFired { generation });
                    }));
                    continue;
                }

                let client = client.clone();
                let settings = settings.clone();
                let sink = sink.clone();
                runtime.spawn(async move {
                    handle_command(client.as_ref(), &settings, command, sink.as_ref()).await;
                });
            }
            corvid_debug!("engine command channel closed");
        });

        Ok(Self { cmd_tx })
    }

    pub fn pull_active(&self) {
        self.send(EngineCommand::PullActive);
    }

    pub fn pull_history(&self, query: HistoryQuery) {
        self.send(EngineCommand::PullHistory(query));
    }

    pub fn pull_subscriptions(&self) {
        self.send(EngineCommand::PullSubscriptions);
    }

    pub fn perform(&self, action: Action) {
        self.send(EngineCommand::Perform(action));
    }

    /// Replaces any pending refresh timer; only the latest one fires.
    pub fn schedule_history_refresh(&self, generation: u64, delay: Duration) {
        self.send(EngineCommand::ScheduleHistoryRefresh { generation, delay });
    }

    fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

async fn handle_command(
    client: &dyn ApiClient,
    settings: &ClientSettings,
    command: EngineCommand,
    sink: &dyn EventSink,
) {
    match command {
        EngineCommand::PullActive => {
            let result = pull_active(client, settings).await;
            log_failure("active pull", &result);
            sink.emit(EngineEvent::ActivePulled(result));
        }
        EngineCommand::PullHistory(query) => {
            let result = pull_history(client, settings, query).await;
            log_failure("history pull", &result);
            sink.emit(EngineEvent::HistoryPulled(result));
        }
        EngineCommand::PullSubscriptions => {
            let result = client.list_subscriptions().await;
            log_failure("subscription pull", &result);
            sink.emit(EngineEvent::SubscriptionsPulled(result));
        }
        EngineCommand::Perform(action) => {
            let result = perform(client, &action).await;
            log_failure(&action.describe(), &result);
            sink.emit(EngineEvent::ActionCompleted { action, result });
        }
        // Timers never reach the runtime as commands.
        EngineCommand::ScheduleHistoryRefresh { .. } => {}
    }
}

fn log_failure<T>(what: &str, result: &Result<T, ApiError>) {
    if let Err(err) = result {
        corvid_warn!("{what} failed: {err}");
    }
}

/// Lists every job in one page; the caller filters to the active set.
pub async fn pull_active(
    client: &dyn ApiClient,
    settings: &ClientSettings,
) -> Result<Vec<Job>, ApiError> {
    let query = JobQuery {
        page: 1,
        limit: settings.active_listing_limit,
        statuses: Vec::new(),
    };
    Ok(client.list_jobs(&query).await?.items)
}

pub async fn pull_history(
    client: &dyn ApiClient,
    settings: &ClientSettings,
    query: HistoryQuery,
) -> Result<HistoryPage, ApiError> {
    let query = JobQuery {
        page: query.page,
        limit: settings.history_page_size,
        statuses: query.statuses(),
    };
    client.list_jobs(&query).await
}

/// Runs one user action against the server.
pub async fn perform(client: &dyn ApiClient, action: &Action) -> Result<ActionOutcome, ApiError> {
    let outcome = match action {
        Action::Create { url } => ActionOutcome::Created(vec![client.create_job(url).await?]),
        Action::CreateBatch { urls } => ActionOutcome::Created(client.create_batch(urls).await?),
        Action::Remove(id) => ActionOutcome::Removed {
            id: *id,
            removal: client.remove_job(*id).await?,
        },
        Action::Retry(id) => ActionOutcome::Retried(client.retry_job(*id).await?),
        Action::CancelAll => ActionOutcome::CancelledAll {
            count: client.cancel_all().await?,
        },
        Action::ClearHistory { status } => ActionOutcome::HistoryCleared {
            count: client.clear_history(*status).await?,
        },
        Action::CreateSubscription(subscription) => {
            ActionOutcome::SubscriptionSaved(client.create_subscription(subscription).await?)
        }
        Action::UpdateSubscription { id, update } => {
            ActionOutcome::SubscriptionSaved(client.update_subscription(*id, update).await?)
        }
        Action::DeleteSubscription(id) => {
            client.delete_subscription(*id).await?;
            ActionOutcome::SubscriptionDeleted(*id)
        }
        Action::CheckSubscription(id) => ActionOutcome::SubscriptionChecked {
            id: *id,
            new_videos: client.check_subscription(*id).await?,
        },
    };
    Ok(outcome)
}
