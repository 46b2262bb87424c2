use std::sync::{mpsc, Arc};

use corvid_core::Effect;
use corvid_engine::{ClientSettings, EngineError, EngineEvent, EngineHandle, EventSink};
use corvid_logging::{corvid_debug, corvid_info};

use super::app::Input;

/// Executes effects returned by `update` on the IO engine.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: ClientSettings, input_tx: mpsc::Sender<Input>) -> Result<Self, EngineError> {
        corvid_info!(
            "Connecting to {} (push channel {})",
            settings.base_url,
            settings.ws_url
        );
        let engine = EngineHandle::new(settings, Arc::new(InputSink { tx: input_tx }))?;
        Ok(Self { engine })
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            corvid_debug!("effect {:?}", effect);
            match effect {
                Effect::PullActive => self.engine.pull_active(),
                Effect::PullHistory(query) => self.engine.pull_history(query),
                Effect::PullSubscriptions => self.engine.pull_subscriptions(),
                Effect::ScheduleHistoryRefresh { generation, delay } => {
                    self.engine.schedule_history_refresh(generation, delay)
                }
                Effect::RefreshFiles => {
                    // No file browser in the terminal client.
                    corvid_info!("Download finished; file listing is out of date");
                }
                Effect::Perform(action) => {
                    corvid_info!("Requesting: {}", action.describe());
                    self.engine.perform(action);
                }
            }
        }
    }
}

/// Feeds engine results back into the main loop as core messages.
struct InputSink {
    tx: mpsc::Sender<Input>,
}

impl EventSink for InputSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(Input::Msg(event.into_msg()));
    }
}
