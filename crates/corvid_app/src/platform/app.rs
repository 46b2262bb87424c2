use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use corvid_core::{update, Action, AppState, Msg, SubscriptionId, SubscriptionUpdate};
use corvid_engine::EngineError;
use corvid_logging::{corvid_info, corvid_warn};

use super::commands::{self, Command, HELP};
use super::config::{AppConfig, ConfigError, CONFIG_FILENAME, SERVER_URL_ENV};
use super::effects::EffectRunner;
use super::{logging, ui};

/// Render throttle; state changes between ticks are drawn once.
const RENDER_INTERVAL: Duration = Duration::from_millis(100);

/// Everything the main loop reacts to.
pub enum Input {
    Msg(Msg),
    Command(Command),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub fn run_app() -> Result<(), AppError> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));
    let config =
        AppConfig::load(&config_path)?.with_server_override(std::env::var(SERVER_URL_ENV).ok());
    logging::initialize(&config);
    let settings = config.client_settings()?;

    let (input_tx, input_rx) = mpsc::channel::<Input>();
    let runner = EffectRunner::new(settings, input_tx.clone())?;

    spawn_ticker(input_tx.clone(), config.poll_interval(), || Msg::PollTick);
    spawn_ticker(input_tx.clone(), RENDER_INTERVAL, || Msg::Tick);
    spawn_stdin_reader(input_tx);

    let mut app = App {
        state: AppState::new(),
        runner,
    };
    app.dispatch(Msg::Started);

    while let Ok(input) = input_rx.recv() {
        match input {
            Input::Msg(Msg::Tick) => app.render_if_dirty(),
            Input::Msg(msg) | Input::Command(Command::Send(msg)) => app.dispatch(msg),
            Input::Command(Command::ToggleSubscription(id)) => app.toggle_subscription(id),
            Input::Command(Command::Help) => println!("{HELP}"),
            Input::Command(Command::Quit) => break,
        }
    }

    corvid_info!("Shutting down");
    Ok(())
}

struct App {
    state: AppState,
    runner: EffectRunner,
}

impl App {
    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.run(effects);
    }

    fn toggle_subscription(&mut self, id: SubscriptionId) {
        let Some(subscription) = self.state.store().subscription(id) else {
            corvid_warn!("No subscription #{id}");
            eprintln!("no subscription #{id}");
            return;
        };
        let update = SubscriptionUpdate {
            enabled: Some(!subscription.enabled),
            ..SubscriptionUpdate::default()
        };
        self.dispatch(Msg::ActionRequested(Action::UpdateSubscription { id, update }));
    }

    fn render_if_dirty(&mut self) {
        if !self.state.consume_dirty() {
            return;
        }
        let view = self.state.view(Utc::now());
        let mut stdout = io::stdout().lock();
        // Window title first, then clear and redraw.
        let _ = write!(
            stdout,
            "\x1B]0;{}Corvid\x07\x1B[2J\x1B[H{}\n> ",
            view.title_annotation.as_deref().unwrap_or(""),
            ui::render::render(&view)
        );
        let _ = stdout.flush();
    }
}

fn spawn_ticker(tx: mpsc::Sender<Input>, interval: Duration, msg: fn() -> Msg) {
    thread::spawn(move || loop {
        thread::sleep(interval);
        if tx.send(Input::Msg(msg())).is_err() {
            break;
        }
    });
}

fn spawn_stdin_reader(tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match commands::parse(&line) {
                Ok(Some(command)) => {
                    if tx.send(Input::Command(command)).is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(err) => eprintln!("{err}"),
            }
        }
        let _ = tx.send(Input::Command(Command::Quit));
    });
}
