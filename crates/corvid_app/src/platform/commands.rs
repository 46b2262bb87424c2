use corvid_core::{Action, JobStatus, Msg, NewSubscription, SubscriptionId};

pub const HELP: &str = "\
commands:
  add <url>...            queue one or more downloads
  cancel <id>             cancel an active download
  retry <id>              retry a failed or cancelled download
  delete <id>             delete a finished download
  cancel-all              cancel every active download
  clear [status]          clear finished downloads (completed|failed|cancelled)
  page <n> | next | prev  navigate history
  filter <status|all>     filter history by status
  refresh                 reload everything from the server
  sub-add <url> [hours]   subscribe to a channel or playlist
  sub-toggle <id>         pause or resume a subscription
  sub-check <id>          check a subscription now
  sub-rm <id>             remove a subscription
  dismiss                 dismiss the oldest notice
  quit";

/// One line of terminal input, parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Send(Msg),
    /// Needs the current subscription state to pick the new value.
    ToggleSubscription(SubscriptionId),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("'{0}' is not a finished-download status")]
    NotHistorical(String),
}

pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match name {
        "add" if !args.is_empty() => action(Action::CreateBatch {
            urls: args.iter().map(|url| url.to_string()).collect(),
        }),
        "add" => return Err(CommandError::Usage("add <url>...")),
        "cancel" | "delete" => action(Action::Remove(id_arg(&args, "cancel|delete <id>")?)),
        "retry" => action(Action::Retry(id_arg(&args, "retry <id>")?)),
        "cancel-all" => action(Action::CancelAll),
        "clear" => {
            let status = match args.first() {
                Some(raw) => Some(historical_status(raw)?),
                None => None,
            };
            action(Action::ClearHistory { status })
        }
        "page" => {
            let raw = args.first().ok_or(CommandError::Usage("page <n>"))?;
            let page = raw
                .parse::<i64>()
                .map_err(|_| CommandError::NotANumber(raw.to_string()))?;
            Command::Send(Msg::PageRequested(page))
        }
        "next" => Command::Send(Msg::NextPage),
        "prev" => Command::Send(Msg::PrevPage),
        "filter" => {
            let raw = args
                .first()
                .ok_or(CommandError::Usage("filter <status|all>"))?;
            let filter = match *raw {
                "all" => None,
                other => Some(historical_status(other)?),
            };
            Command::Send(Msg::HistoryFilterChanged(filter))
        }
        "refresh" => Command::Send(Msg::RefreshRequested),
        "sub-add" => {
            let url = args
                .first()
                .ok_or(CommandError::Usage("sub-add <url> [hours]"))?;
            let mut subscription = NewSubscription::new(*url);
            if let Some(hours) = args.get(1) {
                subscription.check_interval_hours = hours
                    .parse()
                    .map_err(|_| CommandError::NotANumber(hours.to_string()))?;
            }
            action(Action::CreateSubscription(subscription))
        }
        "sub-toggle" => Command::ToggleSubscription(id_arg(&args, "sub-toggle <id>")?),
        "sub-check" => action(Action::CheckSubscription(id_arg(&args, "sub-check <id>")?)),
        "sub-rm" => action(Action::DeleteSubscription(id_arg(&args, "sub-rm <id>")?)),
        "dismiss" => Command::Send(Msg::NoticeDismissed),
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn action(action: Action) -> Command {
    Command::Send(Msg::ActionRequested(action))
}

fn id_arg(args: &[&str], usage: &'static str) -> Result<u64, CommandError> {
    let raw = args.first().ok_or(CommandError::Usage(usage))?;
    raw.trim_start_matches('#')
        .parse()
        .map_err(|_| CommandError::NotANumber(raw.to_string()))
}

fn historical_status(raw: &str) -> Result<JobStatus, CommandError> {
    JobStatus::parse(raw)
        .filter(|status| status.is_historical())
        .ok_or_else(|| CommandError::NotHistorical(raw.to_string()))
}
