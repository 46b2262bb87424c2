//! Corvid core: job/subscription snapshot store and the pure reconciliation state machine.
mod effect;
mod job;
mod msg;
pub mod pagination;
mod push;
pub mod schedule;
mod state;
mod status;
mod store;
mod subscription;
pub mod timestamp;
mod update;
mod view_model;

pub use effect::{Effect, HistoryQuery};
pub use job::{Job, JobId, JobPatch, JobStatus, Transition};
pub use msg::{Action, ActionOutcome, Msg, PullTarget, Removal};
pub use pagination::{page_window, PageCursor, PageLink};
pub use push::PushEvent;
pub use schedule::{estimate, ScheduleEstimate};
pub use state::{AppState, ChannelState, Notice, NoticeLevel, HISTORY_REFRESH_DEBOUNCE};
pub use status::StatusSummary;
pub use store::{HistoryPage, SnapshotStore};
pub use subscription::{NewSubscription, Subscription, SubscriptionId, SubscriptionUpdate};
pub use update::update;
pub use view_model::{AppViewModel, JobRowView, SubscriptionRowView};
