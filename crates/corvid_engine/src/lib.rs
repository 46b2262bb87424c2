//! Corvid engine: REST client, push channel and effect execution.
mod channel;
mod client;
mod decode;
mod engine;
mod types;

pub use channel::run_push_channel;
pub use client::{ApiClient, ClientSettings, ReqwestApiClient};
pub use decode::{decode_push_frame, DecodeError};
pub use engine::{
    perform, pull_active, pull_history, ChannelEventSink, EngineError, EngineHandle, EventSink,
};
pub use types::{ApiError, ChannelEvent, EngineEvent, JobQuery};
