use std::sync::Arc;
use std::time::Duration;

use corvid_logging::{corvid_debug, corvid_info, corvid_warn};
use futures_util::StreamExt;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::decode::decode_push_frame;
use crate::engine::EventSink;
use crate::{ChannelEvent, EngineEvent};

/// Keeps a push connection open for as long as the runtime lives.
///
/// Every failed attempt or lost connection waits `reconnect_delay` before the
/// next try. `Disconnected` is reported once per outage, not once per attempt.
pub async fn run_push_channel(url: String, reconnect_delay: Duration, sink: Arc<dyn EventSink>) {
    let mut reported_down = false;
    loop {
        match connect_async(url.as_str()).await {
            Ok((mut stream, _)) => {
                corvid_info!("push channel connected to {url}");
                reported_down = false;
                sink.emit(EngineEvent::Channel(ChannelEvent::Connected));

                while let Some(frame) = stream.next().await {
                    match frame {
                        Ok(Message::Text(text)) => match decode_push_frame(&text) {
                            Ok(event) => sink.emit(EngineEvent::Channel(ChannelEvent::Push(event))),
                            Err(err) => corvid_debug!("dropping push frame: {err}"),
                        },
                        Ok(Message::Close(_)) => break,
                        Ok(_) => {}
                        Err(err) => {
                            corvid_warn!("push channel read failed: {err}");
                            break;
                        }
                    }
                }

                corvid_warn!("push channel to {url} lost");
            }
            Err(err) => corvid_warn!("push channel connect to {url} failed: {err}"),
        }

        if !reported_down {
            reported_down = true;
            sink.emit(EngineEvent::Channel(ChannelEvent::Disconnected));
        }
        tokio::time::sleep(reconnect_delay).await;
    }
}
