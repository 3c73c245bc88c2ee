use iced::futures::channel::mpsc;
use iced::futures::{SinkExt, Stream, StreamExt};
use iced::{stream, Subscription};
use log::{debug, info, warn};
use std::time::Duration;
use sweepcore::wire::RadarRecord;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};

const DEFAULT_WS_URL: &str = "ws://127.0.0.1:8080/ws-radar";
const DEFAULT_HTTP_URL: &str = "http://127.0.0.1:8080";
/// Fixed delay between reconnect attempts; retries are unbounded.
const RECONNECT_DELAY: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Connecting,
    Connected,
    Message(String),
    Disconnected(String),
}

pub fn subscribe_url() -> String {
    std::env::var("RADAR_WS_URL").unwrap_or_else(|_| DEFAULT_WS_URL.into())
}

pub fn http_base_url() -> String {
    std::env::var("RADAR_HTTP_URL").unwrap_or_else(|_| DEFAULT_HTTP_URL.into())
}

/// Subscription to the radar topic that reconnects forever.
pub fn radar_topic() -> Subscription<TransportEvent> {
    Subscription::run(configured_topic)
}

fn configured_topic() -> impl Stream<Item = TransportEvent> {
    topic_stream(subscribe_url())
}

fn topic_stream(url: String) -> impl Stream<Item = TransportEvent> {
    stream::channel(100, |mut output: mpsc::Sender<TransportEvent>| async move {
        loop {
            if output.send(TransportEvent::Connecting).await.is_err() {
                return;
            }

            let reason = match connect_async(url.as_str()).await {
                Ok((mut socket, _)) => {
                    info!("subscribed to {}", url);
                    if output.send(TransportEvent::Connected).await.is_err() {
                        return;
                    }
                    loop {
                        match socket.next().await {
                            Some(Ok(WsMessage::Text(body))) => {
                                if output.send(TransportEvent::Message(body)).await.is_err() {
                                    return;
                                }
                            }
                            Some(Ok(WsMessage::Close(_))) | None => {
                                break "closed by server".to_string();
                            }
                            Some(Ok(other)) => debug!("ignoring frame {:?}", other),
                            Some(Err(err)) => break err.to_string(),
                        }
                    }
                }
                Err(err) => err.to_string(),
            };

            warn!(
                "radar link down ({}), retrying in {} ms",
                reason,
                RECONNECT_DELAY.as_millis()
            );
            if output
                .send(TransportEvent::Disconnected(reason))
                .await
                .is_err()
            {
                return;
            }
            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    })
}

/// Last record known to the broker, used to prime the readout on start.
pub async fn fetch_latest() -> Result<RadarRecord, String> {
    let url = format!("{}/api/v1/radar/latest", http_base_url());
    let response = reqwest::get(&url).await.map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("{}: {}", url, response.status()));
    }
    response
        .json::<RadarRecord>()
        .await
        .map_err(|e| e.to_string())
}
