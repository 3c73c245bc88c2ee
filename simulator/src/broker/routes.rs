use crate::broker::hub::RadarHub;
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use serde_json::json;
use std::sync::Arc;
use sweepcore::wire::RadarRecord;
use tokio::sync::broadcast::error::RecvError;
use warp::http::StatusCode;
use warp::ws::{Message, WebSocket, Ws};
use warp::{Filter, Rejection, Reply};

const MAX_RECORD_BYTES: u64 = 16 * 1024;

/// HTTP and WebSocket surface of the radar topic.
///
/// - `POST /api/v1/radar` publishes a record
/// - `GET /api/v1/radar/latest` returns the last record
/// - `GET /api/v1/radar/stats` returns broker counters
/// - `GET /ws-radar` subscribes to the topic
pub fn routes(
    hub: Arc<RadarHub>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let hub_filter = warp::any().map(move || hub.clone());

    let ingest = warp::path!("api" / "v1" / "radar")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_RECORD_BYTES))
        .and(warp::body::json())
        .and(hub_filter.clone())
        .map(|record: RadarRecord, hub: Arc<RadarHub>| match hub.publish(record) {
            Ok(saved) => warp::reply::with_status(warp::reply::json(&saved), StatusCode::OK),
            Err(err) => warp::reply::with_status(
                warp::reply::json(&json!({ "error": err.to_string() })),
                StatusCode::BAD_REQUEST,
            ),
        });

    let latest = warp::path!("api" / "v1" / "radar" / "latest")
        .and(warp::get())
        .and(hub_filter.clone())
        .map(|hub: Arc<RadarHub>| match hub.latest() {
            Some(record) => warp::reply::with_status(warp::reply::json(&record), StatusCode::OK),
            None => warp::reply::with_status(
                warp::reply::json(&json!({ "error": "no radar data yet" })),
                StatusCode::NOT_FOUND,
            ),
        });

    let stats = warp::path!("api" / "v1" / "radar" / "stats")
        .and(warp::get())
        .and(hub_filter.clone())
        .map(|hub: Arc<RadarHub>| warp::reply::json(&hub.stats()));

    let subscribe = warp::path!("ws-radar")
        .and(warp::ws())
        .and(hub_filter)
        .map(|ws: Ws, hub: Arc<RadarHub>| {
            ws.on_upgrade(move |socket| subscriber_session(socket, hub))
        });

    ingest
        .or(latest)
        .or(stats)
        .or(subscribe)
        .with(warp::log("simulator::http"))
}

async fn subscriber_session(socket: WebSocket, hub: Arc<RadarHub>) {
    let (mut outbound, mut inbound) = socket.split();
    let mut updates = hub.subscribe();
    info!("subscriber joined ({} connected)", hub.subscriber_count());

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(body) => {
                    if let Err(err) = outbound.send(Message::text(body)).await {
                        debug!("subscriber send failed: {}", err);
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("slow subscriber skipped {} records", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            incoming = inbound.next() => match incoming {
                Some(Ok(message)) if message.is_close() => break,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    debug!("subscriber receive failed: {}", err);
                    break;
                }
                None => break,
            },
        }
    }

    drop(updates);
    info!("subscriber left ({} connected)", hub.subscriber_count());
}
