//! socket.io push transport.
//!
//! Speaks just enough of engine.io v4 / socket.io v5 over a websocket to
//! receive `productUpdated` events: join the default namespace, answer
//! pings, and hand every batch to the [`InventoryFeed`].

use std::time::Duration;

use catalog::{InventoryFeed, PRODUCT_UPDATED_EVENT};
use common::Product;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use crate::{ClientError, Result};

const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// A decoded text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum PushFrame {
    /// engine.io handshake (`0{...}`).
    Open,
    /// engine.io ping (`2`); must be answered with `3`.
    Ping,
    /// socket.io namespace joined (`40`).
    Connected,
    /// socket.io event (`42[...]`).
    Event { name: String, args: Vec<Value> },
    /// engine.io close (`1`) or socket.io disconnect (`41`).
    Disconnected,
    /// Any frame the client has no use for.
    Ignored,
}

/// Decodes one engine.io text frame.
pub fn parse_frame(text: &str) -> Result<PushFrame> {
    let mut chars = text.chars();
    let Some(engine_type) = chars.next() else {
        return Err(ClientError::MalformedFrame("empty frame".to_string()));
    };
    let rest = chars.as_str();

    match engine_type {
        '0' => Ok(PushFrame::Open),
        '1' => Ok(PushFrame::Disconnected),
        '2' => Ok(PushFrame::Ping),
        '3' | '5' | '6' => Ok(PushFrame::Ignored),
        '4' => parse_packet(rest),
        other => Err(ClientError::MalformedFrame(format!(
            "unknown engine.io packet type {other:?}"
        ))),
    }
}

/// Decodes the socket.io packet carried in an engine.io message.
fn parse_packet(packet: &str) -> Result<PushFrame> {
    let mut chars = packet.chars();
    let Some(packet_type) = chars.next() else {
        return Err(ClientError::MalformedFrame("empty message".to_string()));
    };

    match packet_type {
        '0' => Ok(PushFrame::Connected),
        '1' => Ok(PushFrame::Disconnected),
        '2' => parse_event(chars.as_str()),
        '4' => Err(ClientError::Push(format!(
            "namespace connection refused: {}",
            chars.as_str()
        ))),
        _ => Ok(PushFrame::Ignored),
    }
}

/// Parses `[/nsp,][ackId]["name", ...args]`.
fn parse_event(body: &str) -> Result<PushFrame> {
    let mut body = body;
    if body.starts_with('/') {
        body = match body.split_once(',') {
            Some((_, rest)) => rest,
            None => return Err(ClientError::MalformedFrame("unterminated namespace".to_string())),
        };
    }
    let body = body.trim_start_matches(|c: char| c.is_ascii_digit());

    let mut items: Vec<Value> = serde_json::from_str(body)?;
    if items.is_empty() {
        return Err(ClientError::MalformedFrame("event without a name".to_string()));
    }
    let name = match items.remove(0) {
        Value::String(name) => name,
        other => {
            return Err(ClientError::MalformedFrame(format!(
                "event name is not a string: {other}"
            )));
        }
    };
    Ok(PushFrame::Event { name, args: items })
}

/// Extracts the product batch from `productUpdated` arguments.
pub fn decode_batch(args: Vec<Value>) -> Result<Vec<Product>> {
    let Some(payload) = args.into_iter().next() else {
        return Err(ClientError::MalformedFrame("productUpdated without payload".to_string()));
    };
    Ok(serde_json::from_value(payload)?)
}

/// Reconnect delays: starts at [`INITIAL_BACKOFF`] and doubles up to
/// [`MAX_BACKOFF`].
#[derive(Debug)]
struct Backoff {
    next: Duration,
}

impl Backoff {
    fn new() -> Self {
        Self {
            next: INITIAL_BACKOFF,
        }
    }

    fn reset(&mut self) {
        self.next = INITIAL_BACKOFF;
    }

    /// Returns the delay to wait now and doubles the following one.
    fn next_delay(&mut self) -> Duration {
        let delay = self.next;
        self.next = (self.next * 2).min(MAX_BACKOFF);
        delay
    }
}

enum ConnectionEnd {
    Shutdown,
    Closed,
}

/// Receives `productUpdated` batches over socket.io and publishes them.
#[derive(Clone)]
pub struct PushTransport {
    url: Url,
    feed: InventoryFeed,
}

impl PushTransport {
    pub fn new(url: Url, feed: InventoryFeed) -> Self {
        Self { url, feed }
    }

    /// Runs the transport in the background, reconnecting with backoff
    /// until the handle is stopped or dropped.
    pub fn spawn(self) -> PushHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let mut backoff = Backoff::new();
            loop {
                let delay = match self.connect(&mut shutdown_rx).await {
                    Ok(ConnectionEnd::Shutdown) => break,
                    Ok(ConnectionEnd::Closed) => {
                        tracing::info!("push channel closed by server");
                        backoff.reset();
                        backoff.next_delay()
                    }
                    Err(e) => {
                        let delay = backoff.next_delay();
                        tracing::warn!(error = %e, ?delay, "push channel failed");
                        delay
                    }
                };

                metrics::counter!("push_reconnects_total").increment(1);
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    () = tokio::time::sleep(delay) => {}
                }
            }
            tracing::info!("push transport stopped");
        });

        PushHandle {
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Runs one websocket connection until it ends.
    async fn connect(&self, shutdown: &mut oneshot::Receiver<()>) -> Result<ConnectionEnd> {
        let (ws, _response) = tokio_tungstenite::connect_async(self.url.as_str())
            .await
            .map_err(|e| ClientError::Push(e.to_string()))?;
        tracing::info!(url = %self.url, "push channel connected");

        let (mut sink, mut stream) = ws.split();
        loop {
            tokio::select! {
                _ = &mut *shutdown => {
                    let _ = sink.send(Message::Text("41".into())).await;
                    let _ = sink.close().await;
                    return Ok(ConnectionEnd::Shutdown);
                }
                msg = stream.next() => match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = match parse_frame(text.as_str()) {
                            Ok(frame) => self.handle_frame(frame),
                            Err(e) => {
                                metrics::counter!("push_frames_skipped_total").increment(1);
                                tracing::warn!(error = %e, "skipping push frame");
                                None
                            }
                        };
                        if let Some(reply) = reply {
                            sink.send(Message::Text(reply.into()))
                                .await
                                .map_err(|e| ClientError::Push(e.to_string()))?;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => return Ok(ConnectionEnd::Closed),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(ClientError::Push(e.to_string())),
                }
            }
        }
    }

    /// Acts on a frame; returns the frame to send back, if any.
    fn handle_frame(&self, frame: PushFrame) -> Option<&'static str> {
        match frame {
            PushFrame::Open => Some("40"),
            PushFrame::Ping => Some("3"),
            PushFrame::Connected => {
                tracing::info!("joined default namespace");
                None
            }
            PushFrame::Event { name, args } if name == PRODUCT_UPDATED_EVENT => {
                match decode_batch(args) {
                    Ok(batch) => {
                        metrics::counter!("push_batches_received_total").increment(1);
                        let receivers = self.feed.publish(batch);
                        tracing::debug!(receivers, "push batch published");
                    }
                    Err(e) => {
                        metrics::counter!("push_frames_skipped_total").increment(1);
                        tracing::warn!(error = %e, "skipping malformed productUpdated");
                    }
                }
                None
            }
            PushFrame::Event { name, .. } => {
                tracing::debug!(event = %name, "ignoring push event");
                None
            }
            PushFrame::Disconnected => {
                tracing::info!("server left the namespace");
                None
            }
            PushFrame::Ignored => None,
        }
    }
}

/// Handle to a running [`PushTransport`].
///
/// [`PushHandle::stop`] leaves the namespace and waits for the transport to
/// exit. Dropping the handle aborts it.
pub struct PushHandle {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PushHandle {
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
            && !e.is_cancelled()
        {
            tracing::warn!(error = %e, "push transport task failed");
        }
    }
}

impl Drop for PushHandle {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
