//! Gateway (WebSocket) connection for receiving interactions.
//!
//! Owns the connection lifecycle: HELLO, IDENTIFY or RESUME, the heartbeat
//! task, sequence tracking and reconnects with backoff. Consumers only see
//! [`GatewayEvent`]s on a channel.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use super::types::InteractionPayload;

pub const DEFAULT_GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";

/// Only the GUILDS intent: interactions arrive regardless of intents.
pub const INTENT_GUILDS: u32 = 1;

const MAX_RECONNECT_ATTEMPTS: u32 = 8;
const HELLO_TIMEOUT: Duration = Duration::from_secs(30);

const OP_DISPATCH: u8 = 0;
const OP_HEARTBEAT: u8 = 1;
const OP_IDENTIFY: u8 = 2;
const OP_RESUME: u8 = 6;
const OP_RECONNECT: u8 = 7;
const OP_INVALID_SESSION: u8 = 9;
const OP_HELLO: u8 = 10;
const OP_HEARTBEAT_ACK: u8 = 11;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub token: String,
    pub intents: u32,
    pub url: String,
}

impl GatewayConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            intents: INTENT_GUILDS,
            url: DEFAULT_GATEWAY_URL.to_string(),
        }
    }
}

/// Events the bot cares about
#[derive(Debug)]
pub enum GatewayEvent {
    Ready { session_id: String, user: String },
    InteractionCreate(Box<InteractionPayload>),
}

#[derive(Debug, Deserialize)]
struct GatewayPayload {
    op: u8,
    #[serde(default)]
    d: Option<serde_json::Value>,
    #[serde(default)]
    s: Option<u64>,
    #[serde(default)]
    t: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReadyData {
    session_id: String,
    resume_gateway_url: String,
    user: ReadyUser,
}

#[derive(Debug, Deserialize)]
struct ReadyUser {
    username: String,
}

#[derive(Debug, Default)]
struct SessionState {
    session_id: Option<String>,
    resume_gateway_url: Option<String>,
    sequence: Option<u64>,
}

impl SessionState {
    fn resume_payload(&self, token: &str) -> Option<serde_json::Value> {
        let session_id = self.session_id.as_ref()?;
        let seq = self.sequence?;
        Some(json!({
            "op": OP_RESUME,
            "d": {"token": token, "session_id": session_id, "seq": seq}
        }))
    }
}

#[derive(Debug, PartialEq)]
enum Disconnect {
    Resume,
    Reidentify,
    Fatal,
    ConsumerGone,
}

pub struct GatewayHandle {
    pub events: mpsc::Receiver<GatewayEvent>,
    pub driver: tokio::task::JoinHandle<()>,
}

/// Spawn the gateway driver and return its event stream.
///
/// The driver stops on a fatal close code, after too many failed
/// reconnects, or once the receiver is dropped.
pub fn connect(config: GatewayConfig) -> GatewayHandle {
    let (tx, rx) = mpsc::channel(256);
    let driver = tokio::spawn(drive(config, tx));
    GatewayHandle { events: rx, driver }
}

async fn drive(config: GatewayConfig, events: mpsc::Sender<GatewayEvent>) {
    let mut session = SessionState::default();
    let mut attempts: u32 = 0;

    loop {
        let url = session
            .resume_gateway_url
            .as_deref()
            .map(with_query)
            .unwrap_or_else(|| config.url.clone());

        info!(url = %url, "connecting to Discord gateway");
        let reason = match tokio_tungstenite::connect_async(url.as_str()).await {
            Ok((ws, _)) => run_session(ws, &config, &mut session, &events, &mut attempts).await,
            Err(e) => {
                error!(error = %e, "gateway connect failed");
                Disconnect::Resume
            }
        };

        match reason {
            Disconnect::Resume => info!("will try to resume"),
            Disconnect::Reidentify => {
                session.session_id = None;
                session.sequence = None;
            }
            Disconnect::Fatal => {
                error!("fatal gateway close, giving up");
                return;
            }
            Disconnect::ConsumerGone => {
                info!("event receiver dropped, stopping gateway");
                return;
            }
        }

        attempts += 1;
        if attempts > MAX_RECONNECT_ATTEMPTS {
            error!(attempts, "too many reconnect attempts, giving up");
            return;
        }
        let delay = backoff_delay(attempts);
        warn!(delay_ms = delay.as_millis() as u64, attempt = attempts, "reconnecting after backoff");
        tokio::time::sleep(delay).await;
    }
}

async fn run_session(
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    config: &GatewayConfig,
    session: &mut SessionState,
    events: &mpsc::Sender<GatewayEvent>,
    attempts: &mut u32,
) -> Disconnect {
    let (write, mut read) = ws.split();
    let write = Arc::new(Mutex::new(write));

    let interval = match read_hello(&mut read).await {
        Ok(ms) => ms,
        Err(e) => {
            error!(error = %e, "no HELLO from gateway");
            return Disconnect::Resume;
        }
    };
    debug!(interval_ms = interval, "received HELLO");

    let opening = match session.resume_payload(&config.token) {
        Some(resume) => resume,
        None => json!({
            "op": OP_IDENTIFY,
            "d": {
                "token": config.token,
                "intents": config.intents,
                "properties": {"os": std::env::consts::OS, "browser": "bodega-bot", "device": "bodega-bot"}
            }
        }),
    };
    if let Err(e) = send(&write, &opening).await {
        error!(error = %e, "failed to identify");
        return Disconnect::Resume;
    }

    let sequence = Arc::new(Mutex::new(session.sequence));
    let heartbeat = tokio::spawn(heartbeat_loop(Arc::clone(&write), Arc::clone(&sequence), interval));

    let reason = read_loop(&mut read, &write, session, &sequence, events, attempts).await;

    heartbeat.abort();
    let _ = write.lock().await.send(Message::Close(None)).await;
    reason
}

async fn heartbeat_loop(write: Arc<Mutex<WsSink>>, sequence: Arc<Mutex<Option<u64>>>, interval_ms: u64) {
    let jitter = rand::random::<f64>();
    tokio::time::sleep(Duration::from_millis((interval_ms as f64 * jitter) as u64)).await;

    let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
    loop {
        ticker.tick().await;
        let seq = *sequence.lock().await;
        if let Err(e) = send(&write, &json!({"op": OP_HEARTBEAT, "d": seq})).await {
            warn!(error = %e, "heartbeat failed, stopping");
            return;
        }
        debug!(?seq, "heartbeat sent");
    }
}

async fn read_loop(
    read: &mut WsStream,
    write: &Arc<Mutex<WsSink>>,
    session: &mut SessionState,
    sequence: &Arc<Mutex<Option<u64>>>,
    events: &mpsc::Sender<GatewayEvent>,
    attempts: &mut u32,
) -> Disconnect {
    while let Some(msg) = read.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(frame)) => {
                let code = frame.map(|f| u16::from(f.code));
                warn!(?code, "gateway closed by server");
                return code.map(close_action).unwrap_or(Disconnect::Resume);
            }
            Ok(_) => continue,
            Err(e) => {
                warn!(error = %e, "gateway read error");
                return Disconnect::Resume;
            }
        };

        let payload: GatewayPayload = match serde_json::from_str(&text) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "unparseable gateway payload");
                continue;
            }
        };
        if let Some(s) = payload.s {
            session.sequence = Some(s);
            *sequence.lock().await = Some(s);
        }

        let op = payload.op;
        match op {
            OP_DISPATCH => {
                let Some(event) = dispatch_event(payload, session, attempts) else {
                    continue;
                };
                if events.send(event).await.is_err() {
                    return Disconnect::ConsumerGone;
                }
            }
            OP_HEARTBEAT => {
                let seq = *sequence.lock().await;
                if let Err(e) = send(write, &json!({"op": OP_HEARTBEAT, "d": seq})).await {
                    warn!(error = %e, "requested heartbeat failed");
                }
            }
            OP_HEARTBEAT_ACK => debug!("heartbeat acknowledged"),
            OP_RECONNECT => {
                info!("gateway asked us to reconnect");
                return Disconnect::Resume;
            }
            OP_INVALID_SESSION => {
                let resumable = payload.d.and_then(|d| d.as_bool()).unwrap_or(false);
                warn!(resumable, "session invalidated");
                tokio::time::sleep(Duration::from_secs(1) + Duration::from_millis(rand::random::<u64>() % 4000)).await;
                return if resumable { Disconnect::Resume } else { Disconnect::Reidentify };
            }
            other => debug!(op = other, "ignoring gateway op"),
        }
    }

    info!("gateway stream ended");
    Disconnect::Resume
}

/// Turn a dispatch payload into an event, updating session state on READY.
fn dispatch_event(payload: GatewayPayload, session: &mut SessionState, attempts: &mut u32) -> Option<GatewayEvent> {
    let name = payload.t?;
    let data = payload.d?;
    match name.as_str() {
        "READY" => {
            let ready: ReadyData = serde_json::from_value(data)
                .map_err(|e| warn!(error = %e, "bad READY payload"))
                .ok()?;
            session.session_id = Some(ready.session_id.clone());
            session.resume_gateway_url = Some(ready.resume_gateway_url);
            *attempts = 0;
            Some(GatewayEvent::Ready {
                session_id: ready.session_id,
                user: ready.user.username,
            })
        }
        "RESUMED" => {
            *attempts = 0;
            info!("session resumed");
            None
        }
        "INTERACTION_CREATE" => serde_json::from_value::<InteractionPayload>(data)
            .map_err(|e| warn!(error = %e, "bad INTERACTION_CREATE payload"))
            .ok()
            .map(|p| GatewayEvent::InteractionCreate(Box::new(p))),
        _ => None,
    }
}

/// What to do after the server closes with `code`.
fn close_action(code: u16) -> Disconnect {
    match code {
        // authentication failed, invalid shard, sharding required,
        // invalid API version, invalid or disallowed intents
        4004 | 4010..=4014 => Disconnect::Fatal,
        // invalid seq, session timed out
        4007 | 4009 => Disconnect::Reidentify,
        _ => Disconnect::Resume,
    }
}

async fn read_hello(read: &mut WsStream) -> Result<u64, String> {
    let msg = tokio::time::timeout(HELLO_TIMEOUT, read.next())
        .await
        .map_err(|_| "timed out waiting for HELLO".to_string())?
        .ok_or_else(|| "stream ended before HELLO".to_string())?
        .map_err(|e| e.to_string())?;

    let Message::Text(text) = msg else {
        return Err(format!("expected text HELLO, got {msg:?}"));
    };
    let payload: GatewayPayload = serde_json::from_str(&text).map_err(|e| e.to_string())?;
    if payload.op != OP_HELLO {
        return Err(format!("expected op {OP_HELLO}, got op {}", payload.op));
    }
    payload
        .d
        .as_ref()
        .and_then(|d| d.get("heartbeat_interval"))
        .and_then(|v| v.as_u64())
        .ok_or_else(|| "HELLO missing heartbeat_interval".to_string())
}

async fn send(write: &Arc<Mutex<WsSink>>, payload: &serde_json::Value) -> Result<(), String> {
    let text = serde_json::to_string(payload).map_err(|e| e.to_string())?;
    write
        .lock()
        .await
        .send(Message::Text(text))
        .await
        .map_err(|e| e.to_string())
}

fn with_query(url: &str) -> String {
    if url.contains("v=10") {
        url.to_string()
    } else if url.contains('?') {
        format!("{url}&v=10&encoding=json")
    } else {
        format!("{url}/?v=10&encoding=json")
    }
}

/// Exponential backoff with jitter, capped at 60s.
fn backoff_delay(attempt: u32) -> Duration {
    let base_ms = 1000u64 * 2u64.saturating_pow(attempt.min(6));
    let jittered = (rand::random::<f64>() * 0.5 + 0.75) * base_ms as f64;
    Duration::from_millis(jittered.min(60_000.0) as u64)
}
