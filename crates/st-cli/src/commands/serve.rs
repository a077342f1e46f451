//! Serve command: the timer daemon.
//!
//! Runs three cooperating pieces:
//!
//! - An **owner task** that holds the `Database` and the `StudyTimer` and
//!   drains a command channel. Every mutation (toggle) and every sample goes
//!   through this task, so no two operations ever interleave against the
//!   store while the daemon runs.
//! - A **tick task** that samples the owner once per second and publishes an
//!   [`OverlayPayload`] on a broadcast channel. Delivery is best-effort: a
//!   missing, slow, or lagged subscriber never blocks the tick.
//! - An **axum router** exposing `POST /toggle` (the hot-key surface; bind a
//!   global key to `st toggle`) and `GET /overlay` (the WebSocket the OBS
//!   browser source subscribes to).

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use chrono::Local;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc, oneshot};

use st_core::{StatsSnapshot, StudyTimer, TimerState, Toggle};
use st_db::{Database, DbError};

use super::overlay::OverlayPayload;

/// Response to a toggle request, shared with the `st toggle` client.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub running: bool,
}

/// A read-only sample of the owner's state, taken once per tick.
#[derive(Debug, Clone, Copy)]
struct Sample {
    today_sec: i64,
    current_streak: u32,
    session_elapsed: i64,
    running: bool,
}

/// Requests handed to the single owner of the store and timer.
enum Command {
    Toggle(oneshot::Sender<Result<TimerState, DbError>>),
    Sample(oneshot::Sender<Result<Sample, DbError>>),
}

#[derive(Clone)]
struct AppState {
    commands: mpsc::Sender<Command>,
    payloads: broadcast::Sender<OverlayPayload>,
}

pub async fn run(db: Database, addr: SocketAddr) -> Result<()> {
    let (command_tx, command_rx) = mpsc::channel::<Command>(16);
    let (payload_tx, _) = broadcast::channel::<OverlayPayload>(8);

    // The connection is Send but not Sync; it moves into the owner task and
    // never leaves.
    let owner = tokio::task::spawn_blocking(move || owner_loop(db, command_rx));

    tokio::spawn(tick_loop(command_tx.clone(), payload_tx.clone()));

    let app = Router::new()
        .route("/toggle", post(toggle_handler))
        .route("/overlay", get(overlay_handler))
        .with_state(AppState {
            commands: command_tx,
            payloads: payload_tx,
        });

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "serve daemon listening");
    axum::serve(listener, app)
        .await
        .context("serve daemon failed")?;

    owner.await.context("timer owner task panicked")?;
    Ok(())
}

/// The serialized owner of the store and the timer.
fn owner_loop(db: Database, mut commands: mpsc::Receiver<Command>) {
    let mut timer = StudyTimer::new();
    while let Some(command) = commands.blocking_recv() {
        match command {
            Command::Toggle(reply) => {
                let _ = reply.send(handle_toggle(&db, &mut timer));
            }
            Command::Sample(reply) => {
                let _ = reply.send(sample(&db, &timer));
            }
        }
    }
    if timer.state() == TimerState::Running {
        // Stop the open session on shutdown rather than silently losing it.
        if let Err(error) = handle_toggle(&db, &mut timer) {
            tracing::warn!(%error, "failed to persist final session");
        }
    }
}

fn handle_toggle(db: &Database, timer: &mut StudyTimer) -> Result<TimerState, DbError> {
    let now = Local::now().naive_local();
    match timer.toggle(now) {
        Toggle::Started { at } => {
            tracing::info!(%at, "timer started");
        }
        Toggle::Stopped { session } => {
            let id = db.insert_log(&session)?;
            tracing::info!(id, duration = session.duration_seconds, "session recorded");
        }
    }
    Ok(timer.state())
}

fn sample(db: &Database, timer: &StudyTimer) -> Result<Sample, DbError> {
    let now = Local::now().naive_local();
    let logs = db.list_logs(0)?;
    let snapshot = StatsSnapshot::compute(&logs, now.date());
    Ok(Sample {
        today_sec: snapshot.today_sec,
        current_streak: snapshot.current_streak,
        session_elapsed: timer.elapsed_seconds(now),
        running: timer.state() == TimerState::Running,
    })
}

/// Publishes an overlay payload once per second.
async fn tick_loop(
    commands: mpsc::Sender<Command>,
    payloads: broadcast::Sender<OverlayPayload>,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    loop {
        interval.tick().await;
        let (reply_tx, reply_rx) = oneshot::channel();
        if commands.send(Command::Sample(reply_tx)).await.is_err() {
            break;
        }
        match reply_rx.await {
            Ok(Ok(sample)) => {
                let payload = OverlayPayload::new(
                    sample.session_elapsed,
                    sample.today_sec,
                    sample.current_streak,
                    sample.running,
                );
                // No subscribers is fine; the tick carries on regardless.
                let _ = payloads.send(payload);
            }
            Ok(Err(error)) => tracing::warn!(%error, "overlay sample failed"),
            Err(_) => break,
        }
    }
}

async fn toggle_handler(
    State(state): State<AppState>,
) -> Result<Json<ToggleResponse>, (StatusCode, String)> {
    let (reply_tx, reply_rx) = oneshot::channel();
    state
        .commands
        .send(Command::Toggle(reply_tx))
        .await
        .map_err(|_| owner_gone())?;
    let outcome = reply_rx.await.map_err(|_| owner_gone())?;
    let timer_state =
        outcome.map_err(|error| (StatusCode::INTERNAL_SERVER_ERROR, error.to_string()))?;
    Ok(Json(ToggleResponse {
        running: timer_state == TimerState::Running,
    }))
}

fn owner_gone() -> (StatusCode, String) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        "timer owner unavailable".to_string(),
    )
}

async fn overlay_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    let subscription = state.payloads.subscribe();
    ws.on_upgrade(move |socket| overlay_connection(socket, subscription))
}

/// Forwards broadcast payloads to one overlay subscriber.
async fn overlay_connection(socket: WebSocket, mut payloads: broadcast::Receiver<OverlayPayload>) {
    let (mut sink, mut stream) = socket.split();
    loop {
        tokio::select! {
            payload = payloads.recv() => match payload {
                Ok(payload) => {
                    let Ok(json) = serde_json::to_string(&payload) else {
                        break;
                    };
                    if sink.send(Message::Text(json.into())).await.is_err() {
                        tracing::debug!("overlay subscriber disconnected");
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Slow consumer; drop the missed ticks and continue.
                    tracing::debug!(skipped, "overlay subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = stream.next() => match incoming {
                // Overlay clients only listen; tolerate pings and stray text.
                Some(Ok(_)) => {}
                _ => break,
            },
        }
    }
}
