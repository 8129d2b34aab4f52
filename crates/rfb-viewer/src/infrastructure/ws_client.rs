//! WebSocket connection to the frame producer and the session event loop.
//!
//! One viewer process runs exactly one session:
//!
//! 1. Connect to the producer's WebSocket URL.
//! 2. Wire the headless host ports to a [`RemoteFrameBuffer`].
//! 3. Run a single `tokio::select!` loop over four sources:
//!    - inbound WebSocket messages (reassembled, then routed to the core)
//!    - host events (timers, content loaded, visibility)
//!    - outbound text queued by the core (events, mirrored properties)
//!    - a periodic check of the shutdown flag
//! 4. On exit, close the core and flush its `close` event to the socket.
//!
//! The core is only ever touched from this loop, so it needs no locking.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::interval;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tracing::{debug, info, warn};

use rfb_core::{HostPorts, RemoteFrameBuffer, SystemClock};

use crate::application::{HostEvent, InboundAssembler, InboundMessage, Session, ViewerError};
use crate::domain::ViewerConfig;
use crate::infrastructure::{ChannelEventSink, HeadlessSurfaces, MirroredProperties, TokioTimers};

/// How often the loop checks the shutdown flag while otherwise idle.
const SHUTDOWN_POLL: Duration = Duration::from_millis(200);

/// Connects to `config.url` and runs the session until the producer hangs up
/// or `running` is cleared.
///
/// # Errors
///
/// Returns an error if the connection cannot be established or the socket
/// fails mid-session.  A normal close by either side is `Ok`.
pub async fn run_viewer(config: ViewerConfig, running: Arc<AtomicBool>) -> anyhow::Result<()> {
    let (ws_stream, _response) =
        connect_async(config.url.as_str())
            .await
            .map_err(|source| ViewerError::Connect {
                url: config.url.clone(),
                source,
            })?;
    info!("connected to producer at {}", config.url);

    let (ws_tx, ws_rx) = ws_stream.split();
    run_session(&config, ws_tx, ws_rx, running).await
}

/// Runs the session loop over an already established message stream.
///
/// Split out from [`run_viewer`] so the loop does not care where the
/// stream came from.
pub async fn run_session<W, R>(
    config: &ViewerConfig,
    mut ws_tx: W,
    mut ws_rx: R,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()>
where
    W: Sink<WsMessage, Error = WsError> + Unpin,
    R: Stream<Item = Result<WsMessage, WsError>> + Unpin,
{
    let (host_tx, mut host_rx) = mpsc::unbounded_channel::<HostEvent>();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();

    let properties = Arc::new(MirroredProperties::new(out_tx.clone()));
    let ports = HostPorts {
        frames: Arc::new(HeadlessSurfaces::new(
            config.surfaces,
            host_tx.clone(),
            config.dump_dir.clone(),
        )),
        properties: properties.clone(),
        events: Arc::new(ChannelEventSink::new(out_tx)),
        timers: Arc::new(TokioTimers::new(Handle::current(), host_tx)),
        clock: Arc::new(SystemClock),
    };
    let rfb = RemoteFrameBuffer::new(config.core.clone(), ports);
    let mut session = Session::new(rfb, properties, config.viewport.geometry());
    session.start();

    let mut assembler = InboundAssembler::new();
    let mut shutdown_check = interval(SHUTDOWN_POLL);

    let outcome: anyhow::Result<()> = loop {
        tokio::select! {
            incoming = ws_rx.next() => match incoming {
                Some(Ok(WsMessage::Text(text))) => match assembler.push_text(&text) {
                    Ok(ready) => {
                        for inbound in ready {
                            route_inbound(&mut session, inbound);
                        }
                    }
                    Err(e) => debug!("ignored inbound message: {e}"),
                },
                Some(Ok(WsMessage::Binary(data))) => match assembler.push_binary(data) {
                    Ok(inbound) => route_inbound(&mut session, inbound),
                    Err(e) => debug!("ignored inbound message: {e}"),
                },
                Some(Ok(WsMessage::Close(_))) | None => {
                    info!("producer closed the connection");
                    break Ok(());
                }
                Some(Ok(_)) => {}
                Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) => {
                    debug!("WebSocket already closed");
                    break Ok(());
                }
                Some(Err(e)) => break Err(anyhow::Error::new(e).context("WebSocket receive failed")),
            },

            Some(event) = host_rx.recv() => session.handle_host_event(event),

            Some(text) = out_rx.recv() => {
                if let Err(e) = ws_tx.send(WsMessage::Text(text)).await {
                    break Err(anyhow::Error::new(e).context("WebSocket send failed"));
                }
            }

            _ = shutdown_check.tick() => {
                if !running.load(Ordering::Relaxed) {
                    info!("shutdown requested");
                    break Ok(());
                }
            }
        }
    };

    // Closing queues the `close` event; push it out before the socket goes.
    session.close();
    while let Ok(text) = out_rx.try_recv() {
        if ws_tx.send(WsMessage::Text(text)).await.is_err() {
            debug!("socket gone before the outbound queue drained");
            break;
        }
    }
    if let Err(e) = ws_tx.close().await {
        debug!("WebSocket close: {e}");
    }

    outcome.context("viewer session ended abnormally")
}

fn route_inbound(session: &mut Session, inbound: InboundMessage) {
    if let Err(e) = session.handle_inbound(inbound) {
        warn!("ignored producer message: {e}");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
