//! One-shot timers on the tokio runtime.
//!
//! Each [`TimerPort::schedule`] call spawns a task that sleeps for the
//! requested delay and then posts [`HostEvent::Timer`] to the session's
//! event channel.  The session loop turns that into
//! [`rfb_core::RemoteFrameBuffer::on_timer`], so the core is only ever
//! called from the loop task.
//!
//! Pending timers are not cancelled.  A timer that fires after the session
//! closed finds the channel gone and is dropped, and the core ignores late
//! timers on its own.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tracing::trace;

use rfb_core::{TimerKey, TimerPort};

use crate::application::HostEvent;

pub struct TokioTimers {
    runtime: Handle,
    events: UnboundedSender<HostEvent>,
}

impl TokioTimers {
    /// Creates a timer port that spawns on `runtime`.
    pub fn new(runtime: Handle, events: UnboundedSender<HostEvent>) -> Self {
        Self { runtime, events }
    }
}

impl TimerPort for TokioTimers {
    fn schedule(&self, key: TimerKey, delay: Duration) {
        let events = self.events.clone();
        self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if events.send(HostEvent::Timer(key)).is_err() {
                trace!("{key:?} fired after the session ended");
            }
        });
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
