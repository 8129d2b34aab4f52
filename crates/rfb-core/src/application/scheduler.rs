//! Frame queue and the flow-controlled draw loop.
//!
//! # The draw loop (for beginners)
//!
//! Incoming frames are appended to an unbounded FIFO.  Once per *scheduling
//! opportunity* (the host's "next paint" callback, requested with a small
//! defer) the scheduler takes the oldest frame, shows it on every attached
//! surface and produces a [`FrameFeedback`] for it.  Feedback only exists for
//! frames that were actually applied, which is what lets the producer pace
//! itself.
//!
//! ```text
//!  enqueue ──► [ f3 f2 f1 ] ──tick──► display f1 ──► feedback(f1)
//!                                         │
//!              no surfaces: re-arm now ◄──┤
//!              surfaces:    re-arm when one reports "content loaded"
//! ```
//!
//! The scheduler is a two-state machine: `Idle` (no opportunity requested)
//! and `TickPending` (exactly one requested).  [`FrameScheduler::request_tick`]
//! is idempotent, so any number of re-arm requests before the tick runs
//! result in a single scheduled tick.
//!
//! Binary frames are shown through a transient host resource.  The
//! scheduler owns the resource of the frame currently on screen and hands
//! it back to the host right before the next frame replaces it, or on
//! teardown.

use std::collections::VecDeque;

use tracing::trace;

use crate::application::ports::FrameSink;
use crate::domain::frame::{Frame, FrameFeedback, FramePayload};
use crate::domain::surface::{FrameSource, SurfaceId, TransientResource};

/// Whether a scheduling opportunity is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    TickPending,
}

/// Counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Frames applied to the surfaces.
    pub applied_frames: u64,
    /// Ticks that found the queue empty.
    pub idle_ticks: u64,
    /// Largest queue length observed.
    pub max_queue_depth: usize,
}

/// Result of one [`FrameScheduler::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// Feedback for the frame applied in this tick, if any.
    pub applied: Option<FrameFeedback>,
    /// `true` if the caller should request the next opportunity right away.
    pub rearm: bool,
}

/// The frame queue plus the "last applied frame" state.
#[derive(Debug)]
pub struct FrameScheduler {
    queue: VecDeque<Frame>,
    state: SchedulerState,
    last_frame: Frame,
    current_transient: Option<TransientResource>,
    stats: SchedulerStats,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler {
    /// Creates an idle scheduler whose last applied frame is the placeholder.
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            state: SchedulerState::Idle,
            last_frame: Frame::placeholder(),
            current_transient: None,
            stats: SchedulerStats::default(),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn last_frame(&self) -> &Frame {
        &self.last_frame
    }

    /// Appends a frame.  Nothing is ever dropped or coalesced.
    pub fn enqueue(&mut self, frame: Frame) {
        self.queue.push_back(frame);
        self.stats.max_queue_depth = self.stats.max_queue_depth.max(self.queue.len());
        trace!("frame queued, depth {}", self.queue.len());
    }

    /// Marks a scheduling opportunity as requested.
    ///
    /// Returns `true` if the caller must actually schedule it, `false` if one
    /// is already pending.
    pub fn request_tick(&mut self) -> bool {
        match self.state {
            SchedulerState::TickPending => false,
            SchedulerState::Idle => {
                self.state = SchedulerState::TickPending;
                true
            }
        }
    }

    /// Runs one scheduling opportunity.
    ///
    /// Applies at most one frame to `surfaces`.  `local_time` is the client
    /// wall clock stamped into the feedback.
    pub fn tick(&mut self, sink: &dyn FrameSink, surfaces: &[SurfaceId], local_time: f64) -> TickOutcome {
        self.state = SchedulerState::Idle;

        let Some(frame) = self.queue.pop_front() else {
            self.stats.idle_ticks += 1;
            return TickOutcome {
                applied: None,
                rearm: true,
            };
        };

        let next_transient = match frame.payload() {
            FramePayload::Binary { data, mime_type } => Some(sink.create_transient(data, mime_type)),
            FramePayload::Inline(_) => None,
        };
        // The outgoing resource has been on screen; free it just before it is replaced.
        if let Some(old) = self.current_transient.take() {
            sink.release_transient(old);
        }
        self.current_transient = next_transient;

        self.last_frame = frame;
        if let Some(source) = self.current_source() {
            sink.display(surfaces, source);
        }
        self.stats.applied_frames += 1;

        let feedback = self.last_frame.feedback(local_time);
        trace!("applied frame {} to {} surfaces", feedback.index, surfaces.len());
        TickOutcome {
            applied: Some(feedback),
            rearm: surfaces.is_empty(),
        }
    }

    /// Shows the last applied frame on `surfaces` (used for newly attached
    /// surfaces).
    pub fn show_last_frame(&self, sink: &dyn FrameSink, surfaces: &[SurfaceId]) {
        if let Some(source) = self.current_source() {
            sink.display(surfaces, source);
        }
    }

    /// Drops queued frames and releases the transient resource, if any.
    pub fn teardown(&mut self, sink: &dyn FrameSink) {
        self.queue.clear();
        if let Some(resource) = self.current_transient.take() {
            sink.release_transient(resource);
        }
        self.state = SchedulerState::Idle;
    }

    fn current_source(&self) -> Option<FrameSource<'_>> {
        match self.last_frame.payload() {
            FramePayload::Inline(src) => Some(FrameSource::Inline(src)),
            FramePayload::Binary { .. } => self.current_transient.as_ref().map(FrameSource::Transient),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
