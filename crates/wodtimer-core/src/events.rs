//! Discrete session events.
//!
//! Every observable transition in a timer session produces an [`Event`].
//! The UI polls snapshots; the sound adapter consumes transition events;
//! persistence consumes `WorkoutCompleted`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{SegmentKind, SessionStatus, TimedSegment, TimerSessionResults};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Pre-start countdown tick (3, 2, 1).
    CountdownTick {
        seconds_left: u32,
        at: DateTime<Utc>,
    },
    /// The underlying clock started; carries the first segment.
    TimerStarted {
        segment: TimedSegment,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    /// A segment finished (by clock progress or skip).
    SegmentEnded {
        segment: TimedSegment,
        at: DateTime<Utc>,
    },
    /// The derived current segment changed; carries the new segment and,
    /// for stacked specs, the active block index.
    SegmentStarted {
        segment: TimedSegment,
        block_index: Option<usize>,
        at: DateTime<Utc>,
    },
    SegmentSkipped {
        from_order: usize,
        to_order: usize,
        at: DateTime<Utc>,
    },
    /// Remaining time in the current segment crossed 10 s or 5 s.
    Warning {
        seconds_left: u32,
        at: DateTime<Utc>,
    },
    /// A stacked block finished.
    BlockCompleted {
        block_index: usize,
        label: String,
        at: DateTime<Utc>,
    },
    /// The whole workout finished, naturally or by explicit early stop.
    /// Emitted exactly once per session.
    WorkoutCompleted {
        results: TimerSessionResults,
        at: DateTime<Utc>,
    },
    /// Full derived read-model for the UI.
    StateSnapshot {
        status: SessionStatus,
        segment_label: String,
        segment_kind: Option<SegmentKind>,
        remaining_in_segment_ms: u64,
        remaining_total_ms: u64,
        progress_pct: f64,
        current_round: u32,
        total_rounds: u32,
        block_label: Option<String>,
        at: DateTime<Utc>,
    },
}
