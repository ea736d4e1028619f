//! Session orchestrator: a thin stateful shell over the pure runtime clock.
//!
//! The orchestrator owns a [`RuntimeState`] and layers session bookkeeping
//! on top: the pre-start countdown phase, block tracking for stacked specs,
//! and discrete event emission when the derived current segment changes or
//! the clock completes. All timing arithmetic stays in the clock; the
//! caller drives `tick` from a periodic source (roughly every 100 ms while
//! running, 1 s during countdown).
//!
//! Control operations are silent no-ops on invalid transitions. The driver
//! may fire redundantly or late; because the clock derives state from wall
//! time, a late tick self-corrects and needs no catch-up logic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::events::Event;
use crate::spec::TimerSpec;

use super::clock::{RuntimeState, RuntimeStatus};
use super::segments::{build_segments, SegmentKind};

/// Seconds counted down before the clock starts, unless configured.
pub const DEFAULT_COUNTDOWN_SECS: u32 = 3;

const WARNING_THRESHOLDS_MS: [u64; 2] = [5_000, 10_000];

/// Session-level status, distinct from the clock's [`RuntimeStatus`]:
/// the countdown phase exists only here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Countdown,
    Running,
    Paused,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockStatus {
    Pending,
    Active,
    Completed,
}

/// Per-block state for stacked specifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockRuntime {
    pub id: String,
    pub label: String,
    pub status: BlockStatus,
}

/// Terminal record handed to the persistence collaborator, produced
/// exactly once per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSessionResults {
    pub completed_at: DateTime<Utc>,
    pub total_elapsed_ms: u64,
    pub total_rounds_completed: u32,
    pub exercises_completed: u32,
    #[serde(default)]
    pub blocks_completed: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub beat_time_cap: Option<bool>,
    #[serde(default)]
    pub failed_at_minute: Option<u32>,
}

/// One active workout session: runtime clock plus session bookkeeping.
///
/// Mutated only through its control methods; every mutation returns the
/// discrete events it produced, in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSession {
    workout_id: String,
    spec: TimerSpec,
    runtime: RuntimeState,
    status: SessionStatus,
    countdown_secs: u32,
    countdown_remaining: u32,
    sound_enabled: bool,
    /// Block states; empty for non-stacked specs.
    blocks: Vec<BlockRuntime>,
    active_block: usize,
    /// True after `skip_to_block`: the runtime holds only the active
    /// block's own segments.
    block_scoped: bool,
    results: Option<TimerSessionResults>,
    completion_emitted: bool,
    /// Remaining-in-segment at the previous tick, for warning crossings.
    prev_remaining_ms: u64,
}

impl TimerSession {
    /// Create an idle session. The spec is validated here, at the
    /// boundary; the builder then assumes well-formed input.
    pub fn new(
        workout_id: impl Into<String>,
        spec: TimerSpec,
        countdown_secs: Option<u32>,
    ) -> Result<Self, ValidationError> {
        spec.validate()?;
        let blocks = match &spec {
            TimerSpec::Stacked { blocks } => blocks
                .iter()
                .map(|b| BlockRuntime {
                    id: b.id.clone(),
                    label: b.label.clone(),
                    status: BlockStatus::Pending,
                })
                .collect(),
            _ => Vec::new(),
        };
        let runtime = RuntimeState::new(build_segments(&spec));
        Ok(Self {
            workout_id: workout_id.into(),
            spec,
            runtime,
            status: SessionStatus::Idle,
            countdown_secs: countdown_secs.unwrap_or(DEFAULT_COUNTDOWN_SECS),
            countdown_remaining: 0,
            sound_enabled: true,
            blocks,
            active_block: 0,
            block_scoped: false,
            results: None,
            completion_emitted: false,
            prev_remaining_ms: 0,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn workout_id(&self) -> &str {
        &self.workout_id
    }

    pub fn spec(&self) -> &TimerSpec {
        &self.spec
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn runtime(&self) -> &RuntimeState {
        &self.runtime
    }

    pub fn blocks(&self) -> &[BlockRuntime] {
        &self.blocks
    }

    pub fn results(&self) -> Option<&TimerSessionResults> {
        self.results.as_ref()
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.sound_enabled = enabled;
    }

    pub fn countdown_remaining(&self) -> u32 {
        self.countdown_remaining
    }

    /// Total round count for display, kind-dependent.
    pub fn total_rounds(&self) -> u32 {
        self.spec.total_rounds()
    }

    /// Current round, read from the active segment's loop index when
    /// present. Stacked sessions report the active block number.
    pub fn current_round(&self) -> u32 {
        if !self.blocks.is_empty() {
            return self.active_block as u32 + 1;
        }
        self.runtime
            .current_segment()
            .and_then(|s| s.loop_index)
            .unwrap_or(self.runtime.current_segment_index() as u32 + 1)
    }

    /// Label of the active block, for stacked sessions.
    pub fn active_block_label(&self) -> Option<&str> {
        self.blocks.get(self.active_block).map(|b| b.label.as_str())
    }

    /// Full derived read-model for the UI.
    pub fn snapshot(&self) -> Event {
        let segment = self.runtime.current_segment();
        Event::StateSnapshot {
            status: self.status,
            segment_label: segment.map(|s| s.label.clone()).unwrap_or_default(),
            segment_kind: segment.map(|s| s.kind),
            remaining_in_segment_ms: self.runtime.remaining_in_segment_ms(),
            remaining_total_ms: self.runtime.remaining_total_ms(),
            progress_pct: self.runtime.progress_pct(),
            current_round: self.current_round(),
            total_rounds: self.total_rounds(),
            block_label: self.active_block_label().map(str::to_string),
            at: Utc::now(),
        }
    }

    // ── Controls ─────────────────────────────────────────────────────

    /// Begin the session: enters the countdown phase when configured,
    /// otherwise starts the clock directly.
    pub fn start(&mut self, now_ms: i64) -> Vec<Event> {
        if self.status != SessionStatus::Idle {
            return Vec::new();
        }
        if self.countdown_secs > 0 {
            self.status = SessionStatus::Countdown;
            self.countdown_remaining = self.countdown_secs;
            return vec![Event::CountdownTick {
                seconds_left: self.countdown_remaining,
                at: Utc::now(),
            }];
        }
        self.start_clock(now_ms)
    }

    /// One-second countdown driver. Starts the clock when it hits zero.
    pub fn countdown_tick(&mut self, now_ms: i64) -> Vec<Event> {
        if self.status != SessionStatus::Countdown {
            return Vec::new();
        }
        self.countdown_remaining = self.countdown_remaining.saturating_sub(1);
        if self.countdown_remaining > 0 {
            return vec![Event::CountdownTick {
                seconds_left: self.countdown_remaining,
                at: Utc::now(),
            }];
        }
        self.start_clock(now_ms)
    }

    /// Periodic driver while running (roughly every 100 ms).
    pub fn tick(&mut self, now_ms: i64) -> Vec<Event> {
        if self.status != SessionStatus::Running {
            return Vec::new();
        }
        let prev_index = self.runtime.current_segment_index();
        let prev_segment = self.runtime.current_segment().cloned();
        self.runtime.tick(now_ms);

        if self.runtime.status() == RuntimeStatus::Completed {
            return self.on_runtime_completed(now_ms);
        }

        let new_index = self.runtime.current_segment_index();
        if new_index != prev_index {
            let mut events = Vec::new();
            if let Some(prev) = prev_segment {
                events.push(Event::SegmentEnded {
                    segment: prev,
                    at: Utc::now(),
                });
            }
            events.extend(self.enter_current_segment());
            return events;
        }

        self.warning_events()
    }

    pub fn pause(&mut self, now_ms: i64) -> Vec<Event> {
        if self.status != SessionStatus::Running {
            return Vec::new();
        }
        self.runtime.pause(now_ms);
        self.status = SessionStatus::Paused;
        vec![Event::TimerPaused {
            remaining_ms: self.runtime.remaining_in_segment_ms(),
            at: Utc::now(),
        }]
    }

    pub fn resume(&mut self, now_ms: i64) -> Vec<Event> {
        if self.status != SessionStatus::Paused {
            return Vec::new();
        }
        self.runtime.resume(now_ms);
        self.status = SessionStatus::Running;
        vec![Event::TimerResumed {
            remaining_ms: self.runtime.remaining_in_segment_ms(),
            at: Utc::now(),
        }]
    }

    /// Back to idle for a fresh session over the same spec. Rebuilds the
    /// full segment sequence and block states; discards any results.
    pub fn reset(&mut self) -> Vec<Event> {
        self.runtime = RuntimeState::new(build_segments(&self.spec));
        self.status = SessionStatus::Idle;
        self.countdown_remaining = 0;
        for block in &mut self.blocks {
            block.status = BlockStatus::Pending;
        }
        self.active_block = 0;
        self.block_scoped = false;
        self.results = None;
        self.completion_emitted = false;
        self.prev_remaining_ms = 0;
        vec![Event::TimerReset { at: Utc::now() }]
    }

    /// Jump to the next segment boundary; on the last segment this
    /// completes the session immediately.
    pub fn skip(&mut self, now_ms: i64) -> Vec<Event> {
        if !matches!(self.status, SessionStatus::Running | SessionStatus::Paused) {
            return Vec::new();
        }
        let from_order = self.runtime.current_segment_index();
        self.runtime.skip(now_ms);

        if self.runtime.status() == RuntimeStatus::Completed {
            return self.on_runtime_completed(now_ms);
        }

        let mut events = vec![Event::SegmentSkipped {
            from_order,
            to_order: self.runtime.current_segment_index(),
            at: Utc::now(),
        }];
        events.extend(self.enter_current_segment());
        events
    }

    /// Jump to a specific block of a stacked session: earlier blocks are
    /// marked completed, later ones pending, and the runtime is replaced
    /// with a fresh one built from the target block's own specification.
    pub fn skip_to_block(&mut self, index: usize, now_ms: i64) -> Vec<Event> {
        if self.blocks.is_empty() || index >= self.blocks.len() {
            return Vec::new();
        }
        if !matches!(self.status, SessionStatus::Running | SessionStatus::Paused) {
            return Vec::new();
        }
        let TimerSpec::Stacked { blocks } = &self.spec else {
            return Vec::new();
        };
        for (i, block) in self.blocks.iter_mut().enumerate() {
            block.status = match i.cmp(&index) {
                std::cmp::Ordering::Less => BlockStatus::Completed,
                std::cmp::Ordering::Equal => BlockStatus::Active,
                std::cmp::Ordering::Greater => BlockStatus::Pending,
            };
        }
        self.active_block = index;
        self.block_scoped = true;
        self.runtime = RuntimeState::new(build_segments(&blocks[index].params));
        self.runtime.start(now_ms);
        self.status = SessionStatus::Running;
        self.prev_remaining_ms = self.runtime.remaining_in_segment_ms();
        match self.runtime.current_segment().cloned() {
            Some(segment) => vec![Event::SegmentStarted {
                segment,
                block_index: Some(index),
                at: Utc::now(),
            }],
            None => Vec::new(),
        }
    }

    /// Explicit early termination: emits results with whatever progress
    /// has accrued, bypassing natural clock exhaustion.
    pub fn mark_complete(&mut self, notes: Option<String>, now_ms: i64) -> Vec<Event> {
        if !matches!(self.status, SessionStatus::Running | SessionStatus::Paused) {
            return Vec::new();
        }
        self.runtime.complete_early(now_ms);
        self.status = SessionStatus::Completed;
        self.finish_blocks();
        let results = self.build_results(notes, true);
        self.results = Some(results.clone());
        if self.completion_emitted {
            return Vec::new();
        }
        self.completion_emitted = true;
        vec![Event::WorkoutCompleted {
            results,
            at: Utc::now(),
        }]
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn start_clock(&mut self, now_ms: i64) -> Vec<Event> {
        self.runtime.start(now_ms);
        self.status = SessionStatus::Running;
        if let Some(block) = self.blocks.first_mut() {
            block.status = BlockStatus::Active;
        }
        self.active_block = 0;
        self.prev_remaining_ms = self.runtime.remaining_in_segment_ms();
        let Some(first) = self.runtime.current_segment().cloned() else {
            return Vec::new();
        };
        let block_index = self.current_block_index();
        vec![
            Event::TimerStarted {
                segment: first.clone(),
                at: Utc::now(),
            },
            Event::SegmentStarted {
                segment: first,
                block_index,
                at: Utc::now(),
            },
        ]
    }

    /// Events for arriving at the (new) current segment: block-complete
    /// when the block changed, then segment-start. Updates block states
    /// and the warning baseline.
    fn enter_current_segment(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if let Some(block_index) = self.current_block_index() {
            if block_index != self.active_block {
                events.extend(self.complete_blocks_through(block_index.saturating_sub(1)));
                self.active_block = block_index;
                if let Some(block) = self.blocks.get_mut(block_index) {
                    block.status = BlockStatus::Active;
                }
            }
        }
        self.prev_remaining_ms = self.runtime.remaining_in_segment_ms();
        if let Some(segment) = self.runtime.current_segment().cloned() {
            let block_index = self.current_block_index();
            events.push(Event::SegmentStarted {
                segment,
                block_index,
                at: Utc::now(),
            });
        }
        events
    }

    /// Active block index: derived from the current segment in the flat
    /// layout, or the tracked index once the runtime is block-scoped.
    fn current_block_index(&self) -> Option<usize> {
        if self.blocks.is_empty() {
            return None;
        }
        if self.block_scoped {
            return Some(self.active_block);
        }
        self.runtime.current_segment().and_then(|s| s.block_index)
    }

    fn warning_events(&mut self) -> Vec<Event> {
        let remaining = self.runtime.remaining_in_segment_ms();
        let prev = self.prev_remaining_ms;
        self.prev_remaining_ms = remaining;
        // Only the most imminent threshold crossed since the last tick.
        for threshold in WARNING_THRESHOLDS_MS {
            if prev > threshold && remaining <= threshold && remaining > 0 {
                return vec![Event::Warning {
                    seconds_left: (threshold / 1000) as u32,
                    at: Utc::now(),
                }];
            }
        }
        Vec::new()
    }

    fn on_runtime_completed(&mut self, now_ms: i64) -> Vec<Event> {
        // A block-scoped runtime finishing is block completion, not
        // necessarily session completion.
        if self.block_scoped && self.active_block + 1 < self.blocks.len() {
            let mut events = Vec::new();
            if let Some(block) = self.blocks.get_mut(self.active_block) {
                block.status = BlockStatus::Completed;
                events.push(Event::BlockCompleted {
                    block_index: self.active_block,
                    label: block.label.clone(),
                    at: Utc::now(),
                });
            }
            self.active_block += 1;
            let TimerSpec::Stacked { blocks } = &self.spec else {
                return events;
            };
            self.runtime = RuntimeState::new(build_segments(&blocks[self.active_block].params));
            self.runtime.start(now_ms);
            if let Some(block) = self.blocks.get_mut(self.active_block) {
                block.status = BlockStatus::Active;
            }
            self.prev_remaining_ms = self.runtime.remaining_in_segment_ms();
            if let Some(segment) = self.runtime.current_segment().cloned() {
                events.push(Event::SegmentStarted {
                    segment,
                    block_index: Some(self.active_block),
                    at: Utc::now(),
                });
            }
            return events;
        }

        self.status = SessionStatus::Completed;
        let mut events = Vec::new();
        if !self.blocks.is_empty() {
            let last = self.blocks.len() - 1;
            events.extend(self.complete_blocks_through(last));
        }
        if self.completion_emitted {
            return events;
        }
        self.completion_emitted = true;
        let results = self.build_results(None, false);
        self.results = Some(results.clone());
        events.push(Event::WorkoutCompleted {
            results,
            at: Utc::now(),
        });
        events
    }

    /// Mark blocks up to `last` completed, emitting one event per block
    /// that newly completes.
    fn complete_blocks_through(&mut self, last: usize) -> Vec<Event> {
        let mut events = Vec::new();
        for (i, block) in self.blocks.iter_mut().enumerate().take(last + 1) {
            if block.status != BlockStatus::Completed {
                block.status = BlockStatus::Completed;
                events.push(Event::BlockCompleted {
                    block_index: i,
                    label: block.label.clone(),
                    at: Utc::now(),
                });
            }
        }
        events
    }

    fn finish_blocks(&mut self) {
        // Early stop: blocks at or before the active one count as done.
        let active = self.active_block;
        for (i, block) in self.blocks.iter_mut().enumerate() {
            if i <= active {
                block.status = BlockStatus::Completed;
            }
        }
    }

    fn build_results(&self, notes: Option<String>, early: bool) -> TimerSessionResults {
        let total = self.total_rounds();
        let total_rounds_completed = if early {
            self.current_round().min(total)
        } else {
            total
        };
        let exercises_completed = self.completed_work_segments();
        let blocks_completed = if self.blocks.is_empty() {
            None
        } else {
            Some(
                self.blocks
                    .iter()
                    .filter(|b| b.status == BlockStatus::Completed)
                    .count() as u32,
            )
        };
        let beat_time_cap = match &self.spec {
            TimerSpec::ForTime {
                time_cap_secs: Some(cap),
            } => Some(early && self.runtime.total_elapsed_ms() < u64::from(*cap) * 1000),
            _ => None,
        };
        let failed_at_minute = match &self.spec {
            TimerSpec::DeathBy { .. } if early => self
                .runtime
                .current_segment()
                .and_then(|s| s.loop_index),
            _ => None,
        };
        TimerSessionResults {
            completed_at: Utc::now(),
            total_elapsed_ms: self.runtime.total_elapsed_ms(),
            total_rounds_completed,
            exercises_completed,
            blocks_completed,
            notes,
            beat_time_cap,
            failed_at_minute,
        }
    }

    /// Work segments whose full duration has elapsed.
    fn completed_work_segments(&self) -> u32 {
        let elapsed = self.runtime.total_elapsed_ms();
        let mut cumulative = 0u64;
        let mut count = 0u32;
        for seg in self.runtime.segments() {
            cumulative += seg.duration_ms;
            if seg.kind == SegmentKind::Work && cumulative <= elapsed {
                count += 1;
            }
        }
        count
    }
}
