//! Runtime clock: a wall-clock-derived state machine over a built segment
//! sequence.
//!
//! The clock has no internal thread and never reads the system time; every
//! command takes an explicit epoch-millisecond timestamp, so the state
//! machine is fully deterministic under test.
//!
//! The central invariant: elapsed time and the current segment are always
//! *derived* from `now - started_at - pause_accumulated`, never accumulated
//! tick-over-tick. A late-firing tick therefore produces the same state as
//! a tick that fired on schedule, which makes the clock immune to dropped
//! ticks and background throttling.

use serde::{Deserialize, Serialize};

use super::segments::{total_duration_ms, TimedSegment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeStatus {
    Idle,
    Running,
    Paused,
    Completed,
}

/// The clock value for one timer session.
///
/// The segment sequence is frozen for the life of the session; only the
/// counters change, and only through the command methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeState {
    segments: Vec<TimedSegment>,
    status: RuntimeStatus,
    current_segment_index: usize,
    segment_elapsed_ms: u64,
    total_elapsed_ms: u64,
    /// Epoch ms of the session start. Signed because a skip re-anchors
    /// it backwards, possibly past zero under test timestamps.
    started_at_ms: Option<i64>,
    /// Epoch ms when the current pause began.
    paused_at_ms: Option<i64>,
    /// Total paused duration excluded from elapsed time.
    pause_accumulated_ms: i64,
}

impl RuntimeState {
    /// Create an idle clock over a built segment sequence.
    pub fn new(segments: Vec<TimedSegment>) -> Self {
        Self {
            segments,
            status: RuntimeStatus::Idle,
            current_segment_index: 0,
            segment_elapsed_ms: 0,
            total_elapsed_ms: 0,
            started_at_ms: None,
            paused_at_ms: None,
            pause_accumulated_ms: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> RuntimeStatus {
        self.status
    }

    pub fn segments(&self) -> &[TimedSegment] {
        &self.segments
    }

    pub fn current_segment_index(&self) -> usize {
        self.current_segment_index
    }

    pub fn segment_elapsed_ms(&self) -> u64 {
        self.segment_elapsed_ms
    }

    pub fn total_elapsed_ms(&self) -> u64 {
        self.total_elapsed_ms
    }

    pub fn current_segment(&self) -> Option<&TimedSegment> {
        self.segments.get(self.current_segment_index)
    }

    pub fn next_segment(&self) -> Option<&TimedSegment> {
        self.segments.get(self.current_segment_index + 1)
    }

    pub fn is_last_segment(&self) -> bool {
        self.current_segment_index + 1 >= self.segments.len()
    }

    pub fn total_duration_ms(&self) -> u64 {
        total_duration_ms(&self.segments)
    }

    /// Remaining time in the current segment.
    pub fn remaining_in_segment_ms(&self) -> u64 {
        self.current_segment()
            .map(|s| s.duration_ms.saturating_sub(self.segment_elapsed_ms))
            .unwrap_or(0)
    }

    /// Remaining time in the whole timer.
    pub fn remaining_total_ms(&self) -> u64 {
        self.total_duration_ms().saturating_sub(self.total_elapsed_ms)
    }

    /// 0.0 .. 100.0 progress across the whole timer.
    ///
    /// A zero-duration sequence reads as 100 so the UI never divides by
    /// zero or freezes at an ambiguous state.
    pub fn progress_pct(&self) -> f64 {
        let total = self.total_duration_ms();
        if total == 0 {
            return 100.0;
        }
        (self.total_elapsed_ms as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a fresh session. No-op while running; from any other state
    /// this is a full reset-and-go, not a resume.
    pub fn start(&mut self, now_ms: i64) {
        if self.status == RuntimeStatus::Running {
            return;
        }
        self.status = RuntimeStatus::Running;
        self.started_at_ms = Some(now_ms);
        self.paused_at_ms = None;
        self.pause_accumulated_ms = 0;
        self.current_segment_index = 0;
        self.segment_elapsed_ms = 0;
        self.total_elapsed_ms = 0;
    }

    /// Freeze the clock. Elapsed counters are not recomputed here; they
    /// stop advancing because `tick` is a no-op while paused.
    pub fn pause(&mut self, now_ms: i64) {
        if self.status != RuntimeStatus::Running {
            return;
        }
        self.status = RuntimeStatus::Paused;
        self.paused_at_ms = Some(now_ms);
    }

    /// Fold the completed pause gap into the accumulator and run again.
    /// This is what makes elapsed time exclude paused duration.
    pub fn resume(&mut self, now_ms: i64) {
        if self.status != RuntimeStatus::Paused {
            return;
        }
        if let Some(paused_at) = self.paused_at_ms.take() {
            self.pause_accumulated_ms += (now_ms - paused_at).max(0);
        }
        self.status = RuntimeStatus::Running;
    }

    /// Back to idle with all counters zeroed; segments are preserved for
    /// a new session over the same sequence.
    pub fn reset(&mut self) {
        self.status = RuntimeStatus::Idle;
        self.current_segment_index = 0;
        self.segment_elapsed_ms = 0;
        self.total_elapsed_ms = 0;
        self.started_at_ms = None;
        self.paused_at_ms = None;
        self.pause_accumulated_ms = 0;
    }

    /// Derive the current segment and elapsed counters from wall-clock
    /// time. No-op unless running.
    pub fn tick(&mut self, now_ms: i64) {
        if self.status != RuntimeStatus::Running {
            return;
        }
        let Some(started_at) = self.started_at_ms else {
            return;
        };
        let effective = (now_ms - started_at - self.pause_accumulated_ms).max(0) as u64;
        let total = self.total_duration_ms();
        if effective >= total {
            self.pin_completed();
            return;
        }
        let mut cumulative = 0u64;
        for (i, seg) in self.segments.iter().enumerate() {
            if effective < cumulative + seg.duration_ms {
                self.current_segment_index = i;
                self.segment_elapsed_ms = effective - cumulative;
                break;
            }
            cumulative += seg.duration_ms;
        }
        self.total_elapsed_ms = effective;
    }

    /// Jump to the next segment boundary by re-anchoring the start time,
    /// so subsequent ticks stay wall-clock-derived. Skipping the last
    /// segment completes the timer immediately.
    pub fn skip(&mut self, now_ms: i64) {
        if !matches!(self.status, RuntimeStatus::Running | RuntimeStatus::Paused) {
            return;
        }
        if self.is_last_segment() {
            self.pin_completed();
            return;
        }
        let boundary: u64 = self
            .segments
            .iter()
            .take(self.current_segment_index + 1)
            .map(|s| s.duration_ms)
            .sum();
        if self.status == RuntimeStatus::Paused {
            // The ongoing pause restarts at the skip moment.
            self.paused_at_ms = Some(now_ms);
        }
        self.started_at_ms = Some(now_ms - self.pause_accumulated_ms - boundary as i64);
        self.current_segment_index += 1;
        self.segment_elapsed_ms = 0;
        self.total_elapsed_ms = boundary;
    }

    /// Explicit early completion (user-driven), keeping whatever elapsed
    /// time has accrued. No-op once completed or never started.
    pub fn complete_early(&mut self, now_ms: i64) {
        match self.status {
            RuntimeStatus::Running => {
                self.tick(now_ms);
                self.status = RuntimeStatus::Completed;
                self.paused_at_ms = None;
            }
            RuntimeStatus::Paused => {
                self.status = RuntimeStatus::Completed;
                self.paused_at_ms = None;
            }
            RuntimeStatus::Idle | RuntimeStatus::Completed => {}
        }
    }

    /// Completion pins the index to the last segment and the segment
    /// elapsed to its full duration, so progress reads 100%, never over.
    fn pin_completed(&mut self) {
        self.status = RuntimeStatus::Completed;
        self.current_segment_index = self.segments.len().saturating_sub(1);
        self.segment_elapsed_ms = self.segments.last().map(|s| s.duration_ms).unwrap_or(0);
        self.total_elapsed_ms = self.total_duration_ms();
        self.paused_at_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::TimerSpec;
    use crate::timer::build_segments;

    fn emom_clock(interval_secs: u32, total_minutes: u32) -> RuntimeState {
        RuntimeState::new(build_segments(&TimerSpec::Emom {
            interval_secs,
            total_minutes,
        }))
    }

    #[test]
    fn start_resets_counters() {
        let mut clock = emom_clock(60, 10);
        clock.start(1_000);
        clock.tick(31_000);
        assert_eq!(clock.total_elapsed_ms(), 30_000);

        // Restart is a full session reset, not a resume.
        clock.pause(31_000);
        clock.start(100_000);
        assert_eq!(clock.total_elapsed_ms(), 0);
        assert_eq!(clock.current_segment_index(), 0);
        clock.tick(100_500);
        assert_eq!(clock.total_elapsed_ms(), 500);
    }

    #[test]
    fn tick_derives_segment_from_elapsed() {
        let mut clock = emom_clock(30, 4);
        clock.start(0);
        clock.tick(45_000);
        assert_eq!(clock.current_segment_index(), 1);
        assert_eq!(clock.segment_elapsed_ms(), 15_000);
        assert_eq!(clock.total_elapsed_ms(), 45_000);
    }

    #[test]
    fn delayed_tick_equals_fine_grained_ticks() {
        let mut coarse = emom_clock(30, 4);
        coarse.start(0);
        coarse.tick(87_300);

        let mut fine = emom_clock(30, 4);
        fine.start(0);
        let mut t = 0;
        while t < 87_300 {
            t += 100;
            fine.tick(t.min(87_300));
        }

        assert_eq!(coarse.current_segment_index(), fine.current_segment_index());
        assert_eq!(coarse.segment_elapsed_ms(), fine.segment_elapsed_ms());
        assert_eq!(coarse.total_elapsed_ms(), fine.total_elapsed_ms());
    }

    #[test]
    fn pause_resume_excludes_gap() {
        let mut clock = emom_clock(30, 4);
        clock.start(0);
        clock.tick(5_000);
        clock.pause(5_000);
        clock.tick(7_000); // No-op while paused.
        assert_eq!(clock.total_elapsed_ms(), 5_000);
        clock.resume(9_000);
        clock.tick(9_000 + 1_500);
        assert_eq!(clock.total_elapsed_ms(), 6_500);
    }

    #[test]
    fn pause_resume_spanning_segments() {
        let mut clock = emom_clock(30, 4);
        clock.start(0);
        clock.tick(45_000);
        clock.pause(45_000);
        clock.resume(50_000);
        clock.tick(100_000);
        // effective = 100000 - 5000 = 95000, inside segment 3.
        assert_eq!(clock.current_segment_index(), 3);
        assert_eq!(clock.segment_elapsed_ms(), 5_000);
    }

    #[test]
    fn completion_pins_to_last_segment() {
        let mut clock = emom_clock(30, 4);
        clock.start(0);
        clock.tick(500_000);
        assert_eq!(clock.status(), RuntimeStatus::Completed);
        assert_eq!(clock.current_segment_index(), 3);
        assert_eq!(clock.segment_elapsed_ms(), 30_000);
        assert_eq!(clock.total_elapsed_ms(), 120_000);
        assert_eq!(clock.remaining_total_ms(), 0);
        assert_eq!(clock.progress_pct(), 100.0);
    }

    #[test]
    fn skip_advances_to_next_boundary() {
        let mut clock = emom_clock(30, 4);
        clock.start(0);
        clock.tick(10_000);
        clock.skip(10_000);
        assert_eq!(clock.current_segment_index(), 1);
        assert_eq!(clock.total_elapsed_ms(), 30_000);
        assert_eq!(clock.segment_elapsed_ms(), 0);
        // Subsequent ticks stay wall-clock-derived from the new anchor.
        clock.tick(15_000);
        assert_eq!(clock.total_elapsed_ms(), 35_000);
        assert_eq!(clock.current_segment_index(), 1);
    }

    #[test]
    fn skip_on_last_segment_completes() {
        let mut clock = emom_clock(30, 2);
        clock.start(0);
        clock.tick(40_000);
        assert_eq!(clock.current_segment_index(), 1);
        clock.skip(40_000);
        assert_eq!(clock.status(), RuntimeStatus::Completed);
        assert_eq!(clock.current_segment_index(), 1);
        assert_eq!(clock.segment_elapsed_ms(), 30_000);
    }

    #[test]
    fn skip_while_paused_keeps_pause() {
        let mut clock = emom_clock(30, 4);
        clock.start(0);
        clock.tick(10_000);
        clock.pause(10_000);
        clock.skip(12_000);
        assert_eq!(clock.status(), RuntimeStatus::Paused);
        assert_eq!(clock.current_segment_index(), 1);
        clock.resume(20_000);
        clock.tick(25_000);
        assert_eq!(clock.total_elapsed_ms(), 35_000);
    }

    #[test]
    fn invalid_transitions_are_noops() {
        let mut clock = emom_clock(30, 2);
        clock.pause(100); // Not running.
        assert_eq!(clock.status(), RuntimeStatus::Idle);
        clock.resume(200); // Not paused.
        assert_eq!(clock.status(), RuntimeStatus::Idle);
        clock.tick(300); // Not started.
        assert_eq!(clock.total_elapsed_ms(), 0);
        clock.skip(400); // Idle skip.
        assert_eq!(clock.current_segment_index(), 0);

        clock.start(1_000);
        clock.pause(2_000);
        clock.pause(3_000); // Double pause keeps the first anchor.
        clock.resume(4_000);
        clock.tick(5_000);
        assert_eq!(clock.total_elapsed_ms(), 2_000);
    }

    #[test]
    fn progress_pct_zero_duration_reads_full() {
        let clock = RuntimeState::new(vec![]);
        assert_eq!(clock.progress_pct(), 100.0);
    }

    #[test]
    fn reset_preserves_segments() {
        let mut clock = emom_clock(30, 4);
        clock.start(0);
        clock.tick(45_000);
        clock.reset();
        assert_eq!(clock.status(), RuntimeStatus::Idle);
        assert_eq!(clock.total_elapsed_ms(), 0);
        assert_eq!(clock.segments().len(), 4);
    }

    #[test]
    fn complete_early_keeps_accrued_progress() {
        let mut clock = emom_clock(60, 10);
        clock.start(0);
        clock.complete_early(150_000);
        assert_eq!(clock.status(), RuntimeStatus::Completed);
        assert_eq!(clock.total_elapsed_ms(), 150_000);
        assert_eq!(clock.current_segment_index(), 2);
    }
}
