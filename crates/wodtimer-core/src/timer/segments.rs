//! Segment builder: expands a [`TimerSpec`] into a flat segment sequence.
//!
//! Pure and deterministic -- no I/O, no clock access. The builder assumes
//! validated input (see [`TimerSpec::validate`]); a malformed spec is a
//! precondition violation, not a runtime error to recover from.
//!
//! Rep-paced kinds (chipper, ladder, death-by) have no intrinsic duration,
//! so the builder assigns a display duration from a deterministic fallback
//! policy. The runtime clock treats these durations as authoritative
//! regardless of origin.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::spec::{TimerSpec, DEFAULT_DEATH_BY_MAX_MINUTES};

/// Display ceiling for an uncapped for-time workout.
pub const FOR_TIME_DEFAULT_CAP_SECS: u32 = 3600;

/// Display duration per chipper exercise when no time cap is set.
pub const CHIPPER_DEFAULT_PER_EXERCISE_SECS: u32 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Work,
    Rest,
}

/// One atomic timed phase of a workout.
///
/// Produced only by [`build_segments`]; sequence order is the authority for
/// what happens next. Ids are globally unique for the life of the process,
/// never reused across rebuilds, so UI keys stay stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedSegment {
    pub id: Uuid,
    pub label: String,
    pub kind: SegmentKind,
    pub duration_ms: u64,
    /// 0-based position in the built sequence.
    pub order: usize,
    /// Round/minute number for display, when the kind has one.
    #[serde(default)]
    pub loop_index: Option<u32>,
    /// Owning block for segments of a stacked spec.
    #[serde(default)]
    pub block_index: Option<usize>,
}

fn secs_to_ms(secs: u32) -> u64 {
    u64::from(secs) * 1000
}

fn segment(label: String, kind: SegmentKind, secs: u32, loop_index: Option<u32>) -> TimedSegment {
    TimedSegment {
        id: Uuid::new_v4(),
        label,
        kind,
        duration_ms: secs_to_ms(secs),
        order: 0,
        loop_index,
        block_index: None,
    }
}

/// Expand a specification into its ordered segment sequence.
///
/// Every well-formed spec expands to at least one segment. Stacked specs
/// expand recursively: each block's segments are rebuilt fresh, relabeled
/// with the block label, and re-indexed into one continuous sequence, with
/// an inter-block rest appended after each block except the last.
pub fn build_segments(spec: &TimerSpec) -> Vec<TimedSegment> {
    let mut segments = match spec {
        TimerSpec::Emom {
            interval_secs,
            total_minutes,
        } => (1..=*total_minutes)
            .map(|minute| {
                segment(
                    format!("Minute {minute}"),
                    SegmentKind::Work,
                    *interval_secs,
                    Some(minute),
                )
            })
            .collect(),

        TimerSpec::Amrap { duration_secs } => vec![segment(
            "AMRAP".to_string(),
            SegmentKind::Work,
            *duration_secs,
            Some(1),
        )],

        TimerSpec::IntervalWorkRest {
            work_secs,
            rest_secs,
            total_rounds,
        } => alternating_rounds(*work_secs, *rest_secs, *total_rounds),

        TimerSpec::Tabata {
            work_secs,
            rest_secs,
            rounds,
        } => alternating_rounds(*work_secs, *rest_secs, *rounds),

        TimerSpec::ForTime { time_cap_secs } => vec![segment(
            "For Time".to_string(),
            SegmentKind::Work,
            time_cap_secs.unwrap_or(FOR_TIME_DEFAULT_CAP_SECS),
            Some(1),
        )],

        TimerSpec::Chipper {
            exercises,
            time_cap_secs,
        } => {
            // Rep-paced: the per-exercise duration is display policy only.
            let per_exercise_secs = time_cap_secs
                .map(|cap| cap / exercises.len() as u32)
                .unwrap_or(CHIPPER_DEFAULT_PER_EXERCISE_SECS);
            exercises
                .iter()
                .enumerate()
                .map(|(i, exercise)| {
                    segment(
                        format!("{} x{}", exercise.name, exercise.target_reps),
                        SegmentKind::Work,
                        per_exercise_secs,
                        Some(i as u32 + 1),
                    )
                })
                .collect()
        }

        TimerSpec::Ladder {
            pattern,
            rest_between_rounds_secs,
            ..
        } => {
            let rest = rest_between_rounds_secs.filter(|r| *r > 0);
            let mut out = Vec::with_capacity(pattern.len() * 2);
            for (i, reps) in pattern.iter().enumerate() {
                out.push(segment(
                    format!("{reps} reps"),
                    SegmentKind::Work,
                    CHIPPER_DEFAULT_PER_EXERCISE_SECS,
                    Some(i as u32 + 1),
                ));
                // Between rounds only, never trailing.
                if let Some(rest_secs) = rest {
                    if i + 1 < pattern.len() {
                        out.push(segment(
                            "Rest".to_string(),
                            SegmentKind::Rest,
                            rest_secs,
                            Some(i as u32 + 1),
                        ));
                    }
                }
            }
            out
        }

        TimerSpec::DeathBy {
            exercise_name,
            starting_reps,
            increment_per_minute,
            max_minutes,
        } => {
            let minutes = max_minutes.unwrap_or(DEFAULT_DEATH_BY_MAX_MINUTES);
            (1..=minutes)
                .map(|minute| {
                    let reps = starting_reps + (minute - 1) * increment_per_minute;
                    segment(
                        format!("Minute {minute}: {reps} {exercise_name}"),
                        SegmentKind::Work,
                        60,
                        Some(minute),
                    )
                })
                .collect()
        }

        TimerSpec::Stacked { blocks } => {
            let mut out = Vec::new();
            for (block_index, block) in blocks.iter().enumerate() {
                for mut seg in build_segments(&block.params) {
                    seg.label = format!("{}: {}", block.label, seg.label);
                    seg.block_index = Some(block_index);
                    out.push(seg);
                }
                if let Some(rest_secs) = block.rest_after_secs.filter(|r| *r > 0) {
                    if block_index + 1 < blocks.len() {
                        let mut rest =
                            segment("Rest".to_string(), SegmentKind::Rest, rest_secs, None);
                        rest.block_index = Some(block_index);
                        out.push(rest);
                    }
                }
            }
            out
        }
    };

    for (order, seg) in segments.iter_mut().enumerate() {
        seg.order = order;
    }
    segments
}

fn alternating_rounds(work_secs: u32, rest_secs: u32, rounds: u32) -> Vec<TimedSegment> {
    let mut out = Vec::with_capacity(rounds as usize * 2);
    for round in 1..=rounds {
        out.push(segment(
            format!("Round {round}: Work"),
            SegmentKind::Work,
            work_secs,
            Some(round),
        ));
        if rest_secs > 0 {
            out.push(segment(
                format!("Round {round}: Rest"),
                SegmentKind::Rest,
                rest_secs,
                Some(round),
            ));
        }
    }
    out
}

/// Sum of all segment durations in milliseconds.
pub fn total_duration_ms(segments: &[TimedSegment]) -> u64 {
    segments.iter().map(|s| s.duration_ms).sum()
}
