//! Display pairing between a workout's exercise list and timer segments.
//!
//! The exercise list comes from upstream (manual entry or AI generation)
//! and is used only for display: pairing is positional by round, and a
//! count mismatch degrades to "no exercise shown" rather than erroring.

use serde::{Deserialize, Serialize};

use crate::timer::TimedSegment;

/// One exercise of the workout being timed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutExercise {
    pub name: String,
    pub target_reps: u32,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub rest_secs: Option<u32>,
}

/// The exercise to display alongside a segment, paired by the segment's
/// round number (1-based loop index, falling back to sequence order).
pub fn exercise_for_segment<'a>(
    exercises: &'a [WorkoutExercise],
    segment: &TimedSegment,
) -> Option<&'a WorkoutExercise> {
    let position = segment
        .loop_index
        .map(|n| n.saturating_sub(1) as usize)
        .unwrap_or(segment.order);
    exercises.get(position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::TimerSpec;
    use crate::timer::build_segments;

    fn exercises(n: usize) -> Vec<WorkoutExercise> {
        (0..n)
            .map(|i| WorkoutExercise {
                name: format!("Exercise {}", i + 1),
                target_reps: 10,
                weight_kg: None,
                rest_secs: None,
            })
            .collect()
    }

    #[test]
    fn pairs_by_round() {
        let segments = build_segments(&TimerSpec::Emom {
            interval_secs: 60,
            total_minutes: 3,
        });
        let list = exercises(3);
        assert_eq!(
            exercise_for_segment(&list, &segments[1]).unwrap().name,
            "Exercise 2"
        );
    }

    #[test]
    fn extra_segments_show_nothing() {
        let segments = build_segments(&TimerSpec::Emom {
            interval_secs: 60,
            total_minutes: 5,
        });
        let list = exercises(2);
        assert!(exercise_for_segment(&list, &segments[4]).is_none());
    }
}
