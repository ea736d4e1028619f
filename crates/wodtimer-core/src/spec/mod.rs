//! Timer specification types.
//!
//! A [`TimerSpec`] is the declarative, user- or AI-authored description of a
//! workout's time structure. It is immutable once constructed and expands
//! into a flat segment sequence via [`crate::timer::build_segments`].
//!
//! Validation lives here, at the boundary: callers validate a spec once
//! (when it is constructed from user input or an AI suggestion) and the
//! segment builder assumes well-formed input from then on.

mod intake;

pub use intake::TimerSuggestion;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Default cap for death-by timers when none is configured.
pub const DEFAULT_DEATH_BY_MAX_MINUTES: u32 = 20;

/// Direction of a ladder's rep pattern, kept for display purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LadderDirection {
    Ascending,
    Descending,
    Pyramid,
}

impl Default for LadderDirection {
    fn default() -> Self {
        LadderDirection::Descending
    }
}

/// One exercise entry in a chipper workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChipperExercise {
    pub name: String,
    pub target_reps: u32,
}

/// One sub-unit of a stacked timer: a full specification plus a label and
/// an optional rest inserted after the block (except after the last).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerBlock {
    pub id: String,
    pub label: String,
    pub params: TimerSpec,
    #[serde(default)]
    pub rest_after_secs: Option<u32>,
}

/// Declarative workout timer specification, one variant per timer kind.
///
/// Closed sum type: the segment builder matches exhaustively, so adding a
/// kind without teaching the builder about it is a compile error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimerSpec {
    /// Every minute on the minute: `total_minutes` windows of
    /// `interval_secs` each, all work.
    Emom {
        interval_secs: u32,
        total_minutes: u32,
    },
    /// As many rounds as possible within one bounded duration.
    Amrap { duration_secs: u32 },
    /// Alternating work/rest pairs, `total_rounds` times. A zero rest
    /// drops the rest segments entirely.
    IntervalWorkRest {
        work_secs: u32,
        rest_secs: u32,
        total_rounds: u32,
    },
    /// Same alternation as interval work/rest, fixed-intensity naming.
    Tabata {
        work_secs: u32,
        rest_secs: u32,
        rounds: u32,
    },
    /// Single work segment up to an optional cap; the user ends early.
    ForTime { time_cap_secs: Option<u32> },
    /// Ordered exercise list completed once each, rep-paced.
    Chipper {
        exercises: Vec<ChipperExercise>,
        time_cap_secs: Option<u32>,
    },
    /// Rounds with varying rep targets, optional rest between rounds.
    Ladder {
        pattern: Vec<u32>,
        #[serde(default)]
        rest_between_rounds_secs: Option<u32>,
        #[serde(default)]
        direction: LadderDirection,
    },
    /// Escalating reps per minute until failure or a cap.
    DeathBy {
        exercise_name: String,
        starting_reps: u32,
        increment_per_minute: u32,
        #[serde(default)]
        max_minutes: Option<u32>,
    },
    /// Composite: multiple independent timer blocks in one session.
    Stacked { blocks: Vec<TimerBlock> },
}

impl TimerSpec {
    /// Short kind name for display and storage.
    pub fn kind_name(&self) -> &'static str {
        match self {
            TimerSpec::Emom { .. } => "emom",
            TimerSpec::Amrap { .. } => "amrap",
            TimerSpec::IntervalWorkRest { .. } => "interval_work_rest",
            TimerSpec::Tabata { .. } => "tabata",
            TimerSpec::ForTime { .. } => "for_time",
            TimerSpec::Chipper { .. } => "chipper",
            TimerSpec::Ladder { .. } => "ladder",
            TimerSpec::DeathBy { .. } => "death_by",
            TimerSpec::Stacked { .. } => "stacked",
        }
    }

    /// Boundary validation. A spec that passes expands to at least one
    /// segment and never panics the builder.
    pub fn validate(&self) -> Result<(), ValidationError> {
        fn positive(field: &str, value: u32) -> Result<(), ValidationError> {
            if value == 0 {
                return Err(ValidationError::InvalidValue {
                    field: field.to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
            Ok(())
        }

        match self {
            TimerSpec::Emom {
                interval_secs,
                total_minutes,
            } => {
                positive("interval_secs", *interval_secs)?;
                positive("total_minutes", *total_minutes)
            }
            TimerSpec::Amrap { duration_secs } => positive("duration_secs", *duration_secs),
            TimerSpec::IntervalWorkRest {
                work_secs,
                total_rounds,
                ..
            } => {
                positive("work_secs", *work_secs)?;
                positive("total_rounds", *total_rounds)
            }
            TimerSpec::Tabata {
                work_secs, rounds, ..
            } => {
                positive("work_secs", *work_secs)?;
                positive("rounds", *rounds)
            }
            TimerSpec::ForTime { time_cap_secs } => {
                if let Some(cap) = time_cap_secs {
                    positive("time_cap_secs", *cap)?;
                }
                Ok(())
            }
            TimerSpec::Chipper {
                exercises,
                time_cap_secs,
            } => {
                if exercises.is_empty() {
                    return Err(ValidationError::EmptyCollection(
                        "chipper exercises".to_string(),
                    ));
                }
                if let Some(cap) = time_cap_secs {
                    positive("time_cap_secs", *cap)?;
                    // The cap is split evenly across exercises; each share
                    // must be at least one second.
                    if (*cap as usize) < exercises.len() {
                        return Err(ValidationError::InvalidValue {
                            field: "time_cap_secs".to_string(),
                            message: "must allow at least one second per exercise".to_string(),
                        });
                    }
                }
                Ok(())
            }
            TimerSpec::Ladder { pattern, .. } => {
                if pattern.is_empty() {
                    return Err(ValidationError::EmptyCollection("ladder pattern".to_string()));
                }
                if pattern.contains(&0) {
                    return Err(ValidationError::InvalidValue {
                        field: "pattern".to_string(),
                        message: "rep counts must be greater than zero".to_string(),
                    });
                }
                Ok(())
            }
            TimerSpec::DeathBy {
                starting_reps,
                max_minutes,
                ..
            } => {
                positive("starting_reps", *starting_reps)?;
                if let Some(max) = max_minutes {
                    positive("max_minutes", *max)?;
                }
                Ok(())
            }
            TimerSpec::Stacked { blocks } => {
                if blocks.is_empty() {
                    return Err(ValidationError::EmptyCollection("stacked blocks".to_string()));
                }
                for block in blocks {
                    block.params.validate()?;
                }
                Ok(())
            }
        }
    }

    /// Total round count for display, kind-dependent.
    ///
    /// Kinds without an intrinsic round structure fall back to their
    /// segment count.
    pub fn total_rounds(&self) -> u32 {
        match self {
            TimerSpec::Emom { total_minutes, .. } => *total_minutes,
            TimerSpec::Amrap { .. } | TimerSpec::ForTime { .. } => 1,
            TimerSpec::IntervalWorkRest { total_rounds, .. } => *total_rounds,
            TimerSpec::Tabata { rounds, .. } => *rounds,
            TimerSpec::Chipper { exercises, .. } => exercises.len() as u32,
            TimerSpec::Ladder { pattern, .. } => pattern.len() as u32,
            TimerSpec::DeathBy { max_minutes, .. } => {
                max_minutes.unwrap_or(DEFAULT_DEATH_BY_MAX_MINUTES)
            }
            TimerSpec::Stacked { blocks } => blocks.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ladder_pattern_rejected() {
        let spec = TimerSpec::Ladder {
            pattern: vec![],
            rest_between_rounds_secs: None,
            direction: LadderDirection::Descending,
        };
        assert!(matches!(
            spec.validate(),
            Err(ValidationError::EmptyCollection(_))
        ));
    }

    #[test]
    fn chipper_cap_below_exercise_count_rejected() {
        let exercises = vec![
            ChipperExercise {
                name: "Wall Balls".into(),
                target_reps: 50,
            },
            ChipperExercise {
                name: "Box Jumps".into(),
                target_reps: 40,
            },
            ChipperExercise {
                name: "Burpees".into(),
                target_reps: 30,
            },
        ];
        // A 2-second cap over 3 exercises would build zero-duration
        // segments and finish the session on its first tick.
        let spec = TimerSpec::Chipper {
            exercises: exercises.clone(),
            time_cap_secs: Some(2),
        };
        assert!(matches!(
            spec.validate(),
            Err(ValidationError::InvalidValue { .. })
        ));

        let spec = TimerSpec::Chipper {
            exercises,
            time_cap_secs: Some(3),
        };
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn stacked_validates_blocks_recursively() {
        let spec = TimerSpec::Stacked {
            blocks: vec![TimerBlock {
                id: "b1".into(),
                label: "Block 1".into(),
                params: TimerSpec::Amrap { duration_secs: 0 },
                rest_after_secs: None,
            }],
        };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn zero_block_stacked_rejected() {
        let spec = TimerSpec::Stacked { blocks: vec![] };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn well_formed_specs_pass() {
        let specs = [
            TimerSpec::Emom {
                interval_secs: 60,
                total_minutes: 10,
            },
            TimerSpec::Tabata {
                work_secs: 20,
                rest_secs: 10,
                rounds: 8,
            },
            TimerSpec::ForTime { time_cap_secs: None },
            TimerSpec::DeathBy {
                exercise_name: "Burpees".into(),
                starting_reps: 1,
                increment_per_minute: 1,
                max_minutes: None,
            },
        ];
        for spec in &specs {
            assert!(spec.validate().is_ok(), "{:?}", spec);
        }
    }

    #[test]
    fn round_counts_per_kind() {
        assert_eq!(
            TimerSpec::Emom {
                interval_secs: 60,
                total_minutes: 12
            }
            .total_rounds(),
            12
        );
        assert_eq!(
            TimerSpec::Ladder {
                pattern: vec![21, 15, 9],
                rest_between_rounds_secs: None,
                direction: LadderDirection::Descending,
            }
            .total_rounds(),
            3
        );
        assert_eq!(
            TimerSpec::DeathBy {
                exercise_name: "Thrusters".into(),
                starting_reps: 3,
                increment_per_minute: 3,
                max_minutes: None,
            }
            .total_rounds(),
            DEFAULT_DEATH_BY_MAX_MINUTES
        );
    }

    #[test]
    fn serde_round_trip_tagged_by_kind() {
        let spec = TimerSpec::IntervalWorkRest {
            work_secs: 40,
            rest_secs: 20,
            total_rounds: 5,
        };
        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains("\"kind\":\"interval_work_rest\""));
        let back: TimerSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }
}
