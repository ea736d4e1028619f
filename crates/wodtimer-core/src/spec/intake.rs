//! Boundary mapping for externally-sourced timer suggestions.
//!
//! The AI enhancement step upstream returns a loose, partially-populated
//! shape rather than a well-typed [`TimerSpec`]. Mapping and repair happen
//! here so the segment builder only ever sees validated specifications.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

use super::TimerSpec;

/// Loose timer shape produced by the AI workout-enhancement step.
///
/// All quantity fields are optional; unknown fields are ignored. Times are
/// in seconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimerSuggestion {
    #[serde(rename = "type")]
    pub timer_type: String,
    /// Total duration in seconds (AMRAP, FOR_TIME) or overall EMOM length.
    pub duration: Option<u32>,
    /// Interval length in seconds (EMOM).
    pub intervals: Option<u32>,
    pub work_time: Option<u32>,
    pub rest_time: Option<u32>,
    pub rounds: Option<u32>,
}

impl TimerSuggestion {
    /// Map this loose shape into a validated [`TimerSpec`].
    ///
    /// Missing quantities fall back to conventional defaults (60 s EMOM
    /// intervals, 20/10x8 Tabata). An unrecognized `type` is an error, as
    /// are the kinds a suggestion has no fields for (chipper, ladder,
    /// death-by, stacked).
    pub fn into_spec(self) -> Result<TimerSpec, ValidationError> {
        let spec = match self.timer_type.to_lowercase().as_str() {
            "emom" => TimerSpec::Emom {
                interval_secs: self.intervals.unwrap_or(60),
                total_minutes: self
                    .rounds
                    .or_else(|| self.duration.map(|d| d.div_ceil(60)))
                    .unwrap_or(10),
            },
            "amrap" => TimerSpec::Amrap {
                duration_secs: self.duration.unwrap_or(600),
            },
            "interval" | "interval_work_rest" => TimerSpec::IntervalWorkRest {
                work_secs: self.work_time.unwrap_or(60),
                rest_secs: self.rest_time.unwrap_or(0),
                total_rounds: self.rounds.unwrap_or(5),
            },
            "tabata" => TimerSpec::Tabata {
                work_secs: self.work_time.unwrap_or(20),
                rest_secs: self.rest_time.unwrap_or(10),
                rounds: self.rounds.unwrap_or(8),
            },
            "for_time" | "fortime" => TimerSpec::ForTime {
                time_cap_secs: self.duration,
            },
            // Real kinds the loose shape cannot carry: they need exercise
            // lists, rep patterns, or blocks the suggestion has no fields
            // for. Callers must supply a full specification instead.
            kind @ ("chipper" | "ladder" | "death_by" | "deathby" | "stacked") => {
                return Err(ValidationError::InvalidValue {
                    field: "type".to_string(),
                    message: format!(
                        "'{kind}' timers need a full specification, not a suggestion"
                    ),
                })
            }
            other => return Err(ValidationError::UnknownKind(other.to_string())),
        };
        spec.validate()?;
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_camel_case_json() {
        let json = r#"{"type": "tabata", "workTime": 30, "restTime": 15, "rounds": 6}"#;
        let suggestion: TimerSuggestion = serde_json::from_str(json).unwrap();
        let spec = suggestion.into_spec().unwrap();
        assert_eq!(
            spec,
            TimerSpec::Tabata {
                work_secs: 30,
                rest_secs: 15,
                rounds: 6,
            }
        );
    }

    #[test]
    fn emom_minutes_derived_from_duration() {
        let suggestion = TimerSuggestion {
            timer_type: "emom".into(),
            duration: Some(720),
            ..Default::default()
        };
        let spec = suggestion.into_spec().unwrap();
        assert_eq!(
            spec,
            TimerSpec::Emom {
                interval_secs: 60,
                total_minutes: 12,
            }
        );
    }

    #[test]
    fn sparse_suggestion_gets_defaults() {
        let suggestion = TimerSuggestion {
            timer_type: "tabata".into(),
            ..Default::default()
        };
        let spec = suggestion.into_spec().unwrap();
        assert_eq!(
            spec,
            TimerSpec::Tabata {
                work_secs: 20,
                rest_secs: 10,
                rounds: 8,
            }
        );
    }

    #[test]
    fn rep_paced_kinds_need_full_spec() {
        for kind in ["chipper", "ladder", "death_by", "stacked"] {
            let suggestion = TimerSuggestion {
                timer_type: kind.into(),
                ..Default::default()
            };
            let err = suggestion.into_spec().unwrap_err();
            assert!(
                matches!(&err, ValidationError::InvalidValue { .. }),
                "{kind}: {err}"
            );
            assert!(err.to_string().contains("full specification"));
        }
    }

    #[test]
    fn unknown_kind_rejected() {
        let suggestion = TimerSuggestion {
            timer_type: "yoga_flow".into(),
            ..Default::default()
        };
        assert!(matches!(
            suggestion.into_spec(),
            Err(ValidationError::UnknownKind(_))
        ));
    }
}
