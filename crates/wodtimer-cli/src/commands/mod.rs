pub mod config;
pub mod run;
pub mod stats;
pub mod timer;

use wodtimer_core::storage::Database;
use wodtimer_core::{Event, TimerSession};

const SESSION_KEY: &str = "timer_session";

pub(crate) type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Parse a JSON command-line argument into a typed value, naming the
/// argument in the error instead of leaking a bare serde message.
pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(arg: &str, raw: &str) -> CliResult<T> {
    serde_json::from_str(raw).map_err(|e| format!("invalid --{arg} JSON: {e}").into())
}

/// Load the suspended session from the kv store, if there is one.
pub(crate) fn load_session(db: &Database) -> Option<TimerSession> {
    let json = db.kv_get(SESSION_KEY).ok().flatten()?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn save_session(db: &Database, session: &TimerSession) -> CliResult {
    let json = serde_json::to_string(session)?;
    db.kv_set(SESSION_KEY, &json)?;
    Ok(())
}

pub(crate) fn clear_session(db: &Database) -> CliResult {
    db.kv_delete(SESSION_KEY)?;
    Ok(())
}

/// Print events as JSON lines and persist any completion results.
pub(crate) fn handle_events(
    db: &Database,
    session: &TimerSession,
    events: &[Event],
) -> CliResult {
    for event in events {
        println!("{}", serde_json::to_string_pretty(event)?);
        if let Event::WorkoutCompleted { results, .. } = event {
            db.record_results(
                session.workout_id(),
                session.spec().kind_name(),
                results,
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wodtimer_core::TimerSpec;

    #[test]
    fn parse_json_typed_value() {
        let spec: TimerSpec =
            parse_json("spec", r#"{"kind": "amrap", "duration_secs": 600}"#).unwrap();
        assert_eq!(spec, TimerSpec::Amrap { duration_secs: 600 });
    }

    #[test]
    fn parse_json_names_the_argument() {
        let err = parse_json::<TimerSpec>("spec", "{not json").unwrap_err();
        assert!(err.to_string().starts_with("invalid --spec JSON"));
    }
}
