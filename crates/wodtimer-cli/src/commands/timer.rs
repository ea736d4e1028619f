use clap::Subcommand;
use wodtimer_core::storage::Database;
use wodtimer_core::{Preferences, TimerSession, TimerSpec, TimerSuggestion};

use super::{
    clear_session, handle_events, load_session, now_ms, parse_json, save_session, CliResult,
};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a new session from a timer specification
    Start {
        /// Timer specification as JSON (tagged by "kind")
        #[arg(long, conflicts_with = "suggestion")]
        spec: Option<String>,
        /// Loose AI-suggestion JSON to map into a specification
        #[arg(long)]
        suggestion: Option<String>,
        /// Workout identifier for the results record
        #[arg(long, default_value = "adhoc")]
        workout_id: String,
        /// Countdown seconds, overriding the configured preference
        #[arg(long)]
        countdown: Option<u32>,
    },
    /// Pause the running session
    Pause,
    /// Resume a paused session
    Resume,
    /// Skip to the next segment
    Skip,
    /// Skip to a block of a stacked session
    SkipBlock {
        /// 0-based block index
        index: usize,
    },
    /// Mark the session complete early
    Complete {
        /// Notes to attach to the results
        #[arg(long)]
        notes: Option<String>,
    },
    /// Reset the session to idle
    Reset,
    /// Tick the clock and print the current state as JSON
    Status,
}

pub fn run(action: TimerAction) -> CliResult {
    let db = Database::open()?;

    if let TimerAction::Start {
        spec,
        suggestion,
        workout_id,
        countdown,
    } = action
    {
        return start(&db, spec, suggestion, workout_id, countdown);
    }

    let Some(mut session) = load_session(&db) else {
        return Err("no active session; run `timer start` first".into());
    };

    let events = match action {
        TimerAction::Start { .. } => unreachable!("handled above"),
        TimerAction::Pause => session.pause(now_ms()),
        TimerAction::Resume => session.resume(now_ms()),
        TimerAction::Skip => session.skip(now_ms()),
        TimerAction::SkipBlock { index } => session.skip_to_block(index, now_ms()),
        TimerAction::Complete { notes } => session.mark_complete(notes, now_ms()),
        TimerAction::Reset => session.reset(),
        TimerAction::Status => {
            let events = session.tick(now_ms());
            handle_events(&db, &session, &events)?;
            println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
            save_session(&db, &session)?;
            return clear_completed(&db, &session);
        }
    };

    handle_events(&db, &session, &events)?;
    save_session(&db, &session)?;
    clear_completed(&db, &session)
}

fn start(
    db: &Database,
    spec: Option<String>,
    suggestion: Option<String>,
    workout_id: String,
    countdown: Option<u32>,
) -> CliResult {
    let spec = match (spec, suggestion) {
        (Some(raw), _) => parse_json::<TimerSpec>("spec", &raw)?,
        (None, Some(raw)) => parse_json::<TimerSuggestion>("suggestion", &raw)?.into_spec()?,
        (None, None) => return Err("provide --spec or --suggestion".into()),
    };

    let prefs = Preferences::load()?;
    let countdown = countdown.unwrap_or(prefs.countdown_secs);
    let mut session = TimerSession::new(workout_id, spec, Some(countdown))?;
    session.set_sound_enabled(prefs.sound.enabled);

    let events = session.start(now_ms());
    handle_events(db, &session, &events)?;
    save_session(db, &session)?;
    clear_completed(db, &session)?;
    Ok(())
}

/// Drop the suspended session once its results have been recorded.
fn clear_completed(db: &Database, session: &TimerSession) -> CliResult {
    if session.results().is_some() {
        clear_session(db)?;
    }
    Ok(())
}
