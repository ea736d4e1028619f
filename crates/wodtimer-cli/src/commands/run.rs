//! Live foreground driver for the suspended session.
//!
//! The engine has no threads of its own; this command is the host clock
//! source. It drives the countdown on a 1-second interval and the runtime
//! clock on a 100 ms interval, printing events (and sound cues, when
//! enabled) as JSON lines until the session completes or pauses.

use std::time::Duration;

use tokio::time;
use wodtimer_core::storage::Database;
use wodtimer_core::{cue_for_event, Event, SessionStatus, TimerSession};

use super::{clear_session, handle_events, load_session, now_ms, save_session, CliResult};

const TICK_INTERVAL: Duration = Duration::from_millis(100);
const COUNTDOWN_INTERVAL: Duration = Duration::from_secs(1);

pub fn run() -> CliResult {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(drive())
}

async fn drive() -> CliResult {
    let db = Database::open()?;
    let Some(mut session) = load_session(&db) else {
        return Err("no active session; run `timer start` first".into());
    };

    if session.status() == SessionStatus::Idle {
        let events = session.start(now_ms());
        emit(&db, &session, &events)?;
    }

    loop {
        match session.status() {
            SessionStatus::Countdown => {
                time::sleep(COUNTDOWN_INTERVAL).await;
                let events = session.countdown_tick(now_ms());
                emit(&db, &session, &events)?;
            }
            SessionStatus::Running => {
                time::sleep(TICK_INTERVAL).await;
                let events = session.tick(now_ms());
                emit(&db, &session, &events)?;
            }
            // Paused sessions stay suspended for a later `timer resume`.
            SessionStatus::Paused | SessionStatus::Idle | SessionStatus::Completed => break,
        }
    }

    save_session(&db, &session)?;
    if session.results().is_some() {
        clear_session(&db)?;
    }
    Ok(())
}

/// Print events and, when sound is enabled, the cues they map to.
fn emit(db: &Database, session: &TimerSession, events: &[Event]) -> CliResult {
    handle_events(db, session, events)?;
    if session.sound_enabled() {
        for event in events {
            if let Some(cue) = cue_for_event(event) {
                println!("{}", serde_json::to_string(&cue)?);
            }
        }
    }
    Ok(())
}
