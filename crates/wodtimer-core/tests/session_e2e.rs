//! End-to-end engine tests: build a spec, drive a session through its
//! lifecycle with explicit timestamps, and check the derived state and
//! emitted events against the timer's contract.

use proptest::prelude::*;

use wodtimer_core::{
    build_segments, Event, RuntimeState, RuntimeStatus, SessionStatus, TimerBlock, TimerSession,
    TimerSpec,
};

fn emom(interval_secs: u32, total_minutes: u32) -> TimerSpec {
    TimerSpec::Emom {
        interval_secs,
        total_minutes,
    }
}

#[test]
fn emom_full_scenario() {
    // EMOM(30 s x 4): 4 segments of 30 000 ms, total 120 000 ms.
    let segments = build_segments(&emom(30, 4));
    assert_eq!(segments.len(), 4);
    assert!(segments.iter().all(|s| s.duration_ms == 30_000));

    let mut session = TimerSession::new("workout-42", emom(30, 4), Some(0)).unwrap();
    session.start(0);

    // t=45 000: inside the second segment.
    session.tick(45_000);
    assert_eq!(session.runtime().current_segment_index(), 1);
    assert_eq!(session.runtime().segment_elapsed_ms(), 15_000);
    assert_eq!(session.runtime().total_elapsed_ms(), 45_000);

    // Pause 5 000 ms, then tick at t=100 000: effective 95 000, segment 3.
    session.pause(45_000);
    session.resume(50_000);
    session.tick(100_000);
    assert_eq!(session.runtime().current_segment_index(), 3);
    assert_eq!(session.runtime().segment_elapsed_ms(), 5_000);

    // Run out the clock (pause excluded: completes at 125 000).
    let events = session.tick(125_000);
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::WorkoutCompleted { .. })));
    assert_eq!(session.status(), SessionStatus::Completed);
    let results = session.results().unwrap();
    assert_eq!(results.total_elapsed_ms, 120_000);
    assert_eq!(results.total_rounds_completed, 4);
}

#[test]
fn stacked_session_runs_both_blocks() {
    let spec = TimerSpec::Stacked {
        blocks: vec![
            TimerBlock {
                id: "strength".into(),
                label: "Strength".into(),
                params: TimerSpec::Amrap { duration_secs: 300 },
                rest_after_secs: Some(60),
            },
            TimerBlock {
                id: "metcon".into(),
                label: "Metcon".into(),
                params: emom(60, 3),
                rest_after_secs: None,
            },
        ],
    };
    let segments = build_segments(&spec);
    // AMRAP + rest + 3 EMOM minutes.
    assert_eq!(segments.len(), 5);

    let mut session = TimerSession::new("workout-7", spec, Some(0)).unwrap();
    session.start(0);
    assert_eq!(session.total_rounds(), 2);

    let mut saw_block_completions = 0;
    let mut completed = false;
    let mut t = 0;
    while t <= 545_000 && !completed {
        t += 100;
        for event in session.tick(t) {
            match event {
                Event::BlockCompleted { .. } => saw_block_completions += 1,
                Event::WorkoutCompleted { results, .. } => {
                    completed = true;
                    assert_eq!(results.blocks_completed, Some(2));
                    assert_eq!(results.total_elapsed_ms, 540_000);
                }
                _ => {}
            }
        }
    }
    assert!(completed);
    assert_eq!(saw_block_completions, 2);
}

#[test]
fn suspended_session_revives_across_processes() {
    // The CLI persists the session as JSON between invocations; a revived
    // session must pick up exactly where wall-clock time says it is.
    let mut session = TimerSession::new("workout-9", emom(60, 10), Some(0)).unwrap();
    session.start(1_000_000);
    session.tick(1_030_000);

    let json = serde_json::to_string(&session).unwrap();
    let mut revived: TimerSession = serde_json::from_str(&json).unwrap();
    revived.tick(1_095_000);
    assert_eq!(revived.runtime().current_segment_index(), 1);
    assert_eq!(revived.runtime().total_elapsed_ms(), 95_000);
}

proptest! {
    /// Ticking once at T equals ticking at every intermediate cadence:
    /// the clock derives state from wall time, so dropped ticks are
    /// invisible.
    #[test]
    fn clock_self_corrects_under_dropped_ticks(
        target_ms in 0i64..=120_000,
        cadence_ms in 1i64..=7_000,
    ) {
        let segments = build_segments(&emom(30, 4));

        let mut coarse = RuntimeState::new(segments.clone());
        coarse.start(0);
        coarse.tick(target_ms);

        let mut fine = RuntimeState::new(segments);
        fine.start(0);
        let mut t = 0;
        while t < target_ms {
            t = (t + cadence_ms).min(target_ms);
            fine.tick(t);
        }
        if target_ms == 0 {
            fine.tick(0);
        }

        prop_assert_eq!(coarse.status(), fine.status());
        prop_assert_eq!(coarse.current_segment_index(), fine.current_segment_index());
        prop_assert_eq!(coarse.segment_elapsed_ms(), fine.segment_elapsed_ms());
        prop_assert_eq!(coarse.total_elapsed_ms(), fine.total_elapsed_ms());
    }

    /// Progress is always within [0, 100] whatever the tick pattern.
    #[test]
    fn progress_stays_in_bounds(ticks in proptest::collection::vec(0i64..=200_000, 1..20)) {
        let mut clock = RuntimeState::new(build_segments(&emom(30, 4)));
        clock.start(0);
        for t in ticks {
            clock.tick(t);
            let pct = clock.progress_pct();
            prop_assert!((0.0..=100.0).contains(&pct));
            if clock.status() == RuntimeStatus::Completed {
                prop_assert_eq!(pct, 100.0);
            }
        }
    }
}
