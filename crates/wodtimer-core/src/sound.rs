//! Sound cue adapter: maps discrete session events to audio cues.
//!
//! Stateless mapping table. The core emits [`SoundCue`] values and never
//! depends on whether playback succeeds or is enabled; actually rendering
//! audio is the host's concern.

use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::timer::SegmentKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
}

/// Parameters of one tone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoundCue {
    pub frequency_hz: f32,
    pub duration_ms: u64,
    pub waveform: Waveform,
}

const fn cue(frequency_hz: f32, duration_ms: u64, waveform: Waveform) -> SoundCue {
    SoundCue {
        frequency_hz,
        duration_ms,
        waveform,
    }
}

const COUNTDOWN_TICK: SoundCue = cue(880.0, 150, Waveform::Square);
const WORK_START: SoundCue = cue(1320.0, 300, Waveform::Square);
const REST_START: SoundCue = cue(660.0, 300, Waveform::Sine);
const SEGMENT_END: SoundCue = cue(990.0, 200, Waveform::Triangle);
const WARNING_10S: SoundCue = cue(770.0, 150, Waveform::Sine);
const WARNING_5S: SoundCue = cue(880.0, 150, Waveform::Sine);
const BLOCK_COMPLETE: SoundCue = cue(1100.0, 400, Waveform::Triangle);
const WORKOUT_COMPLETE: SoundCue = cue(1760.0, 800, Waveform::Square);

/// The tone for an event, if that event has one.
pub fn cue_for_event(event: &Event) -> Option<SoundCue> {
    match event {
        Event::CountdownTick { .. } => Some(COUNTDOWN_TICK),
        Event::TimerStarted { .. } => None, // The first SegmentStarted cues.
        Event::SegmentStarted { segment, .. } => Some(match segment.kind {
            SegmentKind::Work => WORK_START,
            SegmentKind::Rest => REST_START,
        }),
        Event::SegmentEnded { .. } => Some(SEGMENT_END),
        Event::Warning { seconds_left, .. } => Some(if *seconds_left <= 5 {
            WARNING_5S
        } else {
            WARNING_10S
        }),
        Event::BlockCompleted { .. } => Some(BLOCK_COMPLETE),
        Event::WorkoutCompleted { .. } => Some(WORKOUT_COMPLETE),
        Event::TimerPaused { .. }
        | Event::TimerResumed { .. }
        | Event::TimerReset { .. }
        | Event::SegmentSkipped { .. }
        | Event::StateSnapshot { .. } => None,
    }
}
