//! # Wodtimer Core Library
//!
//! Core engine for the wodtimer workout timer: a pure, deterministic model
//! that expands declarative timer specifications (EMOM, AMRAP, Tabata,
//! intervals, chipper, ladder, death-by, and stacked composites) into a
//! flat segment sequence, then drives a pause/resume/skip-aware clock over
//! that sequence with drift-correct elapsed-time computation.
//!
//! ## Architecture
//!
//! - **Segment Builder**: pure `TimerSpec` -> segment sequence expansion
//! - **Runtime Clock**: a wall-clock-derived state machine that requires
//!   the caller to periodically invoke `tick()` with explicit timestamps
//! - **Session Orchestrator**: a thin stateful shell over the clock that
//!   emits discrete events (segment changes, warnings, completion)
//! - **Storage**: SQLite result persistence and TOML-based preferences
//!
//! ## Key Components
//!
//! - [`TimerSpec`]: declarative timer specification
//! - [`TimerSession`]: session orchestrator and control surface
//! - [`RuntimeState`]: the pure runtime clock
//! - [`Event`]: discrete event stream for UI, sound, and persistence

pub mod error;
pub mod events;
pub mod sound;
pub mod spec;
pub mod storage;
pub mod timer;
pub mod workout;

pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use sound::{cue_for_event, SoundCue, Waveform};
pub use spec::{ChipperExercise, LadderDirection, TimerBlock, TimerSpec, TimerSuggestion};
pub use storage::{Database, Preferences, ResultRecord, Stats};
pub use timer::{
    build_segments, BlockRuntime, BlockStatus, RuntimeState, RuntimeStatus, SegmentKind,
    SessionStatus, TimedSegment, TimerSession, TimerSessionResults,
};
pub use workout::{exercise_for_segment, WorkoutExercise};
