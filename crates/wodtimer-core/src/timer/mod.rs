mod clock;
mod segments;
mod session;

pub use clock::{RuntimeState, RuntimeStatus};
pub use segments::{
    build_segments, total_duration_ms, SegmentKind, TimedSegment,
    CHIPPER_DEFAULT_PER_EXERCISE_SECS, FOR_TIME_DEFAULT_CAP_SECS,
};
pub use session::{
    BlockRuntime, BlockStatus, SessionStatus, TimerSession, TimerSessionResults,
    DEFAULT_COUNTDOWN_SECS,
};
