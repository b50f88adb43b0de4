use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Invalid beat divisions: {divisions} (must be at least 1)")]
    InvalidBeatDivisions { divisions: u32 },

    #[error("Invalid bpm: {bpm}")]
    InvalidBpm { bpm: f64 },

    #[error("Beat timing table has {found} entries, at least {required} required")]
    TooFewBeatTimings { found: usize, required: usize },

    #[error("Beat timing {index} is {found}, which does not follow previous timing {previous}")]
    NonMonotonicBeatTimings { index: usize, previous: f64, found: f64 },

    #[error("Beat timing {index} is not finite")]
    NonFiniteBeatTiming { index: usize },

    #[error("Event {index} has time {found}, which is before previous event time {previous}")]
    NonMonotonicEvents { index: usize, previous: f64, found: f64 },

    #[error("Event {index} has a non-finite time")]
    NonFiniteEventTime { index: usize },

    #[error("Event {index} falls on beat {beat}, outside the supported beat range")]
    EventBeatOutOfRange { index: usize, beat: f64 },

    #[error("Event {index} has negative score {score}")]
    NegativeScore { index: usize, score: i32 },

    #[error("Invalid solver config: {0}")]
    InvalidConfig(String),
}

impl SolverError {
    /// True when the timeline or beat map itself is malformed, as opposed to
    /// a bad solver configuration.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, SolverError::InvalidConfig(_))
    }
}

pub type Result<T> = std::result::Result<T, SolverError>;
