// Domain errors for the sample store and playback
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PowerError {
    #[error("requested {requested} samples but only {available} are available")]
    InsufficientData { requested: usize, available: usize },

    #[error("sample at {time_ms} is not after the last stored sample at {last_ms}")]
    OutOfOrderSample { time_ms: i64, last_ms: i64 },

    #[error("no more recorded samples to reveal")]
    PlaybackExhausted,

    #[error("voltage recording is empty")]
    EmptyDataset,

    #[error("recorded samples are not strictly ordered at index {index}")]
    UnorderedSeed { index: usize },
}
