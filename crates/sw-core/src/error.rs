use derive_more::From;
use orion_error::{ErrorCode, StructError, UvsReason};

#[derive(Debug, Clone, PartialEq, thiserror::Error, From)]
pub enum CoreReason {
    #[error("invalid signal")]
    InvalidSignal,
    #[error("invalid analysis context")]
    InvalidContext,
    #[error("signal aggregation error")]
    Aggregation,
    #[error("glob pattern error")]
    GlobPattern,
    #[error("wave execution error")]
    WaveExecution,
    #[error("{0}")]
    Uvs(UvsReason),
}

impl ErrorCode for CoreReason {
    fn error_code(&self) -> i32 {
        match self {
            Self::InvalidSignal => 1001,
            Self::InvalidContext => 1002,
            Self::Aggregation => 1003,
            Self::GlobPattern => 1004,
            Self::WaveExecution => 1005,
            Self::Uvs(u) => u.error_code(),
        }
    }
}

pub type CoreError = StructError<CoreReason>;
pub type CoreResult<T> = Result<T, CoreError>;
