use derive_more::From;
use orion_error::{ErrorCode, StructError, UvsReason};

#[derive(Debug, Clone, PartialEq, thiserror::Error, From)]
pub enum StoreReason {
    #[error("store open error")]
    Open,
    #[error("serialization error")]
    Serialize,
    #[error("durability error")]
    Durability,
    #[error("{0}")]
    Uvs(UvsReason),
}

impl ErrorCode for StoreReason {
    fn error_code(&self) -> i32 {
        match self {
            Self::Open => 4001,
            Self::Serialize => 4002,
            Self::Durability => 4003,
            Self::Uvs(u) => u.error_code(),
        }
    }
}

pub type StoreError = StructError<StoreReason>;
pub type StoreResult<T> = Result<T, StoreError>;
