use derive_more::From;
use orion_error::{ErrorCode, StructError, UvsReason};

#[derive(Debug, Clone, PartialEq, thiserror::Error, From)]
pub enum ConfigReason {
    #[error("config parse error")]
    Parse,
    #[error("config load error")]
    Load,
    #[error("config validation error")]
    Validate,
    #[error("{0}")]
    Uvs(UvsReason),
}

impl ErrorCode for ConfigReason {
    fn error_code(&self) -> i32 {
        match self {
            Self::Parse => 3001,
            Self::Load => 3002,
            Self::Validate => 3003,
            Self::Uvs(u) => u.error_code(),
        }
    }
}

pub type ConfigError = StructError<ConfigReason>;
pub type ConfigResult<T> = Result<T, ConfigError>;
