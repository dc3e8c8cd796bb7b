use crate::ArgumentKind;
use thiserror::Error;

/// Error types.
#[derive(Debug, Error)]
pub enum Error {
    #[cfg(test)]
    #[error(transparent)]
    FromHexError(#[from] hex::FromHexError),

    #[error("unknown command: {0:?}")]
    UnknownCommand(String),

    #[error("unknown {table} value: {value:?}")]
    UnknownEnumValue { table: &'static str, value: String },

    #[error("command {command:?} expects {expected} argument")]
    ArgumentShapeMismatch {
        command: &'static str,
        expected: ArgumentKind,
    },

    #[error("parameter out of valid range")]
    ParameterOutOfRange,

    #[error("invalid length")]
    InvalidLength,

    #[error("data parse error: {0}")]
    BinRwError(#[from] binrw::Error),
}
