use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("insufficient data: input series is empty")]
    InsufficientData,

    #[error("series has no candles")]
    EmptySeries,

    #[error("column '{0}' is already computed for this series")]
    DuplicateColumn(String),

    #[error("column '{name}' has {actual} values, series has {expected} candles")]
    ColumnLength {
        name: String,
        expected: usize,
        actual: usize,
    },
}

pub type EngineResult<T> = Result<T, EngineError>;
