use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid value for {arg}: {value}")]
    InvalidValue { arg: String, value: String },

    #[error("All analyses are disabled; enable at least one of slope, land cover or HAND")]
    NothingToAnalyze,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Library(#[from] landsuit::Error),
}
