use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum PhError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing probe")]
    MissingProbe,
    #[error("missing pumps")]
    MissingPumps,
    #[error("missing telemetry sink")]
    MissingSink,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
