use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum RangerError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("invalid state: {0}")]
    State(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing analog sensor")]
    MissingSensor,
    #[error("missing level button")]
    MissingButton,
    #[error("missing actuators")]
    MissingActuators,
    #[error("missing operating range")]
    MissingRange,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
