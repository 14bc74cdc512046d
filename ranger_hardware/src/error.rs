use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("spi error: {0}")]
    Spi(String),
    #[error("pwm error: {0}")]
    Pwm(String),
    #[error("adc returned short frame ({0} bytes)")]
    ShortFrame(usize),
    #[error("actuator not enabled")]
    NotEnabled,
}

pub type Result<T> = std::result::Result<T, HwError>;
