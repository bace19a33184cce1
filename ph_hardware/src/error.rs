use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("spi error: {0}")]
    Spi(String),
    #[error("adc channel {0} out of range (0-7)")]
    Channel(u8),
}

pub type Result<T> = std::result::Result<T, HwError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_bus() {
        assert_eq!(HwError::Channel(9).to_string(), "adc channel 9 out of range (0-7)");
        assert_eq!(HwError::Spi("busy".into()).to_string(), "spi error: busy");
        assert_eq!(HwError::Gpio("pin 17".into()).to_string(), "gpio error: pin 17");
    }
}
