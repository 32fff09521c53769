//! Error types for chakra-drive

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// chakra-drive error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Deadline-bounded operation expired
    #[error("Operation timed out")]
    Timeout,

    /// Invalid wire frame
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration parse error
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration write error
    #[error("Config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}
