use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpectatorError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {message}")]
    TomlError { message: String },

    #[error("Invalid writer type: {value}")]
    InvalidWriterType { value: String },

    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Malformed protocol line '{line}': {reason}")]
    ProtocolError { line: String, reason: String },

    #[error("Writer is closed")]
    WriterClosed,
}

impl SpectatorError {
    /// 給終端使用者看的簡短訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            SpectatorError::IoError(e) => format!("I/O failure: {}", e),
            SpectatorError::SerializationError(e) => format!("Could not encode output: {}", e),
            SpectatorError::TomlError { message } => {
                format!("The configuration file is not valid TOML: {}", message)
            }
            SpectatorError::InvalidWriterType { value } => {
                format!("'{}' is not a known output location", value)
            }
            SpectatorError::InvalidAddress { address, .. } => {
                format!("Cannot use '{}' as a SpectatorD address", address)
            }
            SpectatorError::ConfigError { message } => message.clone(),
            SpectatorError::InvalidConfigValueError { field, value, .. } => {
                format!("Setting '{}' has an invalid value '{}'", field, value)
            }
            SpectatorError::MissingConfigError { field } => {
                format!("Setting '{}' is required", field)
            }
            SpectatorError::ProtocolError { line, .. } => {
                format!("Received a line that is not a SpectatorD measurement: {}", line)
            }
            SpectatorError::WriterClosed => "The metrics writer has already been closed".to_string(),
        }
    }

    /// 依錯誤類型提供修復建議
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SpectatorError::IoError(_) => {
                "Check that SpectatorD is running and the socket path or port is reachable"
            }
            SpectatorError::SerializationError(_) => "Retry without --json",
            SpectatorError::TomlError { .. } => "Fix the TOML syntax of the configuration file",
            SpectatorError::InvalidWriterType { .. } => {
                "Use one of: memory, udp, unix, udp://host:port, unix:///path/to/socket"
            }
            SpectatorError::InvalidAddress { .. } => {
                "UDP locations look like udp://127.0.0.1:1234, Unix locations like unix:///run/spectatord/spectatord.unix"
            }
            SpectatorError::ConfigError { .. }
            | SpectatorError::InvalidConfigValueError { .. }
            | SpectatorError::MissingConfigError { .. } => {
                "Review the configuration file and the SPECTATOR_OUTPUT_LOCATION environment variable"
            }
            SpectatorError::ProtocolError { .. } => {
                "Lines must look like <type>:<name>[,key=value...]:<value>"
            }
            SpectatorError::WriterClosed => "Create a new Registry before recording more measurements",
        }
    }
}

pub type Result<T> = std::result::Result<T, SpectatorError>;
