use crate::domain::ports::WriterType;
use crate::utils::error::{Result, SpectatorError};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const OUTPUT_LOCATION_ENV: &str = "SPECTATOR_OUTPUT_LOCATION";

pub const MEMORY: &str = "memory";
pub const UDP: &str = "udp";
pub const UNIX: &str = "unix";
pub const UDP_URL: &str = "udp://";
pub const UNIX_URL: &str = "unix://";

pub const NO_LOCATION: &str = "";
pub const DEFAULT_UDP_LOCATION: &str = "udp://127.0.0.1:1234";
pub const DEFAULT_UNIX_LOCATION: &str = "unix:///run/spectatord/spectatord.unix";

pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(5);
pub const MIN_FLUSH_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, PartialEq)]
pub struct WriterConfig {
    writer_type: WriterType,
    location: String,
    buffer_size: usize,
    flush_interval: Duration,
}

/// 將 `memory`、`udp`、`unix` 或 URL 形式的位置轉成寫入器類型與完整位置
pub fn resolve_location(value: &str) -> Result<(WriterType, String)> {
    match value {
        MEMORY => Ok((WriterType::Memory, NO_LOCATION.to_string())),
        UDP => Ok((WriterType::Udp, DEFAULT_UDP_LOCATION.to_string())),
        UNIX => Ok((WriterType::Unix, DEFAULT_UNIX_LOCATION.to_string())),
        v if v.starts_with(UDP_URL) => Ok((WriterType::Udp, v.to_string())),
        v if v.starts_with(UNIX_URL) => Ok((WriterType::Unix, v.to_string())),
        v => Err(SpectatorError::InvalidWriterType {
            value: v.to_string(),
        }),
    }
}

impl WriterConfig {
    /// `SPECTATOR_OUTPUT_LOCATION`, when set, replaces `location`.
    pub fn new(location: &str) -> Result<Self> {
        let from_env = std::env::var(OUTPUT_LOCATION_ENV).ok();
        Self::resolve(location, from_env.as_deref())
    }

    pub fn with_buffer_size(location: &str, buffer_size: usize) -> Result<Self> {
        Ok(Self::new(location)?.buffered(buffer_size))
    }

    pub(crate) fn buffered(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        tracing::info!("WriterConfig buffering enabled with size: {}", buffer_size);
        self
    }

    pub(crate) fn resolve(location: &str, env_override: Option<&str>) -> Result<Self> {
        let effective = match env_override {
            Some(value) => {
                tracing::info!("Environment variable set, {}: {}", OUTPUT_LOCATION_ENV, value);
                value
            }
            None => location,
        };

        let (writer_type, location) = resolve_location(effective)?;
        tracing::info!(
            "WriterConfig initialized with type: {}, location: {}",
            writer_type,
            location
        );

        Ok(Self {
            writer_type,
            location,
            buffer_size: 0,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        })
    }

    /// Intervals below `MIN_FLUSH_INTERVAL` are raised to it.
    pub fn with_flush_interval(mut self, flush_interval: Duration) -> Self {
        if flush_interval < MIN_FLUSH_INTERVAL {
            tracing::warn!(
                "Flush interval {:?} too small, using {:?}",
                flush_interval,
                MIN_FLUSH_INTERVAL
            );
        }
        self.flush_interval = flush_interval.max(MIN_FLUSH_INTERVAL);
        self
    }

    pub fn writer_type(&self) -> WriterType {
        self.writer_type
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn is_buffering_enabled(&self) -> bool {
        self.buffer_size > 0
    }

    pub fn flush_interval(&self) -> Duration {
        self.flush_interval
    }
}

fn invalid_address(address: &str, reason: impl Into<String>) -> SpectatorError {
    SpectatorError::InvalidAddress {
        address: address.to_string(),
        reason: reason.into(),
    }
}

/// `udp://host:port` -> (host, port)
pub fn parse_udp_address(location: &str) -> Result<(String, u16)> {
    if !location.starts_with(UDP_URL) {
        return Err(invalid_address(location, "expected a udp:// location"));
    }
    let url = Url::parse(location).map_err(|e| invalid_address(location, e.to_string()))?;

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| invalid_address(location, "missing host"))?;
    let port = url
        .port()
        .ok_or_else(|| invalid_address(location, "missing port"))?;

    // Url keeps IPv6 hosts bracketed
    let host = host.trim_start_matches('[').trim_end_matches(']');
    Ok((host.to_string(), port))
}

/// `unix:///path/to/socket` -> `/path/to/socket`
pub fn parse_unix_address(location: &str) -> Result<PathBuf> {
    let path = location
        .strip_prefix(UNIX_URL)
        .ok_or_else(|| invalid_address(location, "expected a unix:// location"))?;
    if path.is_empty() {
        return Err(invalid_address(location, "missing socket path"));
    }
    Ok(PathBuf::from(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_writer_types() {
        let memory = WriterConfig::resolve(MEMORY, None).unwrap();
        assert_eq!(memory.writer_type(), WriterType::Memory);
        assert_eq!(memory.location(), NO_LOCATION);

        let udp = WriterConfig::resolve(UDP, None).unwrap();
        assert_eq!(udp.writer_type(), WriterType::Udp);
        assert_eq!(udp.location(), DEFAULT_UDP_LOCATION);

        let unix = WriterConfig::resolve(UNIX, None).unwrap();
        assert_eq!(unix.writer_type(), WriterType::Unix);
        assert_eq!(unix.location(), DEFAULT_UNIX_LOCATION);
        assert!(!unix.is_buffering_enabled());
    }

    #[test]
    fn test_url_based_writer_types() {
        let udp = WriterConfig::resolve("udp://192.168.1.100:8125", None).unwrap();
        assert_eq!(udp.writer_type(), WriterType::Udp);
        assert_eq!(udp.location(), "udp://192.168.1.100:8125");

        let unix = WriterConfig::resolve("unix:///var/run/custom/socket.sock", None).unwrap();
        assert_eq!(unix.writer_type(), WriterType::Unix);
        assert_eq!(unix.location(), "unix:///var/run/custom/socket.sock");

        // 只有 scheme 也接受，位址在建立 Registry 時才檢查
        let bare = WriterConfig::resolve("udp://", None).unwrap();
        assert_eq!(bare.location(), "udp://");
    }

    #[test]
    fn test_environment_override() {
        let config = WriterConfig::resolve(UDP, Some(MEMORY)).unwrap();
        assert_eq!(config.writer_type(), WriterType::Memory);
        assert_eq!(config.location(), NO_LOCATION);
    }

    #[test]
    fn test_invalid_writer_type() {
        assert!(matches!(
            WriterConfig::resolve("invalid_type", None),
            Err(SpectatorError::InvalidWriterType { .. })
        ));
        assert!(WriterConfig::resolve("", None).is_err());

        // 錯誤訊息指出實際生效的值
        let err = WriterConfig::resolve("none", Some("invalid_env_value")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid writer type: invalid_env_value");
    }

    #[test]
    fn test_flush_interval_has_a_floor() {
        let config = WriterConfig::resolve(UDP, None).unwrap();
        assert_eq!(config.flush_interval(), DEFAULT_FLUSH_INTERVAL);

        let zero = config.clone().with_flush_interval(Duration::ZERO);
        assert_eq!(zero.flush_interval(), MIN_FLUSH_INTERVAL);

        let custom = config.with_flush_interval(Duration::from_millis(250));
        assert_eq!(custom.flush_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_parse_udp_address() {
        assert_eq!(
            parse_udp_address(DEFAULT_UDP_LOCATION).unwrap(),
            ("127.0.0.1".to_string(), 1234)
        );
        assert_eq!(
            parse_udp_address("udp://localhost:8125").unwrap(),
            ("localhost".to_string(), 8125)
        );
        assert_eq!(
            parse_udp_address("udp://[::1]:1234").unwrap(),
            ("::1".to_string(), 1234)
        );
        assert!(parse_udp_address("udp://").is_err());
        assert!(parse_udp_address("udp://127.0.0.1").is_err());
        assert!(parse_udp_address("udp://127.0.0.1:99999").is_err());
        assert!(parse_udp_address("unix:///tmp/x").is_err());
    }

    #[test]
    fn test_parse_unix_address() {
        assert_eq!(
            parse_unix_address(DEFAULT_UNIX_LOCATION).unwrap(),
            PathBuf::from("/run/spectatord/spectatord.unix")
        );
        assert!(parse_unix_address("unix://").is_err());
        assert!(parse_unix_address("udp://127.0.0.1:1234").is_err());
    }
}
