use crate::utils::error::Result;
use std::fmt;

/// Transport for encoded protocol payloads.
pub trait Writer: Send + Sync {
    fn write(&self, payload: &str) -> Result<()>;
    fn close(&self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterType {
    Memory,
    Udp,
    Unix,
}

impl fmt::Display for WriterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WriterType::Memory => "memory",
            WriterType::Udp => "udp",
            WriterType::Unix => "unix",
        };
        f.write_str(name)
    }
}
