use crate::config::writer_config::{parse_udp_address, parse_unix_address, UDP_URL, UNIX_URL};
use crate::domain::model::{parse_payload, ProtocolLine};
use crate::utils::error::{Result, SpectatorError};
use tokio::net::UdpSocket;

const MAX_DATAGRAM: usize = 65_536;

enum Socket {
    Udp(UdpSocket),
    #[cfg(unix)]
    Unix(tokio::net::UnixDatagram, std::path::PathBuf),
}

/// 接收 SpectatorD 協議行的簡易接收端，用於本機除錯與整合測試
pub struct LineListener {
    socket: Socket,
    buf: Vec<u8>,
}

impl LineListener {
    /// Binds to `udp://host:port` (port 0 picks a free port) or `unix:///path`.
    /// A stale socket at the Unix path is removed first; any other kind of
    /// file there is an error.
    pub async fn bind(location: &str) -> Result<Self> {
        let socket = if location.starts_with(UDP_URL) {
            let (host, port) = parse_udp_address(location)?;
            let socket = UdpSocket::bind((host.as_str(), port)).await?;
            tracing::info!("Listening for protocol lines on udp://{}", socket.local_addr()?);
            Socket::Udp(socket)
        } else if location.starts_with(UNIX_URL) {
            Self::bind_unix(location)?
        } else {
            return Err(SpectatorError::InvalidAddress {
                address: location.to_string(),
                reason: "listener needs a udp:// or unix:// location".to_string(),
            });
        };

        Ok(Self {
            socket,
            buf: vec![0; MAX_DATAGRAM],
        })
    }

    #[cfg(unix)]
    fn bind_unix(location: &str) -> Result<Socket> {
        use std::os::unix::fs::FileTypeExt;

        let path = parse_unix_address(location)?;
        if let Ok(metadata) = std::fs::symlink_metadata(&path) {
            if !metadata.file_type().is_socket() {
                return Err(SpectatorError::InvalidAddress {
                    address: location.to_string(),
                    reason: "path exists and is not a socket".to_string(),
                });
            }
            tracing::debug!("Removing stale socket {}", path.display());
            std::fs::remove_file(&path)?;
        }
        let socket = tokio::net::UnixDatagram::bind(&path)?;
        tracing::info!("Listening for protocol lines on unix://{}", path.display());
        Ok(Socket::Unix(socket, path))
    }

    #[cfg(not(unix))]
    fn bind_unix(location: &str) -> Result<Socket> {
        Err(SpectatorError::InvalidAddress {
            address: location.to_string(),
            reason: "Unix domain sockets are not supported on this platform".to_string(),
        })
    }

    /// Location a writer should use to reach this listener.
    pub fn local_location(&self) -> Result<String> {
        match &self.socket {
            Socket::Udp(socket) => Ok(format!("{}{}", UDP_URL, socket.local_addr()?)),
            #[cfg(unix)]
            Socket::Unix(_, path) => Ok(format!("{}{}", UNIX_URL, path.display())),
        }
    }

    /// Raw text of the next datagram.
    pub async fn recv_payload(&mut self) -> Result<String> {
        let len = match &self.socket {
            Socket::Udp(socket) => socket.recv(&mut self.buf).await?,
            #[cfg(unix)]
            Socket::Unix(socket, _) => socket.recv(&mut self.buf).await?,
        };
        Ok(String::from_utf8_lossy(&self.buf[..len]).into_owned())
    }

    /// Lines of the next datagram; unparseable lines are logged and skipped.
    pub async fn recv(&mut self) -> Result<Vec<ProtocolLine>> {
        let payload = self.recv_payload().await?;
        let lines = parse_payload(&payload)
            .into_iter()
            .filter_map(|result| match result {
                Ok(line) => Some(line),
                Err(e) => {
                    tracing::warn!("Skipping line: {}", e);
                    None
                }
            })
            .collect();
        Ok(lines)
    }
}

impl Drop for LineListener {
    fn drop(&mut self) {
        #[cfg(unix)]
        if let Socket::Unix(_, path) = &self.socket {
            if let Err(e) = std::fs::remove_file(path) {
                tracing::debug!("Could not remove socket file {}: {}", path.display(), e);
            }
        }
    }
}
