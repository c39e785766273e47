use crate::domain::ports::Writer;
use crate::utils::error::{Result, SpectatorError};
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::{Mutex, MutexGuard};

pub struct UdpWriter {
    target: SocketAddr,
    socket: Mutex<Option<UdpSocket>>,
}

impl UdpWriter {
    pub fn new(host: &str, port: u16) -> Result<Self> {
        let target = (host, port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| SpectatorError::InvalidAddress {
                address: format!("{}:{}", host, port),
                reason: "host did not resolve to any address".to_string(),
            })?;

        let local = if target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(local)?;
        tracing::debug!("UdpWriter ready to send to {}", target);

        Ok(Self {
            target,
            socket: Mutex::new(Some(socket)),
        })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    fn guard(&self) -> MutexGuard<'_, Option<UdpSocket>> {
        self.socket.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Writer for UdpWriter {
    fn write(&self, payload: &str) -> Result<()> {
        let guard = self.guard();
        let socket = guard.as_ref().ok_or(SpectatorError::WriterClosed)?;

        let sent = socket.send_to(payload.as_bytes(), self.target)?;
        if sent != payload.len() {
            tracing::warn!(
                "UdpWriter sent only {} bytes out of {} bytes",
                sent,
                payload.len()
            );
        }
        Ok(())
    }

    fn close(&self) -> Result<()> {
        if self.guard().take().is_some() {
            tracing::debug!("UdpWriter socket to {} closed", self.target);
        }
        Ok(())
    }
}
