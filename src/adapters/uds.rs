use crate::domain::ports::Writer;
use crate::utils::error::Result;
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Unix domain datagram writer. The socket is created lazily and recreated
/// after a failed send, so the agent may start after the application.
pub struct UdsWriter {
    path: PathBuf,
    socket: Mutex<Option<UnixDatagram>>,
}

impl UdsWriter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let writer = Self {
            path: path.as_ref().to_path_buf(),
            socket: Mutex::new(None),
        };
        if let Err(e) = writer.connect(&mut writer.guard()) {
            tracing::error!("UdsWriter failed to open socket for {}: {}", writer.path.display(), e);
        }
        writer
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> MutexGuard<'_, Option<UnixDatagram>> {
        self.socket.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn connect(&self, slot: &mut Option<UnixDatagram>) -> Result<()> {
        if slot.is_none() {
            *slot = Some(UnixDatagram::unbound()?);
            tracing::debug!("UdsWriter opened socket for {}", self.path.display());
        }
        Ok(())
    }
}

impl Writer for UdsWriter {
    fn write(&self, payload: &str) -> Result<()> {
        let mut guard = self.guard();
        self.connect(&mut guard)?;

        let Some(socket) = guard.as_ref() else {
            return Ok(());
        };
        match socket.send_to(payload.as_bytes(), &self.path) {
            Ok(sent) => {
                tracing::debug!("UdsWriter sent message ({} bytes)", sent);
                Ok(())
            }
            Err(e) => {
                // 下次寫入時重新建立 socket
                *guard = None;
                Err(e.into())
            }
        }
    }

    fn close(&self) -> Result<()> {
        self.guard().take();
        tracing::debug!("UdsWriter connection to {} closed", self.path.display());
        Ok(())
    }
}
