// Adapters layer: concrete transports behind the Writer port, plus a receiving
// listener for local debugging.

pub mod listener;
pub mod memory;
pub mod udp;
#[cfg(unix)]
pub mod uds;
