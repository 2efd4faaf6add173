// ABOUTME: Host port allocation for published container ports.
// ABOUTME: Asks the OS for an ephemeral port and reserves it in-process.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr};
use tokio::net::TcpListener;

/// Attempts before giving up when the OS keeps handing back reserved ports.
const MAX_ATTEMPTS: usize = 32;

/// Errors from port allocation.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("failed to probe for a free port: {0}")]
    Probe(#[from] std::io::Error),

    #[error("no unreserved port after {0} attempts")]
    Exhausted(usize),
}

/// Hands out host ports that no other deploy in this process holds.
///
/// The OS guarantees the port was free when probed; the reservation set
/// covers the window between probing and the engine binding it. Between
/// this process and unrelated programs that window remains.
///
/// A reservation lasts until `release`. The deploy pipeline releases when
/// the container fails to start, exits, is cleaned up, or its output stream
/// closes. A container whose output could not be attached keeps its port
/// reserved for the life of the process.
#[derive(Debug)]
pub struct PortAllocator {
    bind_ip: IpAddr,
    reserved: Mutex<HashSet<u16>>,
}

impl Default for PortAllocator {
    fn default() -> Self {
        Self::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
    }
}

impl PortAllocator {
    pub fn new(bind_ip: IpAddr) -> Self {
        Self {
            bind_ip,
            reserved: Mutex::new(HashSet::new()),
        }
    }

    /// Obtain and reserve a free port.
    pub async fn allocate(&self) -> Result<u16, PortError> {
        for _ in 0..MAX_ATTEMPTS {
            let port = {
                let listener = TcpListener::bind((self.bind_ip, 0)).await?;
                listener.local_addr()?.port()
            };

            if self.reserved.lock().insert(port) {
                tracing::debug!(port, "reserved host port");
                return Ok(port);
            }
        }

        Err(PortError::Exhausted(MAX_ATTEMPTS))
    }

    /// Give a port back, e.g. when the container that would use it never started.
    pub fn release(&self, port: u16) {
        if self.reserved.lock().remove(&port) {
            tracing::debug!(port, "released host port");
        }
    }

    pub fn is_reserved(&self, port: u16) -> bool {
        self.reserved.lock().contains(&port)
    }
}
