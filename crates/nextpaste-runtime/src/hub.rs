//! Registry of connected devices.
//!
//! Each connection gets a bounded send queue. Broadcasting never waits: a
//! full queue drops the frame for that client and logs a warning.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, PoisonError, RwLock};

use bytes::Bytes;
use chrono::Local;
use nextpaste_core::{ClientInfo, LogSinkPort};
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

/// Frames buffered per client before broadcasts start dropping.
pub const SEND_QUEUE_CAPACITY: usize = 256;

struct ClientSlot {
    info: ClientInfo,
    addr: SocketAddr,
    tx: mpsc::Sender<Bytes>,
}

/// Connected clients keyed by connection id.
pub struct ClientHub {
    clients: RwLock<HashMap<String, ClientSlot>>,
    log: Arc<dyn LogSinkPort>,
}

impl ClientHub {
    pub fn new(log: Arc<dyn LogSinkPort>) -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
            log,
        }
    }

    /// Register a new connection; returns its id and the receiving end of
    /// its send queue.
    pub fn register(&self, addr: SocketAddr) -> (ClientInfo, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(SEND_QUEUE_CAPACITY);
        let info = ClientInfo::connected(Uuid::new_v4().to_string(), Local::now());
        self.write().insert(
            info.id.clone(),
            ClientSlot {
                info: info.clone(),
                addr,
                tx,
            },
        );
        (info, rx)
    }

    /// Record the device name and platform from a handshake.
    pub fn update_device(&self, id: &str, device_name: &str, platform: &str) -> Option<ClientInfo> {
        let mut clients = self.write();
        let slot = clients.get_mut(id)?;
        slot.info.device_name = device_name.to_string();
        slot.info.platform = platform.to_string();
        Some(slot.info.clone())
    }

    /// Queue `frames` for every client except `exclude`.
    ///
    /// Returns the number of clients the frames were queued for.
    pub fn broadcast(&self, frames: &[Bytes], exclude: Option<&str>) -> usize {
        let clients = self.read();
        let mut reached = 0;
        for (id, slot) in clients.iter() {
            if exclude == Some(id.as_str()) {
                continue;
            }
            let mut delivered = true;
            for frame in frames {
                match slot.tx.try_send(frame.clone()) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        delivered = false;
                        self.log.warning(format!("send queue full for client {id}, frame dropped"));
                    }
                    Err(TrySendError::Closed(_)) => {
                        delivered = false;
                        tracing::debug!(client = %id, "send queue closed");
                        break;
                    }
                }
            }
            if delivered {
                reached += 1;
            }
        }
        reached
    }

    /// Remove a client. Logs the disconnect if it was still registered.
    pub fn remove(&self, id: &str) -> Option<ClientInfo> {
        let slot = self.write().remove(id)?;
        self.log.info(format!(
            "client disconnected: {}",
            slot.info.display_name()
        ));
        tracing::debug!(client = %id, addr = %slot.addr, "client removed");
        Some(slot.info)
    }

    pub fn count(&self) -> usize {
        self.read().len()
    }

    pub fn get(&self, id: &str) -> Option<ClientInfo> {
        self.read().get(id).map(|slot| slot.info.clone())
    }

    /// Snapshot of all clients, oldest connection first.
    pub fn clients(&self) -> Vec<ClientInfo> {
        let mut clients: Vec<ClientInfo> =
            self.read().values().map(|slot| slot.info.clone()).collect();
        clients.sort_by(|a, b| a.connected_at.cmp(&b.connected_at).then(a.id.cmp(&b.id)));
        clients
    }

    /// Drop every client. Their send queues close, which ends their write
    /// loops.
    pub fn close_all(&self) -> usize {
        let mut clients = self.write();
        let n = clients.len();
        clients.clear();
        n
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, ClientSlot>> {
        self.clients.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, ClientSlot>> {
        self.clients.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ClientHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientHub")
            .field("clients", &self.count())
            .finish_non_exhaustive()
    }
}
