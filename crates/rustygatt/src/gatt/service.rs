//! Client-side service object
//!
//! The service owns the connection identity for everything discovered under
//! it. Characteristics never hold a connection handle themselves; they ask
//! their parent for it on every operation, so a disconnect observed here
//! makes all of them fail cleanly instead of touching a dead link.

use std::sync::RwLock;

use super::types::Uuid;
use crate::controller::types::ConnHandle;

/// The remote service a characteristic belongs to.
#[derive(Debug)]
pub struct ClientService {
    uuid: Uuid,
    conn: RwLock<Option<ConnHandle>>,
}

impl ClientService {
    pub fn new(uuid: Uuid) -> Self {
        Self {
            uuid,
            conn: RwLock::new(None),
        }
    }

    pub fn uuid(&self) -> &Uuid {
        &self.uuid
    }

    /// Bind the service to an open connection.
    pub fn attach(&self, conn: ConnHandle) {
        *self.conn.write().unwrap() = Some(conn);
    }

    /// Invalidate the connection on disconnect.
    pub fn detach(&self) {
        *self.conn.write().unwrap() = None;
    }

    /// Connection handle, if the link is up.
    pub fn conn_handle(&self) -> Option<ConnHandle> {
        *self.conn.read().unwrap()
    }

    pub fn is_connected(&self) -> bool {
        self.conn_handle().is_some()
    }
}
