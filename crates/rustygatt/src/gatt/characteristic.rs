//! Client-side characteristic operations
//!
//! A [`ClientCharacteristic`] is the central role's view of one remote
//! attribute. Its operations look synchronous to the caller: a request is
//! issued toward the controller, the calling thread parks on the
//! characteristic's correlator slot, and the controller's event context
//! releases it when the matching acknowledgment arrives. Payloads larger
//! than one packet go through the prepare/execute long-write sequence,
//! driven chunk by chunk from the event context without waking the caller
//! in between.

use std::cmp;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use byteorder::{ByteOrder, LittleEndian};
use log::{debug, trace, warn};

use crate::controller::constants::{
    ATT_PAYLOAD_MPS, CCCD_DISABLE, CCCD_INDICATE, CCCD_NOTIFY, CCCD_UUID, EXEC_WRITE_COMMIT,
    GATT_GENERIC_TIMEOUT, MAX_DESCRIPTORS_PER_DISCOVERY, PREPARE_WRITE_OVERHEAD,
};
use crate::controller::types::{ConnHandle, EventStatus, GattcEvent, TransportError, ValueChangeKind, WriteOp, WriteParams};
use crate::controller::GattController;

use super::correlator::{LongWriteCursor, OpKind, OpSlot, OpState};
use super::dispatch::CallbackExecutor;
use super::error::{GattError, GattResult};
use super::service::ClientService;
use super::types::{CharacteristicProperties, Uuid};

/// User callback for inbound value changes.
pub type NotifyCallback = Arc<dyn Fn(ValueChangeKind, &[u8]) + Send + Sync>;

/// Largest chunk a single prepare-write request can carry.
const PREPARE_CHUNK: usize = ATT_PAYLOAD_MPS - PREPARE_WRITE_OVERHEAD;

struct Link {
    service: Arc<ClientService>,
    controller: Arc<dyn GattController>,
}

/// The central role's handle on one remote characteristic.
pub struct ClientCharacteristic {
    uuid: Uuid,
    props: RwLock<CharacteristicProperties>,
    value_handle: RwLock<u16>,
    /// Notification-configuration descriptor handle, 0 until resolved.
    cccd_handle: RwLock<u16>,
    link: RwLock<Option<Link>>,
    notify_cb: RwLock<Option<NotifyCallback>>,
    deferred_dispatch: AtomicBool,
    wait_timeout: RwLock<Duration>,
    slot: OpSlot,
}

impl std::fmt::Debug for ClientCharacteristic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCharacteristic")
            .field("uuid", &self.uuid)
            .field("value_handle", &self.value_handle())
            .field("cccd_handle", &self.cccd_handle())
            .field("properties", &self.properties())
            .field("has_notify_callback", &self.notify_cb.read().unwrap().is_some())
            .finish()
    }
}

impl ClientCharacteristic {
    /// Create an unbound characteristic identified by `uuid`.
    pub fn new(uuid: Uuid) -> Self {
        Self {
            uuid,
            props: RwLock::new(CharacteristicProperties::empty()),
            value_handle: RwLock::new(0),
            cccd_handle: RwLock::new(0),
            link: RwLock::new(None),
            notify_cb: RwLock::new(None),
            deferred_dispatch: AtomicBool::new(true),
            wait_timeout: RwLock::new(GATT_GENERIC_TIMEOUT),
            slot: OpSlot::default(),
        }
    }

    /// Copy in the discovered attribute: properties and value handle.
    pub fn assign(&self, props: CharacteristicProperties, value_handle: u16) {
        *self.props.write().unwrap() = props;
        *self.value_handle.write().unwrap() = value_handle;
    }

    /// Attach the parent service and the controller used for all requests.
    pub fn bind(&self, service: Arc<ClientService>, controller: Arc<dyn GattController>) {
        *self.link.write().unwrap() = Some(Link {
            service,
            controller,
        });
    }

    pub fn uuid(&self) -> &Uuid {
        &self.uuid
    }

    pub fn properties(&self) -> CharacteristicProperties {
        *self.props.read().unwrap()
    }

    pub fn value_handle(&self) -> u16 {
        *self.value_handle.read().unwrap()
    }

    /// Resolved notification-configuration descriptor handle, 0 if none.
    pub fn cccd_handle(&self) -> u16 {
        *self.cccd_handle.read().unwrap()
    }

    /// Parent service, if bound.
    pub fn parent_service(&self) -> Option<Arc<ClientService>> {
        self.link.read().unwrap().as_ref().map(|l| l.service.clone())
    }

    /// Replace the wait budget for acknowledged requests.
    pub fn set_wait_timeout(&self, timeout: Duration) {
        *self.wait_timeout.write().unwrap() = timeout;
    }

    fn wait_budget(&self) -> Duration {
        *self.wait_timeout.read().unwrap()
    }

    /// Connection handle and controller, or `NotConnected`.
    fn route(&self) -> GattResult<(ConnHandle, Arc<dyn GattController>)> {
        let link = self.link.read().unwrap();
        let link = link.as_ref().ok_or(GattError::NotConnected)?;
        let conn = link.service.conn_handle().ok_or(GattError::NotConnected)?;
        Ok((conn, link.controller.clone()))
    }

    /// Register the callback run for notifications and indications.
    ///
    /// At most one callback is held; a second registration replaces the
    /// first.
    pub fn set_notify_callback<F>(&self, callback: F)
    where
        F: Fn(ValueChangeKind, &[u8]) + Send + Sync + 'static,
    {
        *self.notify_cb.write().unwrap() = Some(Arc::new(callback));
    }

    /// Choose between deferred callback execution on the dispatch worker
    /// (the default) and in-place execution on the event context.
    ///
    /// In-place callbacks must not block and must not issue further
    /// blocking protocol calls.
    pub fn use_deferred_dispatch(&self, deferred: bool) {
        self.deferred_dispatch.store(deferred, Ordering::Relaxed);
    }

    /// Enumerate descriptors under the value handle and resolve the
    /// notification-configuration descriptor.
    ///
    /// Succeeds even when none is found; subscription operations report
    /// `DescriptorUnresolved` later in that case.
    pub fn discover_descriptors(&self) -> GattResult<()> {
        let (conn, ctrl) = self.route()?;
        let descriptors =
            ctrl.discover_descriptors(conn, self.value_handle(), MAX_DESCRIPTORS_PER_DISCOVERY)?;

        // only the CCCD matters here
        for desc in descriptors {
            if desc.uuid == Uuid::from_u16(CCCD_UUID) {
                debug!("found CCCD for {}: handle 0x{:04x}", self.uuid, desc.handle);
                *self.cccd_handle.write().unwrap() = desc.handle;
            }
        }

        Ok(())
    }

    /// Read the characteristic value into `buf`.
    ///
    /// Blocks until the read acknowledgment arrives, copies at most
    /// `buf.len()` bytes and returns the copied count. A payload larger
    /// than the buffer is truncated to the buffer's length.
    pub fn read(&self, buf: &mut [u8]) -> GattResult<usize> {
        if !self.properties().can_read() {
            return Err(GattError::CapabilityUnsupported);
        }
        let (conn, ctrl) = self.route()?;

        self.slot.begin(OpState::AwaitingRead)?;
        if let Err(e) = ctrl.read(conn, self.value_handle()) {
            self.slot.abort();
            return Err(e.into());
        }

        let value = self.slot.wait(self.wait_budget())?;
        if value.len() > buf.len() {
            warn!(
                "read of {} returned {} bytes, caller buffer holds {}",
                self.uuid,
                value.len(),
                buf.len()
            );
        }
        let n = cmp::min(value.len(), buf.len());
        buf[..n].copy_from_slice(&value[..n]);
        Ok(n)
    }

    /// Acknowledged write of `data`, atomic from the caller's view.
    ///
    /// Payloads up to one packet go out as a single write request; larger
    /// payloads use the prepare/execute sequence, with the wait budget
    /// scaled by the number of chunks. Returns the full length on success.
    pub fn write_with_response(&self, data: &[u8]) -> GattResult<usize> {
        if !self.properties().can_write() {
            return Err(GattError::CapabilityUnsupported);
        }
        let (conn, ctrl) = self.route()?;
        let handle = self.value_handle();

        if data.len() <= ATT_PAYLOAD_MPS {
            self.slot.begin(OpState::AwaitingWrite)?;
            let params = WriteParams {
                op: WriteOp::WriteRequest,
                flags: 0,
                handle,
                offset: 0,
                value: data.to_vec(),
            };
            if let Err(e) = ctrl.write(conn, &params) {
                self.slot.abort();
                return Err(e.into());
            }
            self.slot.wait(self.wait_budget())?;
            return Ok(data.len());
        }

        // Long write: first chunk now, the rest driven by acknowledgments
        // on the event context.
        self.slot.begin(OpState::AwaitingLongWrite(LongWriteCursor {
            tail: data.to_vec(),
            next_offset: 0,
        }))?;
        let first = cmp::min(data.len(), PREPARE_CHUNK);
        let params = WriteParams {
            op: WriteOp::PrepareWrite,
            flags: 0,
            handle,
            offset: 0,
            value: data[..first].to_vec(),
        };
        if let Err(e) = ctrl.write(conn, &params) {
            self.slot.abort();
            return Err(e.into());
        }

        let chunks = data.len().div_ceil(PREPARE_CHUNK) as u32;
        self.slot.wait(self.wait_budget() * (chunks + 1))?;
        Ok(data.len())
    }

    /// Stream `data` as unacknowledged write packets.
    ///
    /// Each packet consumes one transmit credit; when the pool runs dry the
    /// loop stops and the bytes queued so far are returned. A short count
    /// is backpressure, not an error — the caller retries the remainder.
    pub fn write_without_response(&self, data: &[u8]) -> GattResult<usize> {
        if !self.properties().can_write_without_response() {
            return Err(GattError::CapabilityUnsupported);
        }
        let (conn, ctrl) = self.route()?;
        let handle = self.value_handle();

        let mut sent = 0;
        while sent < data.len() {
            if !ctrl.acquire_transmit_credit(conn) {
                trace!(
                    "transmit credits exhausted on {}: {} of {} bytes queued",
                    self.uuid,
                    sent,
                    data.len()
                );
                break;
            }
            let n = cmp::min(ATT_PAYLOAD_MPS, data.len() - sent);
            let params = WriteParams {
                op: WriteOp::WriteCommand,
                flags: 0,
                handle,
                offset: 0,
                value: data[sent..sent + n].to_vec(),
            };
            if let Err(e) = ctrl.write(conn, &params) {
                warn!("write command on {} failed after {} bytes: {}", self.uuid, sent, e);
                break;
            }
            sent += n;
        }
        Ok(sent)
    }

    /// Subscribe to peer-pushed value updates.
    pub fn enable_notify(&self) -> GattResult<()> {
        if !self.properties().can_notify() {
            return Err(GattError::CapabilityUnsupported);
        }
        self.write_cccd(CCCD_NOTIFY)
    }

    pub fn disable_notify(&self) -> GattResult<()> {
        if !self.properties().can_notify() {
            return Err(GattError::CapabilityUnsupported);
        }
        self.write_cccd(CCCD_DISABLE)
    }

    /// Subscribe to acknowledged value updates.
    pub fn enable_indicate(&self) -> GattResult<()> {
        if !self.properties().can_indicate() {
            return Err(GattError::CapabilityUnsupported);
        }
        self.write_cccd(CCCD_INDICATE)
    }

    pub fn disable_indicate(&self) -> GattResult<()> {
        if !self.properties().can_indicate() {
            return Err(GattError::CapabilityUnsupported);
        }
        self.write_cccd(CCCD_DISABLE)
    }

    /// Write the 2-byte subscription bitmask to the resolved CCCD over the
    /// unacknowledged write path.
    fn write_cccd(&self, value: u16) -> GattResult<()> {
        let cccd = self.cccd_handle();
        if cccd == 0 {
            return Err(GattError::DescriptorUnresolved);
        }
        let (conn, ctrl) = self.route()?;

        if !ctrl.acquire_transmit_credit(conn) {
            return Err(GattError::TransportRejected(
                TransportError::NoTransmitBuffers,
            ));
        }

        let mut raw = [0u8; 2];
        LittleEndian::write_u16(&mut raw, value);
        let params = WriteParams {
            op: WriteOp::WriteCommand,
            flags: 0,
            handle: cccd,
            offset: 0,
            value: raw.to_vec(),
        };
        ctrl.write(conn, &params)?;
        debug!("CCCD of {} set to 0x{:04x}", self.uuid, value);
        Ok(())
    }

    /// Event-context entry point: advance in-flight sequences, release
    /// blocked callers, dispatch value changes.
    pub(crate) fn handle_event(&self, event: GattcEvent, executor: &CallbackExecutor) {
        match event {
            GattcEvent::ValueChanged { kind, value, .. } => {
                self.dispatch_value_change(kind, value, executor)
            }
            GattcEvent::WriteAck {
                op,
                offset,
                len,
                status,
                ..
            } => self.handle_write_ack(op, offset, len, status),
            GattcEvent::ReadAck { value, status, .. } => self.handle_read_ack(value, status),
        }
    }

    fn handle_read_ack(&self, value: Vec<u8>, status: EventStatus) {
        if self.slot.kind() != OpKind::Read {
            trace!("read ack on {} with no read in flight", self.uuid);
            return;
        }
        match status {
            EventStatus::Success => {
                trace!("read ack on {}: {}", self.uuid, hex::encode(&value));
                self.slot.complete(Ok(value));
            }
            EventStatus::Failure(code) => self.slot.complete(Err(GattError::PeerStatus(code))),
        }
    }

    fn handle_write_ack(&self, op: WriteOp, offset: u16, len: u16, status: EventStatus) {
        if let EventStatus::Failure(code) = status {
            self.slot.complete(Err(GattError::PeerStatus(code)));
            return;
        }
        match op {
            WriteOp::WriteRequest => {
                if self.slot.kind() != OpKind::Write {
                    trace!("write ack on {} with no write in flight", self.uuid);
                    return;
                }
                self.slot.complete(Ok(Vec::new()));
            }
            WriteOp::PrepareWrite => self.advance_long_write(offset, len),
            // Execute acknowledgments arrive without our handle and are not
            // normally routed here; the waiter was already released when
            // the execute request went out.
            WriteOp::ExecuteWrite => trace!("execute ack on {}", self.uuid),
            WriteOp::WriteCommand => trace!("unexpected ack for write command on {}", self.uuid),
        }
    }

    /// One step of the long-write sequence, driven by a prepare
    /// acknowledgment: queue the next chunk, or issue the execute and
    /// release the caller.
    fn advance_long_write(&self, offset: u16, len: u16) {
        enum Step {
            Prepare(WriteParams),
            Execute(WriteParams),
        }

        let handle = self.value_handle();
        let step = self.slot.with_long_write(|cursor| {
            let acked = cmp::min(len as usize, cursor.tail.len());
            cursor.tail.drain(..acked);
            cursor.next_offset = offset + len;
            let chunk = cmp::min(cursor.tail.len(), PREPARE_CHUNK);
            if chunk == 0 {
                Step::Execute(WriteParams {
                    op: WriteOp::ExecuteWrite,
                    flags: EXEC_WRITE_COMMIT,
                    handle,
                    offset: 0,
                    value: Vec::new(),
                })
            } else {
                Step::Prepare(WriteParams {
                    op: WriteOp::PrepareWrite,
                    flags: 0,
                    handle,
                    offset: cursor.next_offset,
                    value: cursor.tail[..chunk].to_vec(),
                })
            }
        });
        let Some(step) = step else {
            trace!("prepare ack on {} with no long write in flight", self.uuid);
            return;
        };

        let route = match self.route() {
            Ok(route) => route,
            Err(e) => {
                self.slot.complete(Err(e));
                return;
            }
        };
        let (conn, ctrl) = route;

        match step {
            Step::Prepare(params) => {
                trace!(
                    "long write on {} continues at offset {} ({} bytes)",
                    self.uuid,
                    params.offset,
                    params.value.len()
                );
                if ctrl.write(conn, &params).is_err() {
                    // give up; no rollback of already-prepared chunks
                    self.slot.complete(Err(GattError::SequenceAborted));
                }
            }
            Step::Execute(params) => {
                // The execute acknowledgment carries no attribute handle
                // and cannot be correlated back here, so the waiter is
                // released as soon as the request is on the wire.
                match ctrl.write(conn, &params) {
                    Ok(()) => self.slot.complete(Ok(Vec::new())),
                    Err(_) => self.slot.complete(Err(GattError::SequenceAborted)),
                }
            }
        }
    }

    fn dispatch_value_change(&self, kind: ValueChangeKind, value: Vec<u8>, executor: &CallbackExecutor) {
        let callback = self.notify_cb.read().unwrap().clone();
        let Some(callback) = callback else {
            trace!("value change on {} with no callback registered", self.uuid);
            return;
        };
        trace!(
            "value change on {} ({:?}): {}",
            self.uuid,
            kind,
            hex::encode(&value)
        );
        if self.deferred_dispatch.load(Ordering::Relaxed) {
            executor.submit(Box::new(move || callback(kind, &value)));
        } else {
            callback(kind, &value);
        }
    }
}
