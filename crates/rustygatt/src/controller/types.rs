//! Type definitions for the controller interface

use crate::gatt::types::Uuid;
use thiserror::Error;

/// Link-layer connection handle.
pub type ConnHandle = u16;

/// Write operation kinds accepted by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    /// Acknowledged write of a single packet.
    WriteRequest,
    /// Unacknowledged write, gated by transmit credits.
    WriteCommand,
    /// Queue one chunk of a long write at an explicit offset.
    PrepareWrite,
    /// Commit (or cancel) all queued chunks.
    ExecuteWrite,
}

/// Parameters for a controller write operation.
#[derive(Debug, Clone)]
pub struct WriteParams {
    pub op: WriteOp,
    pub flags: u8,
    pub handle: u16,
    pub offset: u16,
    pub value: Vec<u8>,
}

/// A descriptor found under a characteristic's value handle.
#[derive(Debug, Clone)]
pub struct DescriptorInfo {
    pub handle: u16,
    pub uuid: Uuid,
}

/// Completion status carried by controller events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Success,
    /// Attribute-protocol status code reported by the peer.
    Failure(u8),
}

impl EventStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, EventStatus::Success)
    }
}

/// Kind of an inbound value-change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueChangeKind {
    /// Fire-and-forget push from the peer.
    Notification,
    /// Acknowledged push; the confirmation is the controller's business.
    Indication,
}

/// Events delivered by the controller on its event context.
///
/// `handle` is the attribute handle the event refers to and is the routing
/// key; execute-write acknowledgments arrive with a zero handle and cannot
/// be routed (see the long-write engine).
#[derive(Debug, Clone)]
pub enum GattcEvent {
    ValueChanged {
        handle: u16,
        kind: ValueChangeKind,
        value: Vec<u8>,
    },
    WriteAck {
        op: WriteOp,
        handle: u16,
        offset: u16,
        len: u16,
        status: EventStatus,
    },
    ReadAck {
        handle: u16,
        value: Vec<u8>,
        status: EventStatus,
    },
}

impl GattcEvent {
    /// Attribute handle this event is routed by.
    pub fn handle(&self) -> u16 {
        match self {
            GattcEvent::ValueChanged { handle, .. } => *handle,
            GattcEvent::WriteAck { handle, .. } => *handle,
            GattcEvent::ReadAck { handle, .. } => *handle,
        }
    }
}

/// Errors surfaced by the controller when a request cannot be issued.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("no transmit buffers available")]
    NoTransmitBuffers,

    #[error("request rejected by the controller: {0}")]
    Rejected(String),

    #[error("link closed")]
    LinkClosed,
}
