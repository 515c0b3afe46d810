//! Controller-facing interface
//!
//! The radio controller is an external collaborator: it accepts outbound
//! protocol operations and later reports their outcomes as discrete events
//! on its own execution context. This module defines the operations this
//! crate issues toward it and the events it expects back.

pub mod constants;
pub mod types;

pub use types::{
    ConnHandle, DescriptorInfo, EventStatus, GattcEvent, TransportError, ValueChangeKind, WriteOp,
    WriteParams,
};

/// Operations consumed from the radio controller.
///
/// Implementations queue the request toward the link and return; the
/// outcome arrives later as a [`types::GattcEvent`] delivered to
/// [`crate::gatt::CharacteristicRegistry::handle_event`]. Descriptor
/// discovery is the exception and returns its results directly.
pub trait GattController: Send + Sync {
    /// Issue a read request for the attribute at `handle`.
    fn read(&self, conn: ConnHandle, handle: u16) -> Result<(), TransportError>;

    /// Issue the write variant described by `params`.
    fn write(&self, conn: ConnHandle, params: &WriteParams) -> Result<(), TransportError>;

    /// Enumerate up to `max_count` descriptors under `value_handle`.
    fn discover_descriptors(
        &self,
        conn: ConnHandle,
        value_handle: u16,
        max_count: usize,
    ) -> Result<Vec<DescriptorInfo>, TransportError>;

    /// Take one transmit credit from the connection's pool.
    ///
    /// Returns `false` when the pool is exhausted. Credits are replenished
    /// by the controller, never by this crate.
    fn acquire_transmit_credit(&self, conn: ConnHandle) -> bool;
}
