//! RustyGatt - client-side GATT characteristic handling over an
//! asynchronous radio controller
//!
//! This library implements the central role's representation of remote
//! GATT characteristics. Application code gets synchronous-looking read,
//! write and subscribe operations; underneath, every outcome arrives as a
//! discrete event on the controller's own execution context and is
//! correlated back to the blocked caller. The controller itself is an
//! external collaborator behind the [`controller::GattController`] trait —
//! service and characteristic discovery and connection establishment are
//! assumed to have happened before this layer is used.

pub mod controller;
pub mod gatt;

// Re-export common types for convenience
pub use controller::{
    ConnHandle, DescriptorInfo, EventStatus, GattController, GattcEvent, TransportError,
    ValueChangeKind, WriteOp, WriteParams,
};
pub use gatt::{
    CharacteristicProperties, CharacteristicRegistry, ClientCharacteristic, ClientService,
    GattError, GattResult, NotifyCallback, Uuid,
};
