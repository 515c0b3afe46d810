//! Error handling for client-side GATT operations

use crate::controller::types::TransportError;
use thiserror::Error;

/// Errors returned by characteristic operations.
///
/// All of these stay local to the operation that produced them; a failing
/// characteristic never takes down others sharing the connection.
#[derive(Debug, Error)]
pub enum GattError {
    #[error("operation not supported by the characteristic's properties")]
    CapabilityUnsupported,

    #[error("no notification-configuration descriptor resolved")]
    DescriptorUnresolved,

    #[error("device not connected")]
    NotConnected,

    #[error("another operation is already in flight on this characteristic")]
    OperationInFlight,

    #[error("no acknowledgment within the wait budget")]
    Timeout,

    #[error("transport rejected the request: {0}")]
    TransportRejected(#[from] TransportError),

    #[error("long write aborted mid-sequence")]
    SequenceAborted,

    #[error("peer reported status 0x{0:02x}")]
    PeerStatus(u8),
}

/// Result type for GATT operations
pub type GattResult<T> = Result<T, GattError>;
