//! Protocol constants for the controller interface

use std::time::Duration;

/// Largest attribute payload carried in a single link-layer packet.
pub const ATT_PAYLOAD_MPS: usize = 20;

/// Bytes of a prepare-write packet reserved for the offset framing.
pub const PREPARE_WRITE_OVERHEAD: usize = 2;

/// Execute-write flag committing all prepared chunks.
pub const EXEC_WRITE_COMMIT: u8 = 0x01;

/// Client Characteristic Configuration descriptor UUID.
pub const CCCD_UUID: u16 = 0x2902;

// CCCD bitmask values
pub const CCCD_DISABLE: u16 = 0x0000;
pub const CCCD_NOTIFY: u16 = 0x0001;
pub const CCCD_INDICATE: u16 = 0x0002;

/// Upper bound on descriptors returned by one discovery request.
pub const MAX_DESCRIPTORS_PER_DISCOVERY: usize = 8;

/// Default wait budget for a single acknowledged request.
pub const GATT_GENERIC_TIMEOUT: Duration = Duration::from_secs(5);
