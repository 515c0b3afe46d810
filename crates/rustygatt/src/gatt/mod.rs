//! Client-side GATT characteristic handling
//!
//! This module models the central role's view of remote characteristics:
//! blocking read/write/subscribe operations on the application thread,
//! correlated against completion events delivered by the controller on its
//! own execution context.

pub mod characteristic;
mod correlator;
mod dispatch;
pub mod error;
pub mod registry;
pub mod service;
pub mod types;


pub use characteristic::{ClientCharacteristic, NotifyCallback};
pub use error::{GattError, GattResult};
pub use registry::CharacteristicRegistry;
pub use service::ClientService;
pub use types::{CharacteristicProperties, Uuid};
