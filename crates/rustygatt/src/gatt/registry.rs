//! Event routing from the controller to characteristics
//!
//! The controller reports completions and value changes against raw
//! attribute handles. Characteristics register here once bound, so events
//! find their way back to the instance that issued the request. The
//! registry also owns the dispatch worker shared by all characteristics
//! for deferred callback execution.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use log::{debug, trace};

use super::characteristic::ClientCharacteristic;
use super::dispatch::CallbackExecutor;
use crate::controller::types::GattcEvent;

/// Routing table from value handle to characteristic.
pub struct CharacteristicRegistry {
    by_handle: RwLock<HashMap<u16, Arc<ClientCharacteristic>>>,
    executor: CallbackExecutor,
}

impl CharacteristicRegistry {
    pub fn new() -> Self {
        Self {
            by_handle: RwLock::new(HashMap::new()),
            executor: CallbackExecutor::new(),
        }
    }

    /// Register a characteristic for event routing, keyed by its value
    /// handle. Required before any acknowledgment or notification can
    /// reach it.
    pub fn register(&self, characteristic: Arc<ClientCharacteristic>) {
        debug!(
            "registering characteristic {} at handle 0x{:04x}",
            characteristic.uuid(),
            characteristic.value_handle()
        );
        self.by_handle
            .write()
            .unwrap()
            .insert(characteristic.value_handle(), characteristic);
    }

    /// Drop a characteristic from the routing table.
    pub fn unregister(&self, value_handle: u16) {
        self.by_handle.write().unwrap().remove(&value_handle);
    }

    /// Entry point for the controller's event-delivery context.
    ///
    /// Events whose handle is unknown are dropped; that includes
    /// execute-write acknowledgments, which the controller reports with a
    /// zero handle (the long-write engine does not wait for them).
    pub fn handle_event(&self, event: GattcEvent) {
        let handle = event.handle();
        let characteristic = { self.by_handle.read().unwrap().get(&handle).cloned() };
        match characteristic {
            Some(characteristic) => characteristic.handle_event(event, &self.executor),
            None => trace!("event for unknown handle 0x{:04x} dropped", handle),
        }
    }
}

impl Default for CharacteristicRegistry {
    fn default() -> Self {
        Self::new()
    }
}
