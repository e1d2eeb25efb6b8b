//! # Tunable value store
//!
//! Values such as roller voltages are tuned on the robot without recompiling. Each value has a
//! compiled default which is used until the operator publishes an override into the store.
//!
//! Readers must go back to the store every time they need a value, the store may have been edited
//! since the last read.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use std::cell::RefCell;
use std::collections::BTreeMap;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A runtime-editable key/value surface.
///
/// Methods take `&self` since the store is shared between every subsystem on the control thread.
pub trait TunableStore {
    /// Get the value stored under `key`, or `default` if there is no such value.
    fn get_number(&self, key: &str, default: f64) -> f64;

    /// Publish a value under `key`, replacing any previous value.
    fn put_number(&self, key: &str, value: f64);
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// In-memory tunable store, used by the desktop executable and by tests.
#[derive(Debug, Default)]
pub struct MemTunableStore {
    values: RefCell<BTreeMap<String, f64>>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MemTunableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every value currently in the store, sorted by key.
    pub fn snapshot(&self) -> BTreeMap<String, f64> {
        self.values.borrow().clone()
    }
}

impl TunableStore for MemTunableStore {
    fn get_number(&self, key: &str, default: f64) -> f64 {
        self.values.borrow().get(key).copied().unwrap_or(default)
    }

    fn put_number(&self, key: &str, value: f64) {
        trace!("Tunable \"{}\" = {}", key, value);
        self.values.borrow_mut().insert(key.to_string(), value);
    }
}
