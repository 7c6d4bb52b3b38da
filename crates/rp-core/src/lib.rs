//! Core types for the Rust+ MQTT bridge
//!
//! This crate provides the data model shared by every other crate in the
//! workspace: the paired [`Credentials`], the user-maintained [`DeviceLists`],
//! the last [`ConnectionOutcome`] and the [`PersistedState`] aggregate that is
//! written to disk. It also owns the tolerant import normalizer and the
//! identifier sanitizer used for bus topics.

mod credentials;
mod devices;
mod normalize;
mod object_id;
mod state;

pub use credentials::Credentials;
pub use devices::{DeviceEntry, DeviceKind, DeviceListError, DeviceLists};
pub use normalize::{normalize, normalize_slice, normalize_str, NormalizeError, NormalizeResult};
pub use object_id::sanitize_object_id;
pub use state::{ConnectionOutcome, PersistedState, OUTCOME_UNTESTED};
