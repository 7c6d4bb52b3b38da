//! Add-on options for the Rust+ bridge
//!
//! The Supervisor writes the user's add-on configuration to
//! `/data/options.json`. This crate reads it into [`AddonOptions`], filling
//! missing fields with defaults and falling back to a complete default set
//! when the file is absent or unreadable.
//!
//! # Example
//!
//! ```ignore
//! use rp_config::load_or_default;
//!
//! let options = load_or_default("/data/options.json");
//! println!("broker: {}", options.mqtt.broker_url());
//! ```

mod error;
mod options;

pub use error::{ConfigError, ConfigResult};
pub use options::{load_options, load_or_default, AddonOptions, MqttOptions, DEFAULT_OPTIONS_PATH};
