//! # parley-settings
//!
//! Settings are resolved in two layers, lowest priority first:
//! 1. **Compiled defaults**: [`Settings::default()`]
//! 2. **Environment variables**: see [`apply_overrides`]
//!
//! The CLI may override a few fields after loading.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_overrides, is_valid_table_name, load_settings, parse_bool, parse_u16_range, parse_u64_range,
};
pub use types::*;
