//! Built-in platform descriptions.
//!
//! Each platform module exposes a `registry()` constructor; [`lookup`]
//! dispatches on the platform id.

pub mod analog_pocket;

use crate::error::RegistryError;
use crate::registry::SignalRegistry;

/// Ids of all built-in platforms.
pub const PLATFORMS: &[&str] = &[analog_pocket::ID];

/// Ids of all built-in platforms, in listing order.
pub fn platforms() -> &'static [&'static str] {
    PLATFORMS
}

/// Registers a built-in platform by id, or returns `None` if there is none.
///
/// Ids are matched case-insensitively and accept `-` for `_`.
pub fn lookup(platform_id: &str) -> Option<Result<SignalRegistry, RegistryError>> {
    match platform_id.to_ascii_lowercase().replace('-', "_").as_str() {
        analog_pocket::ID | "pocket" => Some(analog_pocket::registry()),
        _ => None,
    }
}
