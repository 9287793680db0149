//! Platform connector descriptions for the tether toolchain.
//!
//! A platform's physical I/O surface is declared as a set of named
//! [`SignalGroup`]s, each either a scalar signal or a composite connector with
//! named sub-fields. Groups are registered once into a [`SignalRegistry`],
//! after which the registry only answers read-only [`request`](SignalRegistry::request)
//! lookups.
//!
//! # Usage
//!
//! ```
//! use tether_platform::SignalRegistry;
//!
//! let registry = SignalRegistry::register("analog_pocket").unwrap();
//! let cart = registry.request("cart").unwrap();
//! assert_eq!(cart.lane(Some("tran_bank2")).unwrap().width, 8);
//! ```
//!
//! Built-in platforms live under [`builtin`]; projects may also describe their
//! own boards in `tether.toml`, see [`load_registry`].

#![warn(missing_docs)]

pub mod builtin;
pub mod definition;
pub mod error;
pub mod group;
pub mod registry;

pub use builtin::platforms;
pub use definition::{from_definition, load_registry};
pub use error::RegistryError;
pub use group::{GroupLayout, Lane, PhysicalConstraint, SignalField, SignalGroup};
pub use registry::{PlatformInfo, ProgrammingDefaults, RegistryBuilder, SignalRegistry};
