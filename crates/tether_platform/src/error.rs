//! Error types for platform registration and signal-group lookup.

/// Errors raised while registering a platform or requesting its signal groups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// No built-in or user-defined platform has this id.
    #[error("unknown platform '{0}'")]
    UnknownPlatform(String),

    /// The requested group was never registered for the active platform.
    #[error("unknown signal group '{group}' on platform '{platform}'")]
    UnknownSignalGroup {
        /// The active platform id.
        platform: String,
        /// The requested group name.
        group: String,
    },

    /// The group exists but has no sub-field with this name.
    #[error("signal group '{group}' has no field '{field}'")]
    UnknownField {
        /// The group name.
        group: String,
        /// The requested field name.
        field: String,
    },

    /// A composite group was addressed without naming one of its fields.
    #[error("signal group '{group}' is a composite connector; select one of its fields")]
    FieldRequired {
        /// The group name.
        group: String,
    },

    /// Two groups share a name within one platform.
    #[error("signal group '{0}' is registered twice")]
    DuplicateGroup(String),

    /// Two lanes of different groups would drive the same top-level net.
    #[error("signal group '{group}' reuses net '{net}' already taken by group '{owner}'")]
    NetNameCollision {
        /// The colliding net name.
        net: String,
        /// The group being added.
        group: String,
        /// The group that registered the net first.
        owner: String,
    },

    /// Two fields share a name within one group.
    #[error("signal group '{group}' declares field '{field}' twice")]
    DuplicateField {
        /// The group name.
        group: String,
        /// The duplicated field name.
        field: String,
    },

    /// A group or field was declared with zero width.
    #[error("signal '{0}' has zero width")]
    ZeroWidth(String),

    /// The pin list does not match the declared width.
    #[error("signal '{name}' is {width} bit(s) wide but lists {pins} pin(s)")]
    PinCountMismatch {
        /// The group or field net name.
        name: String,
        /// The declared width.
        width: u32,
        /// The number of pins given.
        pins: usize,
    },
}
