//! Configuration types deserialized from `tether.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tether_common::Direction;

/// The top-level project configuration parsed from `tether.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    /// Core project metadata.
    pub project: ProjectMeta,
    /// The platform whose connector surface the design is bound to.
    pub platform: PlatformSelection,
    /// User-defined platforms, keyed by platform id.
    #[serde(default)]
    pub platforms: BTreeMap<String, PlatformDef>,
    /// The externally supplied component to instantiate.
    pub component: ComponentConfig,
    /// The binding table: component port name to binding target.
    #[serde(default)]
    pub bindings: BTreeMap<String, BindingSpec>,
    /// Binding-resolution policy.
    #[serde(default)]
    pub elaborate: ElaborateConfig,
    /// Source roots, in dependency order.
    #[serde(default)]
    pub sources: Vec<SourceRootConfig>,
    /// Toolchain directives forwarded verbatim to the build backend.
    #[serde(default)]
    pub directives: BTreeMap<String, DirectiveValue>,
    /// Build backend settings.
    #[serde(default)]
    pub build: BuildConfig,
    /// Device programming settings.
    #[serde(default)]
    pub program: ProgramConfig,
}

/// Core project metadata required in every `tether.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectMeta {
    /// The project name, also the default build name.
    pub name: String,
    /// The project version string.
    #[serde(default)]
    pub version: String,
    /// A brief description of the project.
    #[serde(default)]
    pub description: String,
}

/// Selects the active platform by id.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformSelection {
    /// A built-in platform id, or the key of an entry in `[platforms]`.
    pub id: String,
}

/// A user-defined platform: a device plus its named signal groups.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformDef {
    /// Full device part number (e.g., "5CEBA4F23C8").
    pub device: String,
    /// Device family name (e.g., "cyclone_v").
    pub family: String,
    /// Signal groups keyed by name.
    #[serde(default)]
    pub groups: BTreeMap<String, GroupDef>,
}

/// A signal group in a user-defined platform.
///
/// A scalar group sets `direction` (and optionally `width`); a composite
/// connector lists its sub-signals under `fields` instead.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupDef {
    /// Direction of a scalar group.
    pub direction: Option<Direction>,
    /// Width of a scalar group in bits (defaults to 1).
    pub width: Option<u32>,
    /// Physical pin locations, least significant bit first.
    #[serde(default)]
    pub pins: Vec<String>,
    /// The I/O standard for the group's pins.
    pub io_standard: Option<String>,
    /// Sub-signals of a composite connector, keyed by field name.
    #[serde(default)]
    pub fields: BTreeMap<String, FieldDef>,
}

/// A sub-signal of a composite signal group.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDef {
    /// Direction of the field.
    pub direction: Direction,
    /// Width of the field in bits.
    #[serde(default = "default_width")]
    pub width: u32,
    /// Physical pin locations, least significant bit first.
    #[serde(default)]
    pub pins: Vec<String>,
    /// The I/O standard for the field's pins.
    pub io_standard: Option<String>,
}

/// The component to instantiate and where its port list comes from.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentConfig {
    /// The component (module) name.
    pub name: String,
    /// The instance label in the generated top level. Defaults to `name`.
    pub instance: Option<String>,
    /// An inline, ordered port list.
    #[serde(default)]
    pub ports: Vec<PortDecl>,
    /// A Verilog file whose module header declares the ports.
    pub interface: Option<String>,
}

impl ProjectConfig {
    /// The generated top-level module name: `build.top`, or `<project>_top`.
    pub fn top_name(&self) -> String {
        self.build
            .top
            .clone()
            .unwrap_or_else(|| format!("{}_top", self.project.name))
    }
}

impl ComponentConfig {
    /// Returns the instance label, falling back to the component name.
    pub fn instance_name(&self) -> &str {
        self.instance.as_deref().unwrap_or(&self.name)
    }
}

/// One port of the component, as declared inline in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PortDecl {
    /// The port name.
    pub name: String,
    /// The port direction.
    pub direction: Direction,
    /// The port width in bits.
    #[serde(default = "default_width")]
    pub width: u32,
}

fn default_width() -> u32 {
    1
}

/// A binding target as written in `[bindings]`.
///
/// The string form is a `group` or `group.field` path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BindingSpec {
    /// `"group"` or `"group.field"` shorthand.
    Path(String),
    /// `{ group = "...", field = "..." }`.
    Group {
        /// The signal group name.
        group: String,
        /// An optional sub-field of a composite group.
        #[serde(default)]
        field: Option<String>,
    },
    /// `{ internal = true }`: a fresh internal signal.
    Internal {
        /// Must be `true`.
        internal: bool,
    },
    /// `{ constant = N }`: tie the port to a constant.
    Constant {
        /// The constant value.
        constant: u64,
    },
}

/// How to treat binding-table entries naming ports the component does not declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StalePolicy {
    /// Ignore them silently.
    Allow,
    /// Ignore them with a warning diagnostic.
    #[default]
    Warn,
    /// Reject the build.
    Deny,
}

/// Binding-resolution settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ElaborateConfig {
    /// Policy for stale binding entries.
    #[serde(default)]
    pub stale_bindings: StalePolicy,
}

/// One source root contributing HDL files to the build.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceRootConfig {
    /// Directory path, relative to the project directory unless absolute.
    pub path: String,
    /// Whether nested directories are traversed.
    #[serde(default)]
    pub recursive: bool,
}

/// A directive value. TOML strings, integers, and booleans are all accepted
/// and forwarded in their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DirectiveValue {
    /// A string value, forwarded as-is.
    Text(String),
    /// An integer value.
    Integer(i64),
    /// A boolean value, forwarded as `ON`/`OFF`.
    Flag(bool),
}

impl fmt::Display for DirectiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectiveValue::Text(s) => write!(f, "{s}"),
            DirectiveValue::Integer(n) => write!(f, "{n}"),
            DirectiveValue::Flag(true) => write!(f, "ON"),
            DirectiveValue::Flag(false) => write!(f, "OFF"),
        }
    }
}

/// The synthesis backend used to build the composed design.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Intel Quartus Prime.
    #[default]
    Quartus,
}

/// Build configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfig {
    /// The synthesis backend.
    #[serde(default)]
    pub backend: BackendKind,
    /// Output directory, relative to the project directory.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Name of the generated top-level module. Defaults to `<project>_top`.
    pub top: Option<String>,
    /// Whether to invoke the vendor toolchain or only write the project files.
    #[serde(default = "default_true")]
    pub run_toolchain: bool,
    /// Output bitstream formats (e.g., `"sof"` or `["sof", "rbf"]`).
    ///
    /// Accepts either a single string or a list of strings. Empty means the
    /// backend's primary format plus whatever the programmer needs.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub output_formats: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            output_dir: default_output_dir(),
            top: None,
            run_toolchain: true,
            output_formats: Vec::new(),
        }
    }
}

fn default_output_dir() -> String {
    "build".to_string()
}

fn default_true() -> bool {
    true
}

/// Deserializes a field that can be either a single string or a list of strings.
fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// The device programmer tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgrammerKind {
    /// `quartus_pgm` over JTAG.
    Quartus,
    /// `openFPGALoader`.
    OpenFpgaLoader,
}

/// Which configuration memory a bitstream is loaded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramMode {
    /// Volatile configuration SRAM; lost on power cycle.
    Sram,
    /// Non-volatile configuration flash.
    Flash,
}

impl fmt::Display for ProgramMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramMode::Sram => write!(f, "sram"),
            ProgramMode::Flash => write!(f, "flash"),
        }
    }
}

/// Programming settings. Unset fields fall back to the platform's defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgramConfig {
    /// The programmer tool.
    pub tool: Option<ProgrammerKind>,
    /// The cable name passed to the programmer.
    pub cable: Option<String>,
    /// The configuration memory to program.
    pub mode: Option<ProgramMode>,
}
