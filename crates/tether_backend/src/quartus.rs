//! Intel Quartus Prime build backend.
//!
//! Writes `<top>.v`, `<top>.qsf`, and a `build_<top>.sh` script reproducing
//! the tool invocations, then (optionally) runs `quartus_sh --flow compile`
//! and converts the `.sof` with `quartus_cpf`.

use crate::error::BackendError;
use crate::format::BitstreamFormat;
use crate::request::{BuildArtifact, BuildRequest};
use crate::tool::run_tool;
use crate::BuildBackend;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tether_elaborate::emit_verilog;
use tether_platform::Lane;
use tether_sources::SourceLanguage;

/// The Quartus build backend.
#[derive(Debug, Clone)]
pub struct QuartusBackend {
    quartus_sh: String,
    quartus_cpf: String,
}

impl Default for QuartusBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl QuartusBackend {
    /// Creates a backend using `quartus_sh` and `quartus_cpf` from `PATH`.
    pub fn new() -> Self {
        Self::with_tools("quartus_sh", "quartus_cpf")
    }

    /// Creates a backend with explicit tool names or paths.
    pub fn with_tools(quartus_sh: impl Into<String>, quartus_cpf: impl Into<String>) -> Self {
        Self {
            quartus_sh: quartus_sh.into(),
            quartus_cpf: quartus_cpf.into(),
        }
    }

    /// Tool invocations for a request, in order.
    fn commands(&self, request: &BuildRequest) -> Vec<(String, Vec<String>)> {
        let top = &request.top;
        let mut commands = vec![(
            self.quartus_sh.clone(),
            vec!["--flow".to_string(), "compile".to_string(), top.clone()],
        )];
        if request.formats.contains(&BitstreamFormat::Rbf) {
            commands.push((
                self.quartus_cpf.clone(),
                vec![
                    "-c".to_string(),
                    format!("{top}.sof"),
                    format!("{top}.rbf"),
                ],
            ));
        }
        commands
    }
}

impl BuildBackend for QuartusBackend {
    fn name(&self) -> &str {
        "quartus"
    }

    fn artifact_path(&self, request: &BuildRequest, format: BitstreamFormat) -> PathBuf {
        request
            .output_dir
            .join(format!("{}.{}", request.top, format.extension()))
    }

    fn build(&self, request: &BuildRequest) -> Result<BuildArtifact, BackendError> {
        if let Some(&format) = request.formats.iter().find(|f| **f == BitstreamFormat::Bit) {
            return Err(BackendError::UnsupportedFormat {
                backend: self.name().to_string(),
                format,
            });
        }

        let dir = &request.output_dir;
        std::fs::create_dir_all(dir).map_err(|source| BackendError::Io {
            path: dir.clone(),
            source,
        })?;

        let top_file = dir.join(format!("{}.v", request.top));
        let qsf_file = dir.join(format!("{}.qsf", request.top));
        let script_file = dir.join(format!("build_{}.sh", request.top));
        write_file(&top_file, &emit_verilog(&request.instance, &request.top))?;
        write_file(&qsf_file, &render_qsf(request, &top_file))?;
        write_file(&script_file, &render_script(&self.commands(request)))?;
        tracing::info!(dir = %dir.display(), top = %request.top, "wrote Quartus project");

        if request.run_toolchain {
            for (tool, args) in self.commands(request) {
                run_tool(&tool, &args, dir)?;
            }
        }

        let mut formats = vec![BitstreamFormat::Sof];
        for format in &request.formats {
            if !formats.contains(format) {
                formats.push(*format);
            }
        }
        let outputs: Vec<_> = formats
            .into_iter()
            .map(|f| (f, self.artifact_path(request, f)))
            .collect();

        if request.run_toolchain {
            if let Some((_, missing)) = outputs.iter().find(|(_, p)| !p.exists()) {
                return Err(BackendError::ArtifactMissing {
                    path: missing.clone(),
                });
            }
        }

        Ok(BuildArtifact {
            primary: self.artifact_path(request, BitstreamFormat::Sof),
            outputs,
            project_files: vec![top_file, qsf_file, script_file],
            ran_toolchain: request.run_toolchain,
        })
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), BackendError> {
    std::fs::write(path, content).map_err(|source| BackendError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Quartus spelling of a platform family name.
fn quartus_family(family: &str) -> String {
    match family.to_ascii_lowercase().as_str() {
        "cyclone_iv" | "cyclone_iv_e" => "Cyclone IV E".to_string(),
        "cyclone_v" => "Cyclone V".to_string(),
        "cyclone_10_lp" => "Cyclone 10 LP".to_string(),
        "max_10" => "MAX 10".to_string(),
        _ => family.to_string(),
    }
}

/// Quotes an assignment value containing spaces.
fn quote(value: &str) -> String {
    if value.contains(char::is_whitespace) && !value.starts_with('"') {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

fn file_assignment(language: SourceLanguage) -> &'static str {
    match language {
        SourceLanguage::Verilog => "VERILOG_FILE",
        SourceLanguage::SystemVerilog => "SYSTEMVERILOG_FILE",
        SourceLanguage::Vhdl => "VHDL_FILE",
    }
}

/// Renders the `.qsf` settings file.
pub fn render_qsf(request: &BuildRequest, top_file: &Path) -> String {
    let mut out = String::new();
    let mut line = |s: String| {
        out.push_str(&s);
        out.push('\n');
    };

    line("# Generated by tether. Do not edit.".to_string());
    line(format!(
        "set_global_assignment -name FAMILY {}",
        quote(&quartus_family(&request.family))
    ));
    line(format!("set_global_assignment -name DEVICE {}", request.device));
    line(format!(
        "set_global_assignment -name TOP_LEVEL_ENTITY {}",
        request.top
    ));
    if request.formats.contains(&BitstreamFormat::Pof)
        && request.directives.get("USE_CONFIGURATION_DEVICE").is_none()
    {
        line("set_global_assignment -name USE_CONFIGURATION_DEVICE ON".to_string());
    }

    line(String::new());
    for unit in &request.units {
        for file in &unit.files {
            line(format!(
                "set_global_assignment -name {} {}",
                file_assignment(file.language),
                quote(&file.path.display().to_string())
            ));
        }
    }
    line(format!(
        "set_global_assignment -name VERILOG_FILE {}",
        quote(&top_file.display().to_string())
    ));

    if !request.directives.is_empty() {
        line(String::new());
        for (key, value) in request.directives.iter() {
            line(format!("set_global_assignment -name {key} {}", quote(value)));
        }
    }

    let pins: Vec<String> = request
        .instance
        .pads
        .iter()
        .flat_map(pin_assignments)
        .collect();
    if !pins.is_empty() {
        line(String::new());
        for assignment in pins {
            line(assignment);
        }
    }

    out
}

/// Location and I/O standard assignments for one pad.
fn pin_assignments(lane: &Lane) -> Vec<String> {
    let net = lane.net_name();
    let bit = |i: usize| {
        if lane.width > 1 {
            format!("{net}[{i}]")
        } else {
            net.clone()
        }
    };
    let mut out = Vec::new();
    for (i, pin) in lane.constraint.pins.iter().enumerate() {
        out.push(format!("set_location_assignment {pin} -to {}", bit(i)));
    }
    if let Some(standard) = &lane.constraint.io_standard {
        let target = if lane.width > 1 {
            format!("{net}[*]")
        } else {
            net.clone()
        };
        out.push(format!(
            "set_instance_assignment -name IO_STANDARD \"{standard}\" -to {target}"
        ));
    }
    out
}

/// Renders a shell script running `commands` in order.
fn render_script(commands: &[(String, Vec<String>)]) -> String {
    let mut out = String::from("#!/bin/sh\n# Generated by tether. Do not edit.\nset -e\n");
    for (tool, args) in commands {
        let _ = writeln!(out, "{tool} {}", args.join(" "));
    }
    out
}
