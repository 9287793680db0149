//! The build session: one straight-line run of the pipeline.

use crate::error::{ConfigurationError, StageError};
use crate::manifest::BuildManifest;
use crate::result::BuildResult;
use crate::stage::{BuildState, Stage};
use std::path::{Path, PathBuf};
use tether_backend::{
    create_backend, create_programmer, BackendError, BitstreamFormat, BuildBackend, BuildRequest,
    Programmer,
};
use tether_common::{ContentHash, InternalError};
use tether_config::{
    load_config, resolve_build, BuildOverrides, ProgramMode, ProjectConfig, ResolvedBuild,
};
use tether_diagnostics::DiagnosticSink;
use tether_elaborate::{elaborate, scan_verilog_header, BindingTable, ComponentInterface};
use tether_platform::{load_registry, SignalRegistry};
use tether_sources::{collect, BuildDirectives, SourceRoot};

/// What a run should do beyond elaboration.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Invoke the build backend.
    pub build: bool,
    /// Load the bitstream onto the device.
    pub load: bool,
    /// Command-line overrides.
    pub overrides: BuildOverrides,
}

/// A loaded project, ready to run.
///
/// The backend and programmer default to the ones named in `tether.toml`
/// and the platform. Either can be replaced, which is how the pipeline is
/// exercised without vendor tools.
pub struct BuildSession {
    project_dir: PathBuf,
    config: ProjectConfig,
    backend: Option<Box<dyn BuildBackend>>,
    programmer: Option<Box<dyn Programmer>>,
}

/// Everything fixed by the `Configured` stage.
struct Configured {
    registry: SignalRegistry,
    component: ComponentInterface,
    table: BindingTable,
    resolved: ResolvedBuild,
    formats: Vec<BitstreamFormat>,
    mode: ProgramMode,
    programmer: Box<dyn Programmer>,
}

type StageResult<T> = Result<T, (Stage, StageError)>;

impl BuildSession {
    /// Loads `tether.toml` from `project_dir`.
    pub fn load(project_dir: &Path) -> Result<Self, ConfigurationError> {
        let config = load_config(project_dir)?;
        Ok(Self::new(project_dir, config))
    }

    /// Creates a session from an already loaded configuration.
    ///
    /// A relative `project_dir` is made absolute against the current
    /// directory, since vendor tools run from the output directory.
    pub fn new(project_dir: &Path, config: ProjectConfig) -> Self {
        let project_dir =
            std::path::absolute(project_dir).unwrap_or_else(|_| project_dir.to_path_buf());
        Self {
            project_dir,
            config,
            backend: None,
            programmer: None,
        }
    }

    /// Replaces the build backend.
    pub fn with_backend(mut self, backend: Box<dyn BuildBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Replaces the device programmer.
    pub fn with_programmer(mut self, programmer: Box<dyn Programmer>) -> Self {
        self.programmer = Some(programmer);
        self
    }

    /// The project configuration.
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// The project directory.
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Runs the pipeline to a terminal state.
    ///
    /// The first stage error ends the run. Later stages are not attempted
    /// and nothing is retried; in particular a failed synthesis never
    /// reaches the programmer.
    pub fn run(&self, options: &BuildOptions) -> BuildResult {
        let sink = DiagnosticSink::new();
        let mut result = BuildResult {
            state: BuildState::Configured,
            stage: Stage::Configured,
            succeeded: false,
            artifact_path: None,
            fingerprint: None,
            instance: None,
            sources: Vec::new(),
            diagnostics: Vec::new(),
        };

        match self.run_stages(options, &sink, &mut result) {
            Ok(()) => {
                result.state = BuildState::ProgrammedOrDone;
                result.succeeded = true;
            }
            Err((stage, err)) => {
                tracing::error!(%stage, error = %err, "build failed");
                sink.emit(err.to_diagnostic());
                result.state = BuildState::Failed(stage);
                result.stage = stage;
            }
        }
        result.diagnostics = sink.take_all();
        result
    }

    fn run_stages(
        &self,
        options: &BuildOptions,
        sink: &DiagnosticSink,
        result: &mut BuildResult,
    ) -> StageResult<()> {
        let configured = self
            .configure(options)
            .map_err(|e| (Stage::Configured, e.into()))?;
        advance(result, Stage::Configured);

        let (request, fingerprint) = self
            .compose_request(&configured, sink, result)
            .map_err(|e| (Stage::Elaborated, e))?;
        advance(result, Stage::Elaborated);

        if !options.build && !options.load {
            return Ok(());
        }

        let default_backend;
        let backend: &dyn BuildBackend = match &self.backend {
            Some(backend) => backend.as_ref(),
            None => {
                default_backend = create_backend(configured.resolved.backend);
                default_backend.as_ref()
            }
        };

        if options.build {
            self.synthesize(backend, &configured, &request, fingerprint, result)
                .map_err(|e| (Stage::Synthesized, e))?;
            advance(result, Stage::Synthesized);
        }

        if options.load {
            self.program(backend, &configured, &request, result)
                .map_err(|e| (Stage::ProgrammedOrDone, e))?;
            advance(result, Stage::ProgrammedOrDone);
        }
        Ok(())
    }

    fn configure(&self, options: &BuildOptions) -> Result<Configured, ConfigurationError> {
        let config = &self.config;
        let registry = load_registry(&config.platform.id, &config.platforms)?;

        let component = match &config.component.interface {
            Some(interface) => {
                let path = self.project_path(interface);
                let text = std::fs::read_to_string(&path)
                    .map_err(|source| ConfigurationError::Interface { path, source })?;
                scan_verilog_header(&text, &config.component.name)?
            }
            None => ComponentInterface::from_config(&config.component),
        };

        let table = BindingTable::from_config(&config.bindings);
        let resolved = resolve_build(config, &options.overrides);

        let defaults = &registry.info().programming;
        let tool = config.program.tool.unwrap_or(defaults.tool);
        let cable = config.program.cable.as_deref().unwrap_or(&defaults.cable);
        let mode = config.program.mode.unwrap_or(defaults.mode);
        let programmer = create_programmer(tool, cable);

        let mut formats = resolved
            .output_formats
            .iter()
            .map(|f| f.parse::<BitstreamFormat>())
            .collect::<Result<Vec<_>, _>>()?;
        if formats.is_empty() {
            formats.push(BitstreamFormat::Sof);
        }
        if options.load {
            let preferred = self
                .programmer
                .as_deref()
                .unwrap_or(programmer.as_ref())
                .preferred_format(mode);
            if !formats.contains(&preferred) {
                formats.push(preferred);
            }
        }

        tracing::debug!(
            platform = %registry.info().id,
            component = %component.name,
            ports = component.len(),
            bindings = table.len(),
            "configured"
        );
        Ok(Configured {
            registry,
            component,
            table,
            resolved,
            formats,
            mode,
            programmer,
        })
    }

    fn compose_request(
        &self,
        configured: &Configured,
        sink: &DiagnosticSink,
        result: &mut BuildResult,
    ) -> Result<(BuildRequest, ContentHash), StageError> {
        let config = &self.config;
        let instance = elaborate(
            &configured.component,
            config.component.instance_name(),
            &configured.registry,
            &configured.table,
            config.elaborate.stale_bindings,
            sink,
        )?;
        let fingerprint = instance
            .fingerprint()
            .map_err(|e| InternalError::new(format!("cannot fingerprint instance: {e}")))?;
        tracing::info!(%fingerprint, pads = instance.pads.len(), "composed instance");

        let roots: Vec<SourceRoot> = config.sources.iter().map(SourceRoot::from).collect();
        let units = collect(&self.project_dir, &roots)?;

        let mut directives = BuildDirectives::new();
        directives.apply_directives(configured.resolved.directives.iter().cloned());

        result.fingerprint = Some(fingerprint);
        result.instance = Some(instance.clone());
        result.sources = units.clone();

        let info = configured.registry.info();
        let request = BuildRequest {
            name: configured.resolved.name.clone(),
            top: configured.resolved.top.clone(),
            family: info.family.clone(),
            device: info.device.clone(),
            output_dir: self.project_path(&configured.resolved.output_dir),
            instance,
            units,
            directives,
            formats: configured.formats.clone(),
            run_toolchain: configured.resolved.run_toolchain,
        };
        Ok((request, fingerprint))
    }

    fn synthesize(
        &self,
        backend: &dyn BuildBackend,
        configured: &Configured,
        request: &BuildRequest,
        fingerprint: ContentHash,
        result: &mut BuildResult,
    ) -> Result<(), StageError> {
        tracing::info!(backend = backend.name(), top = %request.top, "synthesizing");
        let artifact = backend.build(request)?;
        let manifest = BuildManifest::new(
            &configured.registry.info().id,
            request,
            &artifact,
            fingerprint,
        )
        .write(&request.output_dir)?;
        tracing::debug!(path = %manifest.display(), "wrote build manifest");
        result.artifact_path = Some(artifact.primary);
        Ok(())
    }

    fn program(
        &self,
        backend: &dyn BuildBackend,
        configured: &Configured,
        request: &BuildRequest,
        result: &mut BuildResult,
    ) -> Result<(), StageError> {
        let programmer = self
            .programmer
            .as_deref()
            .unwrap_or(configured.programmer.as_ref());
        let mode = configured.mode;
        let built = backend.artifact_path(request, BitstreamFormat::for_mode(mode));
        let artifact = programmer.preferred_format(mode).translate(&built);
        if !artifact.is_file() {
            return Err(BackendError::ArtifactMissing { path: artifact }.into());
        }
        tracing::info!(
            programmer = programmer.name(),
            artifact = %artifact.display(),
            %mode,
            "loading bitstream"
        );
        programmer.load_bitstream(&artifact, mode)?;
        result.artifact_path = Some(artifact);
        Ok(())
    }

    fn project_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_dir.join(path)
        }
    }
}

fn advance(result: &mut BuildResult, stage: Stage) {
    tracing::info!(%stage, "stage complete");
    result.state = BuildState::reached(stage);
    result.stage = stage;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_config::load_config_from_str;

    const CONFIG: &str = r#"
[project]
name = "blink"

[platform]
id = "analog_pocket"

[component]
name = "core_top"
ports = [
    { name = "clk_74a", direction = "input" },
    { name = "user1", direction = "output" },
    { name = "heartbeat", direction = "output" },
]

[bindings]
clk_74a = "clk_74a"
user1 = "user1"
heartbeat = { internal = true }
"#;

    fn session(toml: &str) -> (tempfile::TempDir, BuildSession) {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = load_config_from_str(toml).unwrap();
        let session = BuildSession::new(tmp.path(), config);
        (tmp, session)
    }

    #[test]
    fn elaborate_only_run_succeeds() {
        let (_tmp, session) = session(CONFIG);
        let result = session.run(&BuildOptions::default());
        assert!(result.succeeded, "{:?}", result.diagnostics);
        assert_eq!(result.state, BuildState::ProgrammedOrDone);
        assert_eq!(result.stage, Stage::Elaborated);
        assert!(result.fingerprint.is_some());
        let instance = result.instance.unwrap();
        assert_eq!(instance.pads.len(), 2);
        assert!(result.artifact_path.is_none());
    }

    #[test]
    fn unknown_platform_fails_configuration() {
        let toml = CONFIG.replace("analog_pocket", "mystery_board");
        let (_tmp, session) = session(&toml);
        let result = session.run(&BuildOptions::default());
        assert_eq!(result.state, BuildState::Failed(Stage::Configured));
        assert_eq!(result.first_error().unwrap().code.to_string(), "E311");
        assert_eq!(result.exit_code(), 1);
    }

    #[test]
    fn unknown_output_format_fails_configuration() {
        let toml = format!("{CONFIG}\n[build]\noutput_formats = [\"jed\"]\n");
        let (_tmp, session) = session(&toml);
        let result = session.run(&BuildOptions::default());
        assert_eq!(result.state, BuildState::Failed(Stage::Configured));
    }

    #[test]
    fn missing_interface_file_fails_configuration() {
        let toml = r#"
[project]
name = "blink"
[platform]
id = "analog_pocket"
[component]
name = "core_top"
interface = "rtl/core_top.v"
"#;
        let (_tmp, session) = session(toml);
        let result = session.run(&BuildOptions::default());
        assert_eq!(result.state, BuildState::Failed(Stage::Configured));
        assert!(result
            .first_error()
            .unwrap()
            .message
            .contains("core_top.v"));
    }

    #[test]
    fn interface_file_is_scanned() {
        let toml = r#"
[project]
name = "blink"
[platform]
id = "analog_pocket"
[component]
name = "core_top"
interface = "rtl/core_top.v"
[bindings]
clk_74a = "clk_74a"
user1 = "user1"
"#;
        let (tmp, session) = session(toml);
        std::fs::create_dir(tmp.path().join("rtl")).unwrap();
        std::fs::write(
            tmp.path().join("rtl/core_top.v"),
            "module core_top (\n    input wire clk_74a,\n    output wire user1\n);\nendmodule\n",
        )
        .unwrap();
        let result = session.run(&BuildOptions::default());
        assert!(result.succeeded, "{:?}", result.diagnostics);
        assert_eq!(result.instance.unwrap().bindings.len(), 2);
    }

    #[test]
    fn unbound_port_fails_elaboration() {
        let toml = CONFIG.replace("heartbeat = { internal = true }\n", "");
        let (_tmp, session) = session(&toml);
        let result = session.run(&BuildOptions::default());
        assert_eq!(result.state, BuildState::Failed(Stage::Elaborated));
        assert_eq!(result.first_error().unwrap().code.to_string(), "E302");
        assert!(result.instance.is_none());
    }

    #[test]
    fn stale_binding_warning_survives_in_result() {
        let toml = format!("{CONFIG}ghost = \"user1\"\n");
        let (_tmp, session) = session(&toml);
        let result = session.run(&BuildOptions::default());
        assert!(result.succeeded);
        assert_eq!(result.warning_count(), 1);
        assert_eq!(result.diagnostics[0].code.to_string(), "W301");
    }

    #[test]
    fn missing_source_root_fails_elaboration() {
        let toml = format!("{CONFIG}\n[[sources]]\npath = \"fpga/core\"\n");
        let (_tmp, session) = session(&toml);
        let result = session.run(&BuildOptions::default());
        assert_eq!(result.state, BuildState::Failed(Stage::Elaborated));
        assert_eq!(result.first_error().unwrap().code.to_string(), "E309");
    }

    #[test]
    fn relative_project_dir_yields_absolute_paths() {
        let tmp = tempfile::Builder::new().tempdir_in(".").unwrap();
        let rel = PathBuf::from(tmp.path().file_name().unwrap());
        std::fs::create_dir_all(rel.join("rtl")).unwrap();
        std::fs::write(rel.join("rtl/core.v"), "// core\n").unwrap();

        let toml = format!("{CONFIG}\n[[sources]]\npath = \"rtl\"\n");
        let session = BuildSession::new(&rel, load_config_from_str(&toml).unwrap());
        assert!(session.project_dir().is_absolute());
        assert!(session.project_dir().ends_with(&rel));

        let result = session.run(&BuildOptions::default());
        assert!(result.succeeded, "{:?}", result.diagnostics);
        assert!(result.sources[0].path.is_absolute());
        assert!(result.sources[0].files[0].path.is_absolute());
    }
}
