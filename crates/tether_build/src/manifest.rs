//! The build manifest written next to the bitstreams.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tether_backend::{BackendError, BitstreamFormat, BuildArtifact, BuildRequest};
use tether_common::ContentHash;

/// A record of what went into a build.
#[derive(Debug, Serialize)]
pub struct BuildManifest<'a> {
    /// The build name.
    pub name: &'a str,
    /// The generated top module.
    pub top: &'a str,
    /// The platform id.
    pub platform: &'a str,
    /// The device part number.
    pub device: &'a str,
    /// Fingerprint of the composed instance.
    pub fingerprint: String,
    /// Source files, in compile order.
    pub sources: Vec<&'a Path>,
    /// Directives in key order.
    pub directives: Vec<(&'a str, &'a str)>,
    /// Bitstreams and their formats.
    pub outputs: &'a [(BitstreamFormat, PathBuf)],
}

impl<'a> BuildManifest<'a> {
    /// Assembles the manifest for a finished build.
    pub fn new(
        platform: &'a str,
        request: &'a BuildRequest,
        artifact: &'a BuildArtifact,
        fingerprint: ContentHash,
    ) -> Self {
        Self {
            name: &request.name,
            top: &request.top,
            platform,
            device: &request.device,
            fingerprint: fingerprint.to_string(),
            sources: request
                .units
                .iter()
                .flat_map(|u| u.files.iter().map(|f| f.path.as_path()))
                .collect(),
            directives: request.directives.iter().collect(),
            outputs: &artifact.outputs,
        }
    }

    /// Writes the manifest as `<top>.manifest.json` in `dir`.
    pub fn write(&self, dir: &Path) -> Result<PathBuf, BackendError> {
        let path = dir.join(format!("{}.manifest.json", self.top));
        let json = serde_json::to_string_pretty(self).map_err(|e| BackendError::Io {
            path: path.clone(),
            source: e.into(),
        })?;
        std::fs::write(&path, json).map_err(|source| BackendError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}
