//! Descriptor discovery
//!
//! Scans the immediate subdirectories of a services root, one service per
//! directory. A directory without a descriptor is not a service; a descriptor
//! that fails to parse is logged and skipped. Neither aborts the scan.

use crate::error::{DiscoveryError, ManifestError};
use crate::models::Manifest;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Descriptor file names, in order of preference
pub const DESCRIPTOR_FILE_NAMES: [&str; 2] = ["manifest.yaml", "manifest.yml"];

/// Directories with this prefix hold scaffolding, not services
pub const TEMPLATE_PREFIX: &str = "_template";

/// Everything one discovery pass found
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    pub manifests: Vec<Manifest>,
    pub failures: Vec<ManifestError>,
    /// Candidate directories without a descriptor
    pub skipped: Vec<PathBuf>,
}

/// Returns the successfully parsed manifests under `dir`
pub fn discover(dir: &Path) -> Result<Vec<Manifest>, DiscoveryError> {
    discover_with_report(dir).map(|report| report.manifests)
}

/// Scans `dir` and keeps per-directory failures alongside the manifests
///
/// A missing services root yields an empty report. Only a root that exists
/// but cannot be listed is an error.
pub fn discover_with_report(dir: &Path) -> Result<DiscoveryReport, DiscoveryError> {
    let mut report = DiscoveryReport::default();

    if !dir.exists() {
        warn!(path = ?dir, "Services directory does not exist");
        return Ok(report);
    }

    let scan_err = |source| DiscoveryError {
        path: dir.to_path_buf(),
        source,
    };

    let mut candidates = Vec::new();
    for entry in fs::read_dir(dir).map_err(scan_err)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(path = ?dir, error = %e, "Failed to read directory entry");
                continue;
            }
        };
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with(TEMPLATE_PREFIX) || name.starts_with('.') {
            debug!(path = ?path, "Skipping reserved directory");
            continue;
        }
        candidates.push(path);
    }
    candidates.sort();

    for candidate in candidates {
        let Some(descriptor) = find_descriptor(&candidate) else {
            warn!(path = ?candidate, "No service descriptor found, skipping");
            report.skipped.push(candidate);
            continue;
        };

        match Manifest::from_file(&descriptor) {
            Ok(manifest) => {
                debug!(
                    service = %manifest.name,
                    version = %manifest.version,
                    "Discovered service"
                );
                report.manifests.push(manifest);
            }
            Err(e) => {
                error!(path = ?e.path(), error = %e, "Failed to load service descriptor");
                report.failures.push(e);
            }
        }
    }

    info!(
        path = ?dir,
        services = report.manifests.len(),
        failures = report.failures.len(),
        "Discovery finished"
    );
    Ok(report)
}

fn find_descriptor(dir: &Path) -> Option<PathBuf> {
    let mut found = DESCRIPTOR_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .filter(|path| path.is_file());

    let first = found.next()?;
    if let Some(other) = found.next() {
        warn!(using = ?first, ignored = ?other, "Multiple descriptors found");
    }
    Some(first)
}
