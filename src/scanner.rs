//! Contribution Scanner - per-unit discovery of contribution facts
//!
//! A scan pass covers one compilation unit: its local declaration metadata
//! (`*.weld.json`, produced by the front end) plus any marker directories
//! published by already-compiled dependencies. Everything found is appended
//! to the scope registry; the registry absorbs duplicates, so scanning the
//! same inputs again records nothing new.

use crate::contribution::MergeTarget;
use crate::marker;
use crate::metadata::{self, Declaration};
use crate::registry::ScopeRegistry;
use crate::Result;
use std::path::{Path, PathBuf};

/// Inputs for scanning one compilation unit
#[derive(Debug, Clone)]
pub struct UnitInputs {
    /// Directory holding the unit's `*.weld.json` declaration metadata
    pub declarations_dir: PathBuf,
    /// Marker directories published by dependencies
    pub marker_dirs: Vec<PathBuf>,
    /// Where to publish this unit's own markers, if anywhere
    pub publish_markers_to: Option<PathBuf>,
}

impl UnitInputs {
    /// Scan a unit directory with no external markers and no publishing
    pub fn local_only(declarations_dir: impl Into<PathBuf>) -> Self {
        Self {
            declarations_dir: declarations_dir.into(),
            marker_dirs: Vec::new(),
            publish_markers_to: None,
        }
    }
}

/// What one scan pass found and recorded
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Metadata files read
    pub metadata_files: usize,
    /// Marker files read
    pub markers_read: usize,
    /// Contributions newly recorded (duplicates not counted)
    pub new_contributions: usize,
    /// Modules newly recorded
    pub new_modules: usize,
    /// Output locations of merge targets first seen in this pass
    pub new_target_paths: Vec<PathBuf>,
    /// Markers published for this unit's local declarations
    pub markers_published: usize,
}

/// Scanner appending one unit's contribution facts into the registry
pub struct Scanner<'a> {
    registry: &'a mut ScopeRegistry,
    out_dir: &'a Path,
}

impl<'a> Scanner<'a> {
    /// Create a scanner over the shared registry.
    ///
    /// `out_dir` roots the reserved output locations of discovered merge
    /// targets.
    pub fn new(registry: &'a mut ScopeRegistry, out_dir: &'a Path) -> Self {
        Self { registry, out_dir }
    }

    /// Scan one compilation unit.
    ///
    /// Tolerates zero matches in every input directory. Idempotent: an
    /// identical declaration seen again (same unit re-scanned, or the same
    /// fact arriving both locally and via a marker) is not re-recorded.
    pub fn scan_unit(&mut self, inputs: &UnitInputs) -> Result<ScanSummary> {
        let mut summary = ScanSummary::default();

        for path in sorted_glob(&inputs.declarations_dir, &format!("*{}", metadata::METADATA_SUFFIX))? {
            summary.metadata_files += 1;
            for declaration in metadata::parse_file(&path)? {
                self.record(declaration, inputs.publish_markers_to.as_deref(), &mut summary)?;
            }
        }

        for dir in &inputs.marker_dirs {
            for path in sorted_glob(dir, &format!("*{}", marker::MARKER_SUFFIX))? {
                summary.markers_read += 1;
                let declaration = marker::read_marker(&path)?;
                // External facts are never re-published
                self.record(declaration, None, &mut summary)?;
            }
        }

        tracing::debug!(
            unit = %inputs.declarations_dir.display(),
            metadata_files = summary.metadata_files,
            markers_read = summary.markers_read,
            new_contributions = summary.new_contributions,
            new_modules = summary.new_modules,
            new_targets = summary.new_target_paths.len(),
            "scanned unit"
        );
        Ok(summary)
    }

    fn record(
        &mut self,
        declaration: Declaration,
        publish_to: Option<&Path>,
        summary: &mut ScanSummary,
    ) -> Result<()> {
        match declaration {
            Declaration::Contribution(record) => {
                if let Some(dir) = publish_to {
                    marker::write_contribution_marker(dir, &record)?;
                    summary.markers_published += 1;
                }
                if self.registry.record_contribution(record) {
                    summary.new_contributions += 1;
                }
            }
            Declaration::Module(module) => {
                if let Some(dir) = publish_to {
                    marker::write_module_marker(dir, &module)?;
                    summary.markers_published += 1;
                }
                if self.registry.record_module(module) {
                    summary.new_modules += 1;
                }
            }
            Declaration::MergePoint {
                declaring_type,
                scope,
                excludes,
            } => {
                let target = MergeTarget::new(scope, declaring_type, excludes, self.out_dir);
                let output_location = target.output_location.clone();
                if self.registry.register_merge_target(target) {
                    summary.new_target_paths.push(output_location);
                }
            }
        }
        Ok(())
    }
}

fn sorted_glob(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let full_pattern = dir.join(pattern);
    let Some(full_pattern) = full_pattern.to_str() else {
        return Ok(Vec::new());
    };
    let mut paths: Vec<PathBuf> = glob::glob(full_pattern)?
        .filter_map(|entry| entry.ok())
        .collect();
    paths.sort();
    Ok(paths)
}
