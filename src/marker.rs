//! Marker convention - cross-unit contribution discovery
//!
//! Already-compiled dependencies publish their contributions as marker files
//! under a dedicated namespace prefix per kind:
//!
//! - `weld.hint.binding.<flattened-identity>.marker.json`
//! - `weld.hint.multibinding.<flattened-identity>.marker.json`
//! - `weld.hint.module.<flattened-identity>.marker.json`
//!
//! The prefixes make contributions locatable with a plain directory listing
//! or grep, without a semantic index of the producing unit. The file content
//! is the serialized record itself; the kind is carried by the file name.

use crate::contribution::{ContributedModule, ContributionKind, ContributionRecord};
use crate::ident::TypeIdentity;
use crate::metadata::Declaration;
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Namespace prefix for published binding markers
pub const BINDING_PREFIX: &str = "weld.hint.binding";
/// Namespace prefix for published multibinding markers
pub const MULTIBINDING_PREFIX: &str = "weld.hint.multibinding";
/// Namespace prefix for published module-attachment markers
pub const MODULE_PREFIX: &str = "weld.hint.module";

/// File name suffix shared by all markers
pub const MARKER_SUFFIX: &str = ".marker.json";

/// The namespace prefix a contribution kind is published under
pub fn prefix_for(kind: ContributionKind) -> &'static str {
    match kind {
        ContributionKind::Binding => BINDING_PREFIX,
        ContributionKind::Multibinding => MULTIBINDING_PREFIX,
        ContributionKind::Module => MODULE_PREFIX,
    }
}

/// Marker file name for a contribution of the given kind and identity
pub fn file_name(kind: ContributionKind, identity: &TypeIdentity) -> String {
    format!("{}.{}{}", prefix_for(kind), identity.flattened(), MARKER_SUFFIX)
}

/// Classify a file name against the marker convention.
///
/// Returns the contribution kind, or `None` if the name is not a marker.
/// Multibinding is matched before binding since the prefixes share a stem.
pub fn classify_file_name(name: &str) -> Option<ContributionKind> {
    if !name.ends_with(MARKER_SUFFIX) {
        return None;
    }
    if name.starts_with(MULTIBINDING_PREFIX) {
        Some(ContributionKind::Multibinding)
    } else if name.starts_with(BINDING_PREFIX) {
        Some(ContributionKind::Binding)
    } else if name.starts_with(MODULE_PREFIX) {
        Some(ContributionKind::Module)
    } else {
        None
    }
}

/// Read one marker file into a validated declaration.
pub fn read_marker(path: &Path) -> Result<Declaration> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::Marker(format!("unreadable marker name: {}", path.display())))?;

    let kind = classify_file_name(name)
        .ok_or_else(|| Error::Marker(format!("not a marker file: {}", name)))?;

    let contents = std::fs::read_to_string(path)?;
    match kind {
        ContributionKind::Binding | ContributionKind::Multibinding => {
            let mut record: ContributionRecord = serde_json::from_str(&contents)
                .map_err(|e| Error::Marker(format!("{}: {}", path.display(), e)))?;
            // The file name prefix is authoritative for the kind
            record.is_multibinding = kind == ContributionKind::Multibinding;
            Ok(Declaration::Contribution(record))
        }
        ContributionKind::Module => {
            let module: ContributedModule = serde_json::from_str(&contents)
                .map_err(|e| Error::Marker(format!("{}: {}", path.display(), e)))?;
            Ok(Declaration::Module(module))
        }
    }
}

/// Publish a contribution record as a marker file under `dir`.
pub fn write_contribution_marker(dir: &Path, record: &ContributionRecord) -> Result<PathBuf> {
    let path = dir.join(file_name(record.kind(), &record.concrete_type));
    std::fs::create_dir_all(dir)?;
    std::fs::write(&path, serde_json::to_string_pretty(record)?)?;
    Ok(path)
}

/// Publish a module attachment as a marker file under `dir`.
pub fn write_module_marker(dir: &Path, module: &ContributedModule) -> Result<PathBuf> {
    let path = dir.join(file_name(ContributionKind::Module, &module.module_type));
    std::fs::create_dir_all(dir)?;
    std::fs::write(&path, serde_json::to_string_pretty(module)?)?;
    Ok(path)
}
