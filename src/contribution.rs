//! Contribution types - the merge engine's data model
//!
//! All declaration metadata reduces to three record shapes:
//! - `ContributionRecord`: a binding or multibinding contributed to a scope
//! - `ContributedModule`: a hand-written module attached to a scope
//! - `MergeTarget`: a request to synthesize a container for a scope

use crate::ident::TypeIdentity;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The kind of a contribution, as published through the marker convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContributionKind {
    /// A single binding: concrete type bound to one supertype
    Binding,
    /// A multibinding: concrete type contributed into a collection binding
    Multibinding,
    /// A module attached to a scope
    Module,
}

impl ContributionKind {
    /// Get the string representation of the contribution kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ContributionKind::Binding => "binding",
            ContributionKind::Multibinding => "multibinding",
            ContributionKind::Module => "module",
        }
    }

    /// Get all contribution kinds
    pub fn all() -> &'static [ContributionKind] {
        &[
            ContributionKind::Binding,
            ContributionKind::Multibinding,
            ContributionKind::Module,
        ]
    }
}

impl FromStr for ContributionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "binding" | "bind" => Ok(ContributionKind::Binding),
            "multibinding" | "multibind" | "intoset" => Ok(ContributionKind::Multibinding),
            "module" | "attachment" => Ok(ContributionKind::Module),
            _ => Err(Error::Metadata(format!("Unknown contribution kind: {}", s))),
        }
    }
}

impl std::fmt::Display for ContributionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A qualifier annotation carried on a contribution, with its arguments.
///
/// Qualifiers are an ordered set: declaration order is preserved through
/// resolution and emission unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Qualifier {
    /// The qualifier annotation type
    pub name: TypeIdentity,
    /// Raw argument expressions, in declaration order
    #[serde(default)]
    pub arguments: Vec<String>,
}

/// A contributed binding or multibinding.
///
/// Produced by the scanner from local declaration metadata or from an
/// externally published marker; accumulated in the scope registry and
/// filtered by the conflict resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionRecord {
    /// Fully-qualified identity of the implementing type
    pub concrete_type: TypeIdentity,
    /// The supertype the concrete type is bound to
    pub bound_type: TypeIdentity,
    /// Scope identifier this contribution is merged into
    pub scope: TypeIdentity,
    /// Whether this is a multibinding (collection) contribution
    pub is_multibinding: bool,
    /// Qualifier annotations, in declaration order
    #[serde(default)]
    pub qualifiers: Vec<Qualifier>,
    /// Type identities this contribution supersedes
    #[serde(default)]
    pub replaces: Vec<TypeIdentity>,
    /// True if the concrete type is a singleton value rather than an
    /// instantiable type; selects a provider-style accessor
    #[serde(default)]
    pub is_object_instance: bool,
    /// True if the concrete type is itself a container-eligible module;
    /// its `replaces` set then also participates in module replacement
    #[serde(default)]
    pub is_module_shaped: bool,
    /// Supertype closure of the concrete type, supplied by the front end
    #[serde(default)]
    pub supertypes: Vec<TypeIdentity>,
}

impl ContributionRecord {
    /// The marker kind this record is published under
    pub fn kind(&self) -> ContributionKind {
        if self.is_multibinding {
            ContributionKind::Multibinding
        } else {
            ContributionKind::Binding
        }
    }

    /// Whether the concrete type structurally extends the declared bound type.
    ///
    /// The check is over the front-end-supplied supertype closure; binding a
    /// type to itself is always accepted.
    pub fn extends_bound_type(&self) -> bool {
        self.concrete_type == self.bound_type
            || self
                .supertypes
                .iter()
                .any(|supertype| supertype.base_name() == self.bound_type.base_name())
    }
}

/// A hand-written module explicitly attached to a scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributedModule {
    /// The module type
    pub module_type: TypeIdentity,
    /// Scope identifier this module is attached to
    pub scope: TypeIdentity,
    /// Module and binding type identities this module supersedes
    #[serde(default)]
    pub replaces: Vec<TypeIdentity>,
    /// True if the module is interface-like (cannot carry provider bodies)
    #[serde(default)]
    pub is_interface_like: bool,
}

/// Fixed suffix appended to a merge point's simple name to form the
/// generated container name and its reserved output file.
pub const CONTAINER_SUFFIX: &str = "MergedContainer";

/// Extension of generated container files
pub const CONTAINER_EXTENSION: &str = "weld";

/// One request to synthesize a container for a scope.
///
/// Created when a merge-point declaration is scanned. One scope may have
/// multiple independent targets; each gets its own container, resolved from
/// the same per-scope snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeTarget {
    /// Scope identifier the container merges
    pub scope: TypeIdentity,
    /// The merge-point declaration requesting the container
    pub declaring_type: TypeIdentity,
    /// Reserved output path for the emitted container
    pub output_location: PathBuf,
    /// Type identities never included in this scope, regardless of replaces
    #[serde(default)]
    pub explicit_excludes: Vec<TypeIdentity>,
}

impl MergeTarget {
    /// Create a merge target, deriving the reserved output location from the
    /// declaring type's namespace plus the fixed container suffix.
    pub fn new(
        scope: TypeIdentity,
        declaring_type: TypeIdentity,
        explicit_excludes: Vec<TypeIdentity>,
        out_dir: &Path,
    ) -> Self {
        let mut output_location = out_dir.to_path_buf();
        for segment in declaring_type.namespace_segments() {
            output_location.push(segment);
        }
        output_location.push(format!(
            "{}{}.{}",
            declaring_type.simple_name(),
            CONTAINER_SUFFIX,
            CONTAINER_EXTENSION
        ));

        Self {
            scope,
            declaring_type,
            output_location,
            explicit_excludes,
        }
    }

    /// Name of the container synthesized for this target
    pub fn container_name(&self) -> String {
        format!("{}{}", self.declaring_type.simple_name(), CONTAINER_SUFFIX)
    }
}
