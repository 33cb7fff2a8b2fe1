//! Declaration metadata ingestion
//!
//! The source-language front end describes every annotated declaration as a
//! JSON object in a `*.weld.json` file. This module converts that raw
//! metadata into the strongly typed contribution model up front, failing
//! fast on malformed input instead of propagating loosely typed values into
//! resolution.

use crate::contribution::{ContributedModule, ContributionRecord, Qualifier};
use crate::ident::TypeIdentity;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// File name suffix of declaration metadata files
pub const METADATA_SUFFIX: &str = ".weld.json";

/// Raw qualifier metadata as emitted by the front end
#[derive(Debug, Clone, Deserialize)]
pub struct RawQualifier {
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<String>,
}

/// Raw declaration metadata as emitted by the front end.
///
/// One variant per annotation the framework understands.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawDeclaration {
    /// "this type contributes a binding for bound-type X in scope S"
    ContributesBinding {
        concrete_type: String,
        bound_type: String,
        scope: String,
        #[serde(default)]
        qualifiers: Vec<RawQualifier>,
        #[serde(default)]
        replaces: Vec<String>,
        #[serde(default)]
        is_object_instance: bool,
        #[serde(default)]
        is_module: bool,
        #[serde(default)]
        supertypes: Vec<String>,
    },
    /// "this type contributes a multibinding for bound-type X in scope S"
    ContributesMultibinding {
        concrete_type: String,
        bound_type: String,
        scope: String,
        #[serde(default)]
        qualifiers: Vec<RawQualifier>,
        #[serde(default)]
        replaces: Vec<String>,
        #[serde(default)]
        is_object_instance: bool,
        #[serde(default)]
        is_module: bool,
        #[serde(default)]
        supertypes: Vec<String>,
    },
    /// "this module is attached to scope S"
    ContributesTo {
        module_type: String,
        scope: String,
        #[serde(default)]
        replaces: Vec<String>,
        #[serde(default)]
        is_interface_like: bool,
    },
    /// "this merge point requests a container for scope S"
    MergePoint {
        declaring_type: String,
        scope: String,
        #[serde(default)]
        excludes: Vec<String>,
    },
}

/// A validated declaration, ready for registration.
#[derive(Debug, Clone)]
pub enum Declaration {
    Contribution(ContributionRecord),
    Module(ContributedModule),
    MergePoint {
        declaring_type: TypeIdentity,
        scope: TypeIdentity,
        excludes: Vec<TypeIdentity>,
    },
}

fn parse_identity(raw: &str, context: &str) -> Result<TypeIdentity> {
    TypeIdentity::parse(raw)
        .map_err(|e| Error::Metadata(format!("{}: {}", context, e)))
}

fn parse_identities(raw: &[String], context: &str) -> Result<Vec<TypeIdentity>> {
    raw.iter().map(|s| parse_identity(s, context)).collect()
}

fn parse_qualifiers(raw: &[RawQualifier], context: &str) -> Result<Vec<Qualifier>> {
    raw.iter()
        .map(|q| {
            Ok(Qualifier {
                name: parse_identity(&q.name, context)?,
                arguments: q.arguments.clone(),
            })
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn ingest_contribution(
    concrete_type: String,
    bound_type: String,
    scope: String,
    qualifiers: Vec<RawQualifier>,
    replaces: Vec<String>,
    is_object_instance: bool,
    is_module: bool,
    supertypes: Vec<String>,
    is_multibinding: bool,
) -> Result<Declaration> {
    let context = format!("contribution {}", concrete_type);
    Ok(Declaration::Contribution(ContributionRecord {
        concrete_type: parse_identity(&concrete_type, &context)?,
        bound_type: parse_identity(&bound_type, &context)?,
        scope: parse_identity(&scope, &context)?,
        is_multibinding,
        qualifiers: parse_qualifiers(&qualifiers, &context)?,
        replaces: parse_identities(&replaces, &context)?,
        is_object_instance,
        is_module_shaped: is_module,
        supertypes: parse_identities(&supertypes, &context)?,
    }))
}

/// Convert one raw declaration into its validated form.
pub fn ingest(raw: RawDeclaration) -> Result<Declaration> {
    match raw {
        RawDeclaration::ContributesBinding {
            concrete_type,
            bound_type,
            scope,
            qualifiers,
            replaces,
            is_object_instance,
            is_module,
            supertypes,
        } => ingest_contribution(
            concrete_type,
            bound_type,
            scope,
            qualifiers,
            replaces,
            is_object_instance,
            is_module,
            supertypes,
            false,
        ),
        RawDeclaration::ContributesMultibinding {
            concrete_type,
            bound_type,
            scope,
            qualifiers,
            replaces,
            is_object_instance,
            is_module,
            supertypes,
        } => ingest_contribution(
            concrete_type,
            bound_type,
            scope,
            qualifiers,
            replaces,
            is_object_instance,
            is_module,
            supertypes,
            true,
        ),
        RawDeclaration::ContributesTo {
            module_type,
            scope,
            replaces,
            is_interface_like,
        } => {
            let context = format!("module {}", module_type);
            Ok(Declaration::Module(ContributedModule {
                module_type: parse_identity(&module_type, &context)?,
                scope: parse_identity(&scope, &context)?,
                replaces: parse_identities(&replaces, &context)?,
                is_interface_like,
            }))
        }
        RawDeclaration::MergePoint {
            declaring_type,
            scope,
            excludes,
        } => {
            let context = format!("merge point {}", declaring_type);
            Ok(Declaration::MergePoint {
                declaring_type: parse_identity(&declaring_type, &context)?,
                scope: parse_identity(&scope, &context)?,
                excludes: parse_identities(&excludes, &context)?,
            })
        }
    }
}

/// Read and validate one metadata file (a JSON array of declarations).
pub fn parse_file(path: &Path) -> Result<Vec<Declaration>> {
    let contents = std::fs::read_to_string(path)?;
    let raw: Vec<RawDeclaration> = serde_json::from_str(&contents).map_err(|e| {
        Error::Metadata(format!("{}: {}", path.display(), e))
    })?;
    raw.into_iter().map(ingest).collect()
}
