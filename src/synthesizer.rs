//! Container Synthesizer - deterministic emission of merged containers
//!
//! Turns a scope's resolved contribution set into one container declaration
//! per merge target. Output is fully deterministic: accessor names are pure
//! functions of type identity, and every list is emitted in sorted order, so
//! regenerating from the same contribution set yields byte-identical text.
//!
//! Accessor name derivation (stable; downstream consumers may depend on it):
//! 1. Take the concrete type's base name and split it on `.`
//! 2. Uppercase the first character of each segment (ASCII case folding),
//!    leaving the rest of the segment untouched
//! 3. Concatenate the segments
//! 4. Prefix with `bind` (binding-style) or `provide` (provider-style,
//!    chosen when the concrete type is a singleton value)
//! 5. Append `Multibinding` for multibinding contributions, so a type
//!    contributed both ways never collides

use crate::contribution::{ContributionRecord, MergeTarget, Qualifier};
use crate::ident::TypeIdentity;
use crate::resolver::ResolvedScope;
use std::fmt::Write as _;

/// Distinguishing suffix for multibinding accessors
pub const MULTIBINDING_SUFFIX: &str = "Multibinding";

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Derive the accessor method name for a contribution.
///
/// Pure function of the record's concrete type and flags; see the module
/// docs for the exact derivation.
pub fn accessor_name(record: &ContributionRecord) -> String {
    let joined: String = record.concrete_type.segments().map(capitalize).collect();
    let prefix = if record.is_object_instance { "provide" } else { "bind" };
    let suffix = if record.is_multibinding { MULTIBINDING_SUFFIX } else { "" };
    format!("{}{}{}", prefix, joined, suffix)
}

/// The style of a synthesized accessor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorStyle {
    /// Abstract accessor taking the concrete type, returning the bound type
    Binding,
    /// Provider accessor returning the singleton value
    Provider,
}

/// One named accessor in a synthesized container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorDecl {
    /// Deterministically derived method name
    pub name: String,
    /// Binding-style or provider-style
    pub style: AccessorStyle,
    /// The contributed concrete type
    pub concrete_type: TypeIdentity,
    /// The bound type the accessor returns
    pub bound_type: TypeIdentity,
    /// Whether the accessor feeds a collection binding
    pub is_multibinding: bool,
    /// Qualifier annotations, carried forward unchanged
    pub qualifiers: Vec<Qualifier>,
}

impl AccessorDecl {
    fn from_record(record: &ContributionRecord) -> Self {
        Self {
            name: accessor_name(record),
            style: if record.is_object_instance {
                AccessorStyle::Provider
            } else {
                AccessorStyle::Binding
            },
            concrete_type: record.concrete_type.clone(),
            bound_type: record.bound_type.clone(),
            is_multibinding: record.is_multibinding,
            qualifiers: record.qualifiers.clone(),
        }
    }
}

/// The shape of a synthesized container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerShape {
    /// No binding-style entries survived: the container is a value holder
    ValueHolder,
    /// Abstract type; provider accessors are nested in a companion construct
    Abstract,
}

/// A synthesized container declaration for one merge target.
#[derive(Debug, Clone)]
pub struct ContainerDecl {
    /// Container type name, derived from the merge point declaration
    pub name: String,
    /// The scope the container is tagged with
    pub scope: TypeIdentity,
    /// Value holder or abstract type
    pub shape: ContainerShape,
    /// Binding-style accessors, sorted by name
    pub accessors: Vec<AccessorDecl>,
    /// Provider-style accessors, sorted by name
    pub providers: Vec<AccessorDecl>,
    /// Surviving contributed modules, sorted by identity
    pub includes: Vec<TypeIdentity>,
}

impl ContainerDecl {
    /// Render the container as deterministic text.
    ///
    /// The emission backend downstream consumes this form; identical inputs
    /// always produce byte-identical output.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "// Generated by scopeweld. Do not edit.");
        let _ = writeln!(out, "@MergedIn(scope = {})", self.scope);

        let keyword = match self.shape {
            ContainerShape::ValueHolder => "container object",
            ContainerShape::Abstract => "abstract container",
        };
        let _ = writeln!(out, "{} {} {{", keyword, self.name);

        for accessor in &self.accessors {
            render_qualifiers(&mut out, "    ", &accessor.qualifiers);
            let _ = writeln!(
                out,
                "    abstract {}(impl: {}): {}",
                accessor.name, accessor.concrete_type, accessor.bound_type
            );
        }

        if !self.providers.is_empty() {
            match self.shape {
                ContainerShape::ValueHolder => {
                    for provider in &self.providers {
                        render_provider(&mut out, "    ", provider);
                    }
                }
                ContainerShape::Abstract => {
                    let _ = writeln!(out, "    companion {{");
                    for provider in &self.providers {
                        render_provider(&mut out, "        ", provider);
                    }
                    let _ = writeln!(out, "    }}");
                }
            }
        }

        if !self.includes.is_empty() {
            let _ = writeln!(out, "    includes [");
            for module in &self.includes {
                let _ = writeln!(out, "        {},", module);
            }
            let _ = writeln!(out, "    ]");
        }

        let _ = writeln!(out, "}}");
        out
    }
}

fn render_qualifiers(out: &mut String, indent: &str, qualifiers: &[Qualifier]) {
    for qualifier in qualifiers {
        if qualifier.arguments.is_empty() {
            let _ = writeln!(out, "{}@{}", indent, qualifier.name);
        } else {
            let _ = writeln!(out, "{}@{}({})", indent, qualifier.name, qualifier.arguments.join(", "));
        }
    }
}

fn render_provider(out: &mut String, indent: &str, provider: &AccessorDecl) {
    render_qualifiers(out, indent, &provider.qualifiers);
    let _ = writeln!(
        out,
        "{}{}(): {} = {}",
        indent, provider.name, provider.bound_type, provider.concrete_type
    );
}

/// Container synthesizer over one scope's resolved set
pub struct ContainerSynthesizer<'a> {
    resolved: &'a ResolvedScope,
}

impl<'a> ContainerSynthesizer<'a> {
    /// Create a synthesizer for a resolved scope
    pub fn new(resolved: &'a ResolvedScope) -> Self {
        Self { resolved }
    }

    /// Synthesize the container declaration for one merge target.
    ///
    /// Every target sharing the scope sees the same resolved set; only the
    /// container name differs.
    pub fn synthesize(&self, target: &MergeTarget) -> ContainerDecl {
        let mut accessors = Vec::new();
        let mut providers = Vec::new();

        for record in self.resolved.bindings.iter().chain(self.resolved.multibindings.iter()) {
            let accessor = AccessorDecl::from_record(record);
            match accessor.style {
                AccessorStyle::Binding => accessors.push(accessor),
                AccessorStyle::Provider => providers.push(accessor),
            }
        }

        accessors.sort_by(|a, b| a.name.cmp(&b.name));
        providers.sort_by(|a, b| a.name.cmp(&b.name));

        let shape = if accessors.is_empty() {
            ContainerShape::ValueHolder
        } else {
            ContainerShape::Abstract
        };

        let mut includes: Vec<TypeIdentity> = self
            .resolved
            .modules
            .iter()
            .map(|module| module.module_type.clone())
            .collect();
        includes.sort();

        ContainerDecl {
            name: target.container_name(),
            scope: self.resolved.scope.clone(),
            shape,
            accessors,
            providers,
            includes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contribution::ContributedModule;
    use std::path::Path;

    fn identity(s: &str) -> TypeIdentity {
        TypeIdentity::parse(s).unwrap()
    }

    fn record(concrete: &str, multibinding: bool, object_instance: bool) -> ContributionRecord {
        ContributionRecord {
            concrete_type: identity(concrete),
            bound_type: identity("com.example.Iface"),
            scope: identity("S"),
            is_multibinding: multibinding,
            qualifiers: vec![],
            replaces: vec![],
            is_object_instance: object_instance,
            is_module_shaped: false,
            supertypes: vec![identity("com.example.Iface")],
        }
    }

    fn resolved(
        bindings: Vec<ContributionRecord>,
        multibindings: Vec<ContributionRecord>,
        modules: Vec<ContributedModule>,
    ) -> ResolvedScope {
        ResolvedScope {
            scope: identity("S"),
            bindings,
            multibindings,
            modules,
            diagnostics: vec![],
        }
    }

    fn target() -> MergeTarget {
        MergeTarget::new(identity("S"), identity("com.app.AppComponent"), vec![], Path::new("out"))
    }

    #[test]
    fn test_accessor_name_derivation() {
        assert_eq!(
            accessor_name(&record("com.example.Impl", false, false)),
            "bindComExampleImpl"
        );
        assert_eq!(
            accessor_name(&record("com.example.Impl", true, false)),
            "bindComExampleImplMultibinding"
        );
        assert_eq!(
            accessor_name(&record("com.example.Settings", false, true)),
            "provideComExampleSettings"
        );
    }

    #[test]
    fn test_same_simple_name_does_not_collide() {
        let a = accessor_name(&record("com.first.Impl", false, false));
        let b = accessor_name(&record("com.second.Impl", false, false));
        assert_ne!(a, b);
    }

    #[test]
    fn test_multibinding_suffix_disambiguates() {
        // Scenario D: same concrete type as plain binding and multibinding
        let resolved = resolved(
            vec![record("com.example.Impl", false, false)],
            vec![record("com.example.Impl", true, false)],
            vec![],
        );
        let container = ContainerSynthesizer::new(&resolved).synthesize(&target());

        let names: Vec<&str> = container.accessors.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["bindComExampleImpl", "bindComExampleImplMultibinding"]);
    }

    #[test]
    fn test_abstract_shape_with_companion_providers() {
        let resolved = resolved(
            vec![
                record("com.example.Impl", false, false),
                record("com.example.Defaults", false, true),
            ],
            vec![],
            vec![],
        );
        let container = ContainerSynthesizer::new(&resolved).synthesize(&target());

        assert_eq!(container.shape, ContainerShape::Abstract);
        assert_eq!(container.accessors.len(), 1);
        assert_eq!(container.providers.len(), 1);

        let text = container.render();
        assert!(text.contains("abstract container AppComponentMergedContainer"));
        assert!(text.contains("abstract bindComExampleImpl(impl: com.example.Impl): com.example.Iface"));
        assert!(text.contains("companion {"));
        assert!(text.contains("provideComExampleDefaults(): com.example.Iface = com.example.Defaults"));
    }

    #[test]
    fn test_value_holder_shape_without_bindings() {
        let resolved = resolved(vec![record("com.example.Defaults", false, true)], vec![], vec![]);
        let container = ContainerSynthesizer::new(&resolved).synthesize(&target());

        assert_eq!(container.shape, ContainerShape::ValueHolder);
        let text = container.render();
        assert!(text.contains("container object AppComponentMergedContainer"));
        assert!(!text.contains("companion"));
    }

    #[test]
    fn test_container_is_tagged_with_scope() {
        let resolved = resolved(vec![record("com.example.Impl", false, false)], vec![], vec![]);
        let text = ContainerSynthesizer::new(&resolved).synthesize(&target()).render();
        assert!(text.contains("@MergedIn(scope = S)"));
    }

    #[test]
    fn test_qualifiers_carried_forward() {
        let mut with_qualifier = record("com.example.Impl", false, false);
        with_qualifier.qualifiers = vec![Qualifier {
            name: identity("com.example.Named"),
            arguments: vec!["\"api\"".to_string()],
        }];
        let resolved = resolved(vec![with_qualifier], vec![], vec![]);
        let text = ContainerSynthesizer::new(&resolved).synthesize(&target()).render();
        assert!(text.contains("@com.example.Named(\"api\")"));
    }

    #[test]
    fn test_surviving_modules_are_included() {
        let resolved = resolved(
            vec![record("com.example.Impl", false, false)],
            vec![],
            vec![ContributedModule {
                module_type: identity("com.example.NetModule"),
                scope: identity("S"),
                replaces: vec![],
                is_interface_like: false,
            }],
        );
        let text = ContainerSynthesizer::new(&resolved).synthesize(&target()).render();
        assert!(text.contains("includes ["));
        assert!(text.contains("com.example.NetModule,"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let resolved = resolved(
            vec![
                record("com.example.B", false, false),
                record("com.example.A", false, false),
            ],
            vec![],
            vec![],
        );
        let synthesizer = ContainerSynthesizer::new(&resolved);
        assert_eq!(
            synthesizer.synthesize(&target()).render(),
            synthesizer.synthesize(&target()).render()
        );
    }
}
