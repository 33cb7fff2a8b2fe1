//! Conflict Resolver - per-scope surviving-set computation
//!
//! Resolution algorithm, order-independent by construction:
//! 1. Union every `replaces` set declared by a module (or module-shaped
//!    contribution) attached to the scope
//! 2. Union every `replaces` set declared by any contribution in the scope
//! 3. Candidates = contributions whose scope matches the scope under
//!    resolution
//! 4. Survivors = candidates minus both replacement unions minus the scope's
//!    explicit excludes; removal is OR'd and monotonic, so there is no
//!    precedence ordering to resolve
//! 5. Surviving records that violate the subtype invariant or carry a
//!    parameterized bound type produce per-declaration diagnostics and are
//!    withheld from emission; other declarations proceed

use crate::contribution::{ContributedModule, ContributionRecord};
use crate::ident::TypeIdentity;
use crate::registry::ScopeSnapshot;
use std::collections::HashSet;
use std::fmt;

/// A per-declaration resolution failure.
///
/// Carried as data, not as `Err`: one bad declaration aborts generation for
/// that declaration only, while the rest of the scope proceeds. The host
/// surfaces these as compilation failures.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Diagnostic {
    /// The offending declaration
    pub declaration: TypeIdentity,
    /// The scope being resolved when the failure was detected
    pub scope: TypeIdentity,
    /// Human-readable message
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.declaration, self.message)
    }
}

/// The final surviving set for one scope, ready for synthesis.
///
/// Computed once per scope and shared by every merge target registered for
/// it. All lists are sorted by type identity so emission is byte-stable
/// regardless of scan order.
#[derive(Debug, Clone)]
pub struct ResolvedScope {
    /// The scope this set was resolved for
    pub scope: TypeIdentity,
    /// Surviving plain bindings
    pub bindings: Vec<ContributionRecord>,
    /// Surviving multibindings
    pub multibindings: Vec<ContributionRecord>,
    /// Surviving contributed modules
    pub modules: Vec<ContributedModule>,
    /// Per-declaration failures detected during resolution
    pub diagnostics: Vec<Diagnostic>,
}

impl ResolvedScope {
    /// Whether resolution completed without per-declaration failures
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Conflict resolver over one scope's snapshot
pub struct ConflictResolver<'a> {
    snapshot: &'a ScopeSnapshot<'a>,
}

impl<'a> ConflictResolver<'a> {
    /// Create a resolver for a scope snapshot
    pub fn new(snapshot: &'a ScopeSnapshot<'a>) -> Self {
        Self { snapshot }
    }

    /// Compute the final surviving set for the scope.
    pub fn resolve(&self) -> ResolvedScope {
        let contributions: Vec<&ContributionRecord> = self
            .snapshot
            .bindings
            .iter()
            .chain(self.snapshot.multibindings.iter())
            .copied()
            .collect();

        // Step 1: replaces declared by modules or module-shaped contributions
        let mut replaced_by_modules: HashSet<&TypeIdentity> = self
            .snapshot
            .modules
            .iter()
            .flat_map(|module| module.replaces.iter())
            .collect();
        replaced_by_modules.extend(
            contributions
                .iter()
                .copied()
                .filter(|record| record.is_module_shaped)
                .flat_map(|record| record.replaces.iter()),
        );

        // Step 2: replaces declared by any contribution in this scope
        let replaced_by_bindings: HashSet<&TypeIdentity> = contributions
            .iter()
            .copied()
            .flat_map(|record| record.replaces.iter())
            .collect();

        let excluded: HashSet<&TypeIdentity> = self.snapshot.excludes.iter().copied().collect();

        let removed = |identity: &TypeIdentity| {
            replaced_by_modules.contains(identity)
                || replaced_by_bindings.contains(identity)
                || excluded.contains(identity)
        };

        let mut bindings = Vec::new();
        let mut multibindings = Vec::new();
        let mut diagnostics = Vec::new();

        for record in contributions {
            // Defensive re-check: a record can be globally visible but scoped
            // to a different merge
            if &record.scope != self.snapshot.scope {
                continue;
            }
            if removed(&record.concrete_type) {
                tracing::debug!(
                    concrete = %record.concrete_type,
                    scope = %record.scope,
                    "contribution dropped by replace/exclude"
                );
                continue;
            }

            if record.bound_type.is_parameterized() {
                diagnostics.push(Diagnostic {
                    declaration: record.concrete_type.clone(),
                    scope: self.snapshot.scope.clone(),
                    message: format!(
                        "bound type {} must not carry type parameters",
                        record.bound_type
                    ),
                });
                continue;
            }
            if !record.extends_bound_type() {
                diagnostics.push(Diagnostic {
                    declaration: record.concrete_type.clone(),
                    scope: self.snapshot.scope.clone(),
                    message: format!(
                        "{} does not extend its declared bound type {}",
                        record.concrete_type, record.bound_type
                    ),
                });
                continue;
            }

            if record.is_multibinding {
                multibindings.push(record.clone());
            } else {
                bindings.push(record.clone());
            }
        }

        let mut modules: Vec<ContributedModule> = self
            .snapshot
            .modules
            .iter()
            .copied()
            .filter(|module| {
                if &module.scope != self.snapshot.scope {
                    return false;
                }
                if removed(&module.module_type) {
                    tracing::debug!(
                        module = %module.module_type,
                        scope = %module.scope,
                        "module dropped by replace/exclude"
                    );
                    return false;
                }
                true
            })
            .cloned()
            .collect();

        bindings.sort_by(|a, b| a.concrete_type.cmp(&b.concrete_type));
        multibindings.sort_by(|a, b| a.concrete_type.cmp(&b.concrete_type));
        modules.sort_by(|a, b| a.module_type.cmp(&b.module_type));
        diagnostics.sort_by(|a, b| a.declaration.cmp(&b.declaration));

        ResolvedScope {
            scope: self.snapshot.scope.clone(),
            bindings,
            multibindings,
            modules,
            diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contribution::MergeTarget;
    use crate::registry::ScopeRegistry;
    use std::path::Path;

    fn identity(s: &str) -> TypeIdentity {
        TypeIdentity::parse(s).unwrap()
    }

    fn binding(concrete: &str, bound: &str, scope: &str) -> ContributionRecord {
        ContributionRecord {
            concrete_type: identity(concrete),
            bound_type: identity(bound),
            scope: identity(scope),
            is_multibinding: false,
            qualifiers: vec![],
            replaces: vec![],
            is_object_instance: false,
            is_module_shaped: false,
            supertypes: vec![identity(bound)],
        }
    }

    fn module(module_type: &str, scope: &str, replaces: &[&str]) -> ContributedModule {
        ContributedModule {
            module_type: identity(module_type),
            scope: identity(scope),
            replaces: replaces.iter().map(|r| identity(r)).collect(),
            is_interface_like: false,
        }
    }

    fn target_with_excludes(scope: &str, excludes: &[&str]) -> MergeTarget {
        MergeTarget::new(
            identity(scope),
            identity("com.app.AppComponent"),
            excludes.iter().map(|e| identity(e)).collect(),
            Path::new("out"),
        )
    }

    fn resolve(registry: &ScopeRegistry, scope: &str) -> ResolvedScope {
        let scope = identity(scope);
        let snapshot = registry.snapshot(&scope);
        ConflictResolver::new(&snapshot).resolve()
    }

    #[test]
    fn test_plain_binding_survives() {
        // Scenario A: one binding, no excludes or replaces
        let mut registry = ScopeRegistry::new();
        registry.register_merge_target(target_with_excludes("S", &[]));
        registry.record_contribution(binding("com.example.Impl", "com.example.Iface", "S"));

        let resolved = resolve(&registry, "S");
        assert!(resolved.is_clean());
        assert_eq!(resolved.bindings.len(), 1);
        assert_eq!(
            resolved.bindings[0].concrete_type.qualified_name(),
            "com.example.Impl"
        );
    }

    #[test]
    fn test_module_replaces_binding() {
        // Scenario B: a module with replaces={Impl} suppresses the binding
        let mut registry = ScopeRegistry::new();
        registry.register_merge_target(target_with_excludes("S", &[]));
        registry.record_contribution(binding("com.example.Impl", "com.example.Iface", "S"));
        registry.record_module(module("com.example.OverrideModule", "S", &["com.example.Impl"]));

        let resolved = resolve(&registry, "S");
        assert!(resolved.is_clean());
        assert!(resolved.bindings.is_empty());
        assert_eq!(resolved.modules.len(), 1);
    }

    #[test]
    fn test_merge_site_exclude() {
        // Scenario C: a merge target exclude drops the binding without any replace
        let mut registry = ScopeRegistry::new();
        registry.register_merge_target(target_with_excludes("S", &["com.example.Impl"]));
        registry.record_contribution(binding("com.example.Impl", "com.example.Iface", "S"));

        let resolved = resolve(&registry, "S");
        assert!(resolved.is_clean());
        assert!(resolved.bindings.is_empty());
    }

    #[test]
    fn test_binding_and_multibinding_coexist() {
        // Scenario D: plain binding and multibinding for the same bound type
        let mut registry = ScopeRegistry::new();
        registry.register_merge_target(target_with_excludes("S", &[]));
        registry.record_contribution(binding("com.example.Impl", "com.example.Iface", "S"));
        registry.record_contribution(ContributionRecord {
            is_multibinding: true,
            ..binding("com.example.Impl", "com.example.Iface", "S")
        });

        let resolved = resolve(&registry, "S");
        assert_eq!(resolved.bindings.len(), 1);
        assert_eq!(resolved.multibindings.len(), 1);
    }

    #[test]
    fn test_parameterized_bound_type_is_diagnosed() {
        // Scenario E: parameterized bound type fails that declaration only
        let mut registry = ScopeRegistry::new();
        registry.register_merge_target(target_with_excludes("S", &[]));
        registry.record_contribution(ContributionRecord {
            bound_type: identity("com.example.Repository<T>"),
            supertypes: vec![identity("com.example.Repository<T>")],
            ..binding("com.example.Bad", "com.example.Iface", "S")
        });
        registry.record_contribution(binding("com.example.Good", "com.example.Iface", "S"));

        let resolved = resolve(&registry, "S");
        assert_eq!(resolved.diagnostics.len(), 1);
        assert_eq!(
            resolved.diagnostics[0].declaration.qualified_name(),
            "com.example.Bad"
        );
        assert!(resolved.diagnostics[0].message.contains("Repository<T>"));
        assert_eq!(resolved.bindings.len(), 1);
        assert_eq!(
            resolved.bindings[0].concrete_type.qualified_name(),
            "com.example.Good"
        );
    }

    #[test]
    fn test_subtype_violation_is_diagnosed_not_omitted() {
        let mut registry = ScopeRegistry::new();
        registry.register_merge_target(target_with_excludes("S", &[]));
        registry.record_contribution(ContributionRecord {
            supertypes: vec![identity("com.example.Unrelated")],
            ..binding("com.example.Impl", "com.example.Iface", "S")
        });

        let resolved = resolve(&registry, "S");
        assert!(resolved.bindings.is_empty());
        assert_eq!(resolved.diagnostics.len(), 1);
        assert!(resolved.diagnostics[0].message.contains("does not extend"));
    }

    #[test]
    fn test_binding_replaces_binding() {
        let mut registry = ScopeRegistry::new();
        registry.register_merge_target(target_with_excludes("S", &[]));
        registry.record_contribution(binding("com.example.Real", "com.example.Iface", "S"));
        registry.record_contribution(ContributionRecord {
            replaces: vec![identity("com.example.Real")],
            ..binding("com.example.Fake", "com.example.Iface", "S")
        });

        let resolved = resolve(&registry, "S");
        assert_eq!(resolved.bindings.len(), 1);
        assert_eq!(
            resolved.bindings[0].concrete_type.qualified_name(),
            "com.example.Fake"
        );
    }

    #[test]
    fn test_module_shaped_contribution_replaces_like_a_module() {
        let mut registry = ScopeRegistry::new();
        registry.register_merge_target(target_with_excludes("S", &[]));
        registry.record_contribution(binding("com.example.Impl", "com.example.Iface", "S"));
        registry.record_contribution(ContributionRecord {
            is_module_shaped: true,
            replaces: vec![identity("com.example.Impl")],
            ..binding("com.example.GeneratedModule", "com.example.GeneratedModule", "S")
        });

        let resolved = resolve(&registry, "S");
        let survivors: Vec<&str> = resolved
            .bindings
            .iter()
            .map(|r| r.concrete_type.qualified_name())
            .collect();
        assert_eq!(survivors, vec!["com.example.GeneratedModule"]);
    }

    #[test]
    fn test_replaced_module_is_dropped() {
        let mut registry = ScopeRegistry::new();
        registry.register_merge_target(target_with_excludes("S", &[]));
        registry.record_module(module("com.example.RealModule", "S", &[]));
        registry.record_module(module("com.example.FakeModule", "S", &["com.example.RealModule"]));

        let resolved = resolve(&registry, "S");
        let survivors: Vec<&str> = resolved
            .modules
            .iter()
            .map(|m| m.module_type.qualified_name())
            .collect();
        assert_eq!(survivors, vec!["com.example.FakeModule"]);
    }

    #[test]
    fn test_contribution_scoped_elsewhere_is_ignored() {
        let mut registry = ScopeRegistry::new();
        registry.register_merge_target(target_with_excludes("S", &[]));
        registry.record_contribution(binding("com.example.Impl", "com.example.Iface", "Other"));

        let resolved = resolve(&registry, "S");
        assert!(resolved.bindings.is_empty());
        assert!(resolved.is_clean());
    }

    #[test]
    fn test_order_independence() {
        let records = [
            binding("com.example.A", "com.example.Iface", "S"),
            binding("com.example.B", "com.example.Iface", "S"),
            ContributionRecord {
                replaces: vec![identity("com.example.A")],
                ..binding("com.example.C", "com.example.Iface", "S")
            },
        ];

        let forward = {
            let mut registry = ScopeRegistry::new();
            registry.register_merge_target(target_with_excludes("S", &[]));
            for record in records.iter().cloned() {
                registry.record_contribution(record);
            }
            resolve(&registry, "S")
        };
        let backward = {
            let mut registry = ScopeRegistry::new();
            registry.register_merge_target(target_with_excludes("S", &[]));
            for record in records.iter().rev().cloned() {
                registry.record_contribution(record);
            }
            resolve(&registry, "S")
        };

        assert_eq!(forward.bindings, backward.bindings);
        assert_eq!(forward.multibindings, backward.multibindings);
        assert_eq!(forward.modules.len(), backward.modules.len());
    }
}
