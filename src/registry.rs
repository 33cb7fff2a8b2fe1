//! Scope Registry - process-wide accumulation of contribution facts
//!
//! The registry is the only shared mutable state in the engine. It is owned
//! by the driver, threaded by reference into each scan pass, and grows
//! monotonically: every operation appends, nothing is ever removed or
//! mutated. Byte-identical re-registrations are absorbed, which makes
//! repeated scanning of the same inputs idempotent.

use crate::contribution::{ContributedModule, ContributionRecord, MergeTarget};
use crate::ident::TypeIdentity;
use std::collections::{HashMap, HashSet};

/// Append-only table of everything the scanner has seen so far.
#[derive(Debug, Default)]
pub struct ScopeRegistry {
    /// Merge targets per scope, in registration order
    targets: HashMap<TypeIdentity, Vec<MergeTarget>>,
    /// Aggregated explicit excludes per scope
    excludes: HashMap<TypeIdentity, HashSet<TypeIdentity>>,
    /// All plain binding contributions seen so far
    bindings: Vec<ContributionRecord>,
    /// All multibinding contributions seen so far
    multibindings: Vec<ContributionRecord>,
    /// All contributed modules seen so far
    modules: Vec<ContributedModule>,
    /// Fingerprints of already-recorded entries, for idempotent appends
    seen: HashSet<String>,
}

impl ScopeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn record_once(&mut self, fingerprint: String) -> bool {
        self.seen.insert(fingerprint)
    }

    /// Register a merge target for its scope.
    ///
    /// Returns `true` if the target is new; an identical re-registration is
    /// absorbed and returns `false`. The target's explicit excludes are
    /// folded into the scope's aggregated exclude set either way.
    pub fn register_merge_target(&mut self, target: MergeTarget) -> bool {
        let fingerprint = format!(
            "t:{}:{}:{}",
            target.scope,
            target.declaring_type,
            target.output_location.display()
        );
        self.record_excludes(&target.scope, &target.explicit_excludes);
        if !self.record_once(fingerprint) {
            return false;
        }
        self.targets.entry(target.scope.clone()).or_default().push(target);
        true
    }

    /// Fold excludes into the aggregated exclude set for a scope
    pub fn record_excludes(&mut self, scope: &TypeIdentity, excludes: &[TypeIdentity]) {
        if excludes.is_empty() {
            return;
        }
        self.excludes
            .entry(scope.clone())
            .or_default()
            .extend(excludes.iter().cloned());
    }

    /// Record a contribution.
    ///
    /// Returns `true` if the record is new for this registry.
    pub fn record_contribution(&mut self, record: ContributionRecord) -> bool {
        let fingerprint = format!(
            "c:{}",
            serde_json::to_string(&record).unwrap_or_default()
        );
        if !self.record_once(fingerprint) {
            return false;
        }
        if record.is_multibinding {
            self.multibindings.push(record);
        } else {
            self.bindings.push(record);
        }
        true
    }

    /// Record a contributed module.
    ///
    /// Returns `true` if the module is new for this registry.
    pub fn record_module(&mut self, module: ContributedModule) -> bool {
        let fingerprint = format!(
            "m:{}",
            serde_json::to_string(&module).unwrap_or_default()
        );
        if !self.record_once(fingerprint) {
            return false;
        }
        self.modules.push(module);
        true
    }

    /// Every scope with at least one merge target, in deterministic order
    pub fn scopes(&self) -> Vec<&TypeIdentity> {
        let mut scopes: Vec<&TypeIdentity> = self.targets.keys().collect();
        scopes.sort();
        scopes
    }

    /// Immutable per-scope view for the conflict resolver.
    ///
    /// Contributions and modules are filtered to the scope; excludes are the
    /// union across every merge target registered for it.
    pub fn snapshot<'a>(&'a self, scope: &'a TypeIdentity) -> ScopeSnapshot<'a> {
        let mut excludes: Vec<&TypeIdentity> =
            self.excludes.get(scope).map(|set| set.iter().collect()).unwrap_or_default();
        excludes.sort();

        ScopeSnapshot {
            scope,
            bindings: self.bindings.iter().filter(|r| &r.scope == scope).collect(),
            multibindings: self.multibindings.iter().filter(|r| &r.scope == scope).collect(),
            modules: self.modules.iter().filter(|m| &m.scope == scope).collect(),
            excludes,
            targets: self
                .targets
                .get(scope)
                .map(|targets| targets.as_slice())
                .unwrap_or(&[]),
        }
    }

    /// Get statistics about the registry
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            scopes: self.targets.len(),
            merge_targets: self.targets.values().map(|v| v.len()).sum(),
            bindings: self.bindings.len(),
            multibindings: self.multibindings.len(),
            modules: self.modules.len(),
        }
    }
}

/// Read-only state a conflict resolution pass runs over.
#[derive(Debug)]
pub struct ScopeSnapshot<'a> {
    /// The scope under resolution
    pub scope: &'a TypeIdentity,
    /// Plain binding contributions recorded for this scope
    pub bindings: Vec<&'a ContributionRecord>,
    /// Multibinding contributions recorded for this scope
    pub multibindings: Vec<&'a ContributionRecord>,
    /// Modules attached to this scope
    pub modules: Vec<&'a ContributedModule>,
    /// Union of explicit excludes across the scope's merge targets, sorted
    pub excludes: Vec<&'a TypeIdentity>,
    /// Merge targets requesting containers for this scope
    pub targets: &'a [MergeTarget],
}

/// Statistics about a scope registry
#[derive(Debug, Clone)]
pub struct RegistryStats {
    pub scopes: usize,
    pub merge_targets: usize,
    pub bindings: usize,
    pub multibindings: usize,
    pub modules: usize,
}

impl std::fmt::Display for RegistryStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Scope Registry Statistics:")?;
        writeln!(f, "  Scopes: {}", self.scopes)?;
        writeln!(f, "  Merge targets: {}", self.merge_targets)?;
        writeln!(
            f,
            "  Contributions: {} (bindings: {}, multibindings: {})",
            self.bindings + self.multibindings,
            self.bindings,
            self.multibindings
        )?;
        writeln!(f, "  Modules: {}", self.modules)
    }
}
