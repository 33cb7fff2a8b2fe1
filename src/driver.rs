//! Two-Phase Driver - orchestration across scan rounds
//!
//! The driver owns the scope registry and walks a two-state machine:
//! SCANNING (initial) accepts any number of scan rounds, reserving the
//! output location of every newly discovered merge target immediately so
//! later rounds observe a stable file identity; FINALIZING (terminal) runs
//! resolution once per scope and synthesis once per target, then writes
//! final content. Out-of-order calls are protocol violations, not silent
//! no-ops.

use crate::registry::ScopeRegistry;
use crate::resolver::{ConflictResolver, Diagnostic};
use crate::scanner::{ScanSummary, Scanner, UnitInputs};
use crate::synthesizer::ContainerSynthesizer;
use crate::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// Driver states. The only legal transition is Scanning -> Finalizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Accepting scan rounds and reserving output locations
    Scanning,
    /// Resolution has run; no further rounds are accepted
    Finalizing,
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverState::Scanning => write!(f, "scanning"),
            DriverState::Finalizing => write!(f, "finalizing"),
        }
    }
}

/// One written (or up-to-date) container file
#[derive(Debug, Clone)]
pub struct EmittedContainer {
    /// Final output path
    pub path: PathBuf,
    /// False if the on-disk content already matched
    pub rewritten: bool,
}

/// Outcome of the finalize phase
#[derive(Debug, Clone, Default)]
pub struct FinalizeReport {
    /// Every container synthesized, one per merge target
    pub containers: Vec<EmittedContainer>,
    /// Per-declaration resolution failures across all scopes
    pub diagnostics: Vec<Diagnostic>,
}

impl FinalizeReport {
    /// Whether every scope resolved without per-declaration failures
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Orchestrates scanning and finalization over an exclusively owned registry.
pub struct Driver {
    state: DriverState,
    registry: ScopeRegistry,
    out_dir: PathBuf,
}

impl Driver {
    /// Create a driver rooting generated output at `out_dir`
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            state: DriverState::Scanning,
            registry: ScopeRegistry::new(),
            out_dir: out_dir.into(),
        }
    }

    /// Current state of the two-phase machine
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Read-only view of the accumulated registry
    pub fn registry(&self) -> &ScopeRegistry {
        &self.registry
    }

    /// Run one scan round over a compilation unit.
    ///
    /// Legal only while SCANNING. Output locations of merge targets first
    /// seen in this round are reserved immediately; failure to reserve is
    /// fatal to the run.
    pub fn scan_round(&mut self, inputs: &UnitInputs) -> Result<ScanSummary> {
        if self.state != DriverState::Scanning {
            return Err(Error::Protocol(format!(
                "scan round requested in {} state",
                self.state
            )));
        }

        let summary = Scanner::new(&mut self.registry, &self.out_dir).scan_unit(inputs)?;

        for path in &summary.new_target_paths {
            reserve(path)?;
            tracing::info!(path = %path.display(), "reserved container output");
        }

        Ok(summary)
    }

    /// Transition to FINALIZING, resolve every scope once, and write final
    /// container content.
    ///
    /// Called exactly once, when the host signals that no further scan
    /// rounds will occur. Containers are written for every target that can
    /// be synthesized; per-declaration diagnostics are collected in the
    /// report rather than aborting the run.
    pub fn finalize(&mut self) -> Result<FinalizeReport> {
        if self.state == DriverState::Finalizing {
            return Err(Error::Protocol(
                "finalize requested more than once".to_string(),
            ));
        }
        self.state = DriverState::Finalizing;

        let mut report = FinalizeReport::default();

        for scope in self.registry.scopes() {
            let snapshot = self.registry.snapshot(scope);
            let resolved = ConflictResolver::new(&snapshot).resolve();
            report.diagnostics.extend(resolved.diagnostics.iter().cloned());

            let synthesizer = ContainerSynthesizer::new(&resolved);
            for target in snapshot.targets {
                let container = synthesizer.synthesize(target);
                let rewritten = write_if_changed(&target.output_location, &container.render())?;
                tracing::info!(
                    scope = %scope,
                    path = %target.output_location.display(),
                    rewritten,
                    "synthesized container"
                );
                report.containers.push(EmittedContainer {
                    path: target.output_location.clone(),
                    rewritten,
                });
            }
        }

        if !report.diagnostics.is_empty() {
            tracing::warn!(
                count = report.diagnostics.len(),
                "resolution completed with failures"
            );
        }

        Ok(report)
    }
}

/// Create the reserved output file (empty) and its parent directories.
fn reserve(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::write(path, b"")?;
    }
    Ok(())
}

/// Write `contents`, skipping the filesystem when the on-disk bytes already
/// match. Returns whether a write happened.
fn write_if_changed(path: &Path, contents: &str) -> Result<bool> {
    if let Ok(existing) = std::fs::read(path) {
        if blake3::hash(&existing) == blake3::hash(contents.as_bytes()) {
            return Ok(false);
        }
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(true)
}
