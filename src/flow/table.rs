//! The ordered list of stages an orchestrator runs.

use std::fmt;

use super::router::{AlternateStage, RouterHook};
use super::stage::{Stage, StageName};

/// One row of the stage table.
pub struct StageEntry {
    pub name: StageName,
    pub hook: RouterHook,
    stage: Box<dyn Stage>,
    alternate: Option<(AlternateStage, Box<dyn Stage>)>,
}

impl StageEntry {
    pub fn new(name: StageName, hook: RouterHook, stage: impl Stage + 'static) -> Self {
        Self {
            name,
            hook,
            stage: Box::new(stage),
            alternate: None,
        }
    }

    /// Register the implementation used when the router picks `variant`.
    pub fn with_alternate(mut self, variant: AlternateStage, stage: impl Stage + 'static) -> Self {
        self.alternate = Some((variant, Box::new(stage)));
        self
    }

    pub fn stage(&self) -> &dyn Stage {
        self.stage.as_ref()
    }

    /// The alternate registered for `variant`, if any.
    pub fn alternate(&self, variant: AlternateStage) -> Option<&dyn Stage> {
        match &self.alternate {
            Some((registered, stage)) if *registered == variant => Some(stage.as_ref()),
            _ => None,
        }
    }

    pub fn alternate_variant(&self) -> Option<AlternateStage> {
        self.alternate.as_ref().map(|(variant, _)| *variant)
    }
}

impl fmt::Debug for StageEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageEntry")
            .field("name", &self.name)
            .field("hook", &self.hook)
            .field("alternate", &self.alternate_variant())
            .finish()
    }
}

/// Stages in execution order.
///
/// The order is data: the orchestrator walks the entries front to back and
/// never reorders them.
#[derive(Debug, Default)]
pub struct StageTable {
    entries: Vec<StageEntry>,
}

impl StageTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(mut self, entry: StageEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Build the four-stage pipeline with its standard router hooks.
    pub fn canonical(
        discovery: impl Stage + 'static,
        security: impl Stage + 'static,
        documentation: impl Stage + 'static,
        security_report: impl Stage + 'static,
        sdk_generation: impl Stage + 'static,
    ) -> Self {
        Self::new()
            .push(StageEntry::new(
                StageName::Discovery,
                RouterHook::Always,
                discovery,
            ))
            .push(StageEntry::new(
                StageName::Security,
                RouterHook::SkipWhenNothingDiscovered,
                security,
            ))
            .push(
                StageEntry::new(
                    StageName::Documentation,
                    RouterHook::BranchOnCriticalIssues,
                    documentation,
                )
                .with_alternate(AlternateStage::GenerateSecurityReport, security_report),
            )
            .push(StageEntry::new(
                StageName::SdkGeneration,
                RouterHook::Always,
                sdk_generation,
            ))
    }

    pub fn entries(&self) -> &[StageEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
