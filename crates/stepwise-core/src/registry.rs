//! Ordered step registry and run selection.
//!
//! Registration order is execution order. The registry never reorders or
//! parallelizes; later steps may assume earlier ones already ran.

use tracing::debug;

use stepwise_contracts::error::{StepwiseError, StepwiseResult};

use crate::traits::Step;

/// An ordered collection of uniquely named steps.
#[derive(Default)]
pub struct StepRegistry {
    steps: Vec<Box<dyn Step>>,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `step` after every previously registered step.
    ///
    /// Returns `StepwiseError::DuplicateStepName` if the name is taken; the
    /// registry is left unchanged in that case.
    pub fn register(&mut self, step: Box<dyn Step>) -> StepwiseResult<()> {
        if self.get(step.name()).is_some() {
            return Err(StepwiseError::DuplicateStepName {
                name: step.name().to_string(),
            });
        }
        debug!(step = %step.name(), position = self.steps.len(), "step registered");
        self.steps.push(step);
        Ok(())
    }

    /// Return the steps matching `predicate`, in registration order.
    pub fn select<P>(&self, mut predicate: P) -> Vec<&dyn Step>
    where
        P: FnMut(&dyn Step) -> bool,
    {
        self.steps
            .iter()
            .map(|s| s.as_ref())
            .filter(|s| predicate(*s))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Step> {
        self.steps.iter().map(|s| s.as_ref()).find(|s| s.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Step> {
        self.steps.iter().map(|s| s.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.name())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// True if any registered step has `token` as its name or one of its tags.
    pub fn knows(&self, token: &str) -> bool {
        self.iter().any(|s| matches_token(s, token))
    }
}

/// `--only` / `--skip` selection by step name or tag.
///
/// An empty `only` list selects everything. `skip` always wins over `only`.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub only: Vec<String>,
    pub skip: Vec<String>,
}

impl Selection {
    /// Reject tokens that match no registered step name or tag.
    ///
    /// A typo in `--skip` would otherwise silently run the step it was meant
    /// to skip.
    pub fn validate(&self, registry: &StepRegistry) -> StepwiseResult<()> {
        let unknown: Vec<&str> = self
            .only
            .iter()
            .chain(self.skip.iter())
            .map(String::as_str)
            .filter(|token| !registry.knows(token))
            .collect();

        if unknown.is_empty() {
            Ok(())
        } else {
            Err(StepwiseError::ConfigError {
                reason: format!("unknown step name or tag: {}", unknown.join(", ")),
            })
        }
    }

    pub fn includes(&self, step: &dyn Step) -> bool {
        let wanted = self.only.is_empty() || self.only.iter().any(|t| matches_token(step, t));
        let skipped = self.skip.iter().any(|t| matches_token(step, t));
        wanted && !skipped
    }

    /// Apply this selection to `registry`.
    pub fn select<'r>(&self, registry: &'r StepRegistry) -> Vec<&'r dyn Step> {
        registry.select(|s| self.includes(s))
    }
}

fn matches_token(step: &dyn Step, token: &str) -> bool {
    step.name() == token || step.tags().iter().any(|t| t == token)
}
