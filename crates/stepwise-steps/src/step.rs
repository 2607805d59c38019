//! `ProvisionStep`: a configured step definition bound to its collaborators.

use stepwise_config::{RunConfig, StepDefinition};
use stepwise_contracts::{
    error::{StepwiseError, StepwiseResult},
    step::Precondition,
};
use stepwise_core::{
    traits::{Step, StepContext},
    StepRegistry,
};
use tracing::debug;

use crate::actions::{self, Collaborators};

/// A step built from one `[[steps]]` entry.
pub struct ProvisionStep {
    definition: StepDefinition,
    collaborators: Collaborators,
}

impl ProvisionStep {
    pub fn new(definition: StepDefinition, collaborators: Collaborators) -> Self {
        Self {
            definition,
            collaborators,
        }
    }

    pub fn definition(&self) -> &StepDefinition {
        &self.definition
    }
}

impl Step for ProvisionStep {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn description(&self) -> &str {
        &self.definition.description
    }

    fn required(&self) -> bool {
        self.definition.required
    }

    fn tags(&self) -> &[String] {
        &self.definition.tags
    }

    /// `unless_command` short-circuits before the kind's own check.
    fn check(&self, ctx: &StepContext<'_>) -> StepwiseResult<Precondition> {
        if let Some(program) = &self.definition.unless_command {
            if let Ok(found) = which::which(program) {
                ctx.sink.info(&format!(
                    "[{}] '{}' found at {}",
                    self.definition.name,
                    program,
                    found.display()
                ));
                return Ok(Precondition::AlreadySatisfied);
            }
            debug!(step = %self.definition.name, program = %program, "command not on PATH");
        }
        actions::check(&self.definition.action, &self.collaborators)
    }

    fn apply(&self, ctx: &StepContext<'_>) -> StepwiseResult<()> {
        ctx.sink.info(&format!(
            "[{}] {} {}",
            self.definition.name,
            self.definition.action.label(),
            self.definition.action.target()
        ));
        actions::apply(&self.definition.action, &self.collaborators)
            .map_err(|e| StepwiseError::step_failed(&self.definition.name, e))
    }
}

/// Register every configured step, in file order.
///
/// Fails with `DuplicateStepName` on the first repeated name.
pub fn build_registry(config: &RunConfig, collaborators: &Collaborators) -> StepwiseResult<StepRegistry> {
    let mut registry = StepRegistry::new();
    for definition in &config.steps {
        registry.register(Box::new(ProvisionStep::new(
            definition.clone(),
            collaborators.clone(),
        )))?;
    }
    Ok(registry)
}
