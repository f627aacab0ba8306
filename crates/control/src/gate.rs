// Archivo: gate.rs
// Propósito: implementar la compuerta de concurrencia que decide si un
// trigger se admite o se rechaza según las instancias en vuelo.
use crate::errors::{ControlError, Result};
use crate::repository::ControlRepository;
use pipeline_domain::{InstanceState, Workflow, WorkflowState};
use std::sync::Arc;

/// Estados que cuentan contra el límite de concurrencia.
pub const IN_FLIGHT_STATES: [InstanceState; 2] = [InstanceState::Queued, InstanceState::Running];

/// Compuerta de admisión por workflow.
///
/// No hay locks en proceso protegiendo esta decisión: la corrección
/// depende de que la lectura del conteo en el repositorio sea
/// razonablemente actual. Triggers casi simultáneos para el mismo
/// workflow pueden sobre-admitir; el límite es consultivo.
pub struct ConcurrencyGate {
    repo: Arc<dyn ControlRepository>,
}

impl ConcurrencyGate {
    pub fn new(repo: Arc<dyn ControlRepository>) -> Self {
        Self { repo }
    }

    /// Admite o rechaza un trigger para `workflow`.
    ///
    /// - Si el workflow no está `Active`, falla con `Validation`.
    /// - Si las instancias en {QUEUED, RUNNING} ya alcanzan la
    ///   concurrencia configurada, falla con `ConcurrencyExceeded`
    ///   llevando el límite.
    pub fn admit(&self, workflow: &Workflow) -> Result<()> {
        if workflow.state != WorkflowState::Active {
            return Err(ControlError::Validation(format!(
                "El workflow debe estar {} para dispararse; estado actual: {}",
                WorkflowState::Active,
                workflow.state
            )));
        }
        let in_flight = self.repo.count_instances_in(&workflow.id, &IN_FLIGHT_STATES)?;
        if in_flight >= workflow.concurrency as usize {
            return Err(ControlError::ConcurrencyExceeded { limit: workflow.concurrency });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_flight_states_agree_with_the_predicate() {
        let all = [InstanceState::Queued, InstanceState::Running, InstanceState::Completed, InstanceState::Failed];
        for state in all {
            assert_eq!(IN_FLIGHT_STATES.contains(&state), state.is_in_flight());
        }
    }
}
