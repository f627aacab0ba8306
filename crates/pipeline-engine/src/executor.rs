// Archivo: executor.rs
// Propósito: orquestar el ciclo plan → publish → execute de una acción,
// con soporte de dry-run y reporte de progreso incremental.
use crate::errors::EngineError;
use crate::registry::EngineRegistry;
use crate::runtime::ActionRuntime;
use crate::staging::{StagingLease, StagingStore};
use crate::step::Step;
use pipeline_domain::Action;
use serde_json::json;
use std::sync::Arc;

/// Ejecutor de acciones contra el engine elegido.
///
/// Responsabilidades:
/// - Resolver el engine por `Action.engine_name` vía el registro.
/// - Adquirir el área de staging inmediatamente antes de planificar y
///   liberarla incondicionalmente (lease RAII), con o sin éxito.
/// - Bajo dry-run: registrar el plan completo en `Action.extra_data` y
///   reportar progreso 1 sin ejecutar ni publicar nada.
/// - Sin dry-run: publicar los artefactos staged y correr los pasos en
///   orden estricto, reportando fracciones intermedias de progreso.
/// - Cualquier fallo de paso se envuelve con la identidad del engine y
///   el diagnóstico completo, y se persiste como fallo terminal único de
///   la acción. No hay reintentos en esta capa: la política de retries
///   (`Workflow.retries_on_failure`) vive en el orquestador externo.
pub struct ActionExecutor {
    registry: Arc<EngineRegistry>,
    runtime: Arc<dyn ActionRuntime>,
    staging: Arc<dyn StagingStore>,
}

impl ActionExecutor {
    pub fn new(registry: Arc<EngineRegistry>, runtime: Arc<dyn ActionRuntime>, staging: Arc<dyn StagingStore>) -> Self {
        Self { registry, runtime, staging }
    }

    /// Corre la acción hasta su estado terminal. Devuelve el plan
    /// ejecutado (o inspeccionado, bajo dry-run).
    pub fn run(&self, action: &Action, dry_run: bool) -> Result<Vec<Step>, EngineError> {
        let engine = self.registry.resolve(&action.engine_name)?;
        // staging scoped to this run: acquired right before planning,
        // released by the lease drop no matter the outcome
        let lease = StagingLease::acquire(self.staging.clone())?;

        let steps = match engine.plan(action, dry_run, &lease) {
            Ok(steps) => steps,
            Err(e) => {
                let wrapped = self.wrap(engine.name(), &action.name, "plan", &e);
                self.runtime.fail(&action.id, &wrapped.to_string())?;
                return Err(wrapped);
            }
        };

        if dry_run {
            // plan inspectable, progreso 1, sin efectos externos
            let plan = serde_json::to_value(&steps)?;
            self.runtime.report_progress(&action.id, 1.0, Some(json!({ "steps": plan })))?;
            self.runtime.complete(&action.id)?;
            return Ok(steps);
        }

        if let Err(e) = lease.publish() {
            let wrapped = self.wrap(engine.name(), &action.name, "publish", &e);
            self.runtime.fail(&action.id, &wrapped.to_string())?;
            return Err(wrapped);
        }

        let total = steps.len();
        for (idx, step) in steps.iter().enumerate() {
            if let Err(e) = engine.run_step(step) {
                let context = format!("paso '{}' ({}/{})", step.name, idx + 1, total);
                let wrapped = self.wrap(engine.name(), &action.name, &context, &e);
                log::error!("{}", wrapped);
                self.runtime.fail(&action.id, &wrapped.to_string())?;
                return Err(wrapped);
            }
            let fraction = (idx + 1) as f64 / total as f64;
            self.runtime.report_progress(&action.id, fraction, None)?;
        }

        self.runtime.complete(&action.id)?;
        Ok(steps)
    }

    /// Envuelve un fallo con la identidad del engine y el contexto de
    /// diagnóstico completo (mensaje + representación de depuración).
    fn wrap(&self, engine: &str, action_name: &str, context: &str, cause: &EngineError) -> EngineError {
        EngineError::Execution { engine: engine.to_string(),
                                 message: format!("{} en acción '{}': {}\n\n{:?}", context, action_name, cause, cause) }
    }
}
