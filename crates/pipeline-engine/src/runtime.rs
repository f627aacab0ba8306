// Archivo: runtime.rs
// Propósito: contrato de persistencia de progreso y estados terminales
// de acciones, consumido por los engines durante la ejecución.
use crate::errors::EngineError;
use control::{ControlError, ControlRepository};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use uuid::Uuid;

/// Frontera por la que los engines reportan avance y cierre de acciones.
///
/// Todas las escrituras son idempotentes y seguras de reemitir: un
/// reporte de progreso posterior nunca disminuye la fracción persistida.
pub trait ActionRuntime: Send + Sync {
    /// Persiste un avance (`fraction` en [0,1]) y, opcionalmente, funde
    /// metadatos nuevos en `Action.extra_data`.
    fn report_progress(&self, action_id: &Uuid, fraction: f64, extra_data: Option<JsonValue>)
        -> Result<(), EngineError>;

    /// Cierra la acción con éxito (progreso exactamente 1).
    fn complete(&self, action_id: &Uuid) -> Result<(), EngineError>;

    /// Cierra la acción como fallada con el diagnóstico completo.
    fn fail(&self, action_id: &Uuid, message: &str) -> Result<(), EngineError>;
}

/// Implementación respaldada por el repositorio del plano de control.
pub struct RepoActionRuntime {
    repo: Arc<dyn ControlRepository>,
}

impl RepoActionRuntime {
    pub fn new(repo: Arc<dyn ControlRepository>) -> Self {
        Self { repo }
    }

    fn load(&self, action_id: &Uuid) -> Result<pipeline_domain::Action, EngineError> {
        self.repo
            .get_action(action_id)?
            .ok_or_else(|| EngineError::Control(ControlError::NotFound(format!("acción {}", action_id))))
    }
}

impl ActionRuntime for RepoActionRuntime {
    fn report_progress(&self, action_id: &Uuid, fraction: f64, extra_data: Option<JsonValue>)
        -> Result<(), EngineError> {
        let mut action = self.load(action_id)?;
        action.report_progress(fraction)?;
        if let Some(extra) = extra_data {
            action.merge_extra_data(extra);
        }
        self.repo.save_action(action)?;
        Ok(())
    }

    fn complete(&self, action_id: &Uuid) -> Result<(), EngineError> {
        let mut action = self.load(action_id)?;
        action.complete();
        self.repo.save_action(action)?;
        Ok(())
    }

    fn fail(&self, action_id: &Uuid, message: &str) -> Result<(), EngineError> {
        let mut action = self.load(action_id)?;
        action.fail(message);
        self.repo.save_action(action)?;
        Ok(())
    }
}
