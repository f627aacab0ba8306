use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Descriptor ordenado de comando específico del engine.
///
/// Un `Step` es efímero: lo produce la planificación y lo consume la
/// ejecución. No se persiste de forma independiente; bajo dry-run el plan
/// completo queda inspectable en `Action.extra_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: Uuid,
    pub name: String,
    /// Carga específica del engine (paths, scripts, parámetros).
    pub payload: JsonValue,
    /// Acción dueña de este paso.
    pub action_id: Uuid,
    pub attempt: u32,
    pub total_attempts: u32,
}

impl Step {
    pub fn new(name: impl Into<String>, payload: JsonValue, action_id: Uuid, attempt: u32, total_attempts: u32) -> Self {
        Self { id: Uuid::new_v4(), name: name.into(), payload, action_id, attempt, total_attempts }
    }
}
