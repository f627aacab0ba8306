// Archivo: dispatch.rs
// Propósito: definir el mensaje de trigger y el contrato de despacho
// asíncrono (`TriggerDispatcher`). El encolado es fire-and-forget: la
// creación de la instancia ocurre después, fuera de esta llamada.
use crate::errors::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Mensaje que viaja del trigger admitido hacia el subsistema que
/// materializa la instancia. El `correlation_id` enlaza el request con la
/// instancia resultante en los logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerMessage {
    pub workflow_id: Uuid,
    /// uuid v4 en forma hex simple; resistente a colisiones dentro del
    /// alcance operacional, no único globalmente a perpetuidad.
    pub correlation_id: String,
    pub triggered_by: String,
    pub requested_at: DateTime<Utc>,
}

impl TriggerMessage {
    /// Acuña un mensaje nuevo con correlation id fresco.
    pub fn mint(workflow_id: Uuid, triggered_by: impl Into<String>) -> Self {
        Self { workflow_id,
               correlation_id: Uuid::new_v4().simple().to_string(),
               triggered_by: triggered_by.into(),
               requested_at: Utc::now() }
    }
}

/// Acuse devuelto al caller inmediatamente tras encolar el trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerAck {
    pub workflow_id: Uuid,
    pub correlation_id: String,
}

/// Contrato de despacho asíncrono de triggers.
///
/// `submit` entrega el mensaje y retorna sin esperar a que nadie lo
/// consuma. Las implementaciones concretas pueden respaldarse en una cola
/// en memoria, un broker externo, etc.
#[async_trait]
pub trait TriggerDispatcher: Send + Sync {
    async fn submit(&self, message: TriggerMessage) -> Result<()>;
}
