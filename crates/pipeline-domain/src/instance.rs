// instance.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Estados de una corrida (instancia) de un workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceState {
  Queued,
  Running,
  Completed,
  Failed,
}

impl InstanceState {
  /// Estados que cuentan contra la concurrencia del workflow.
  pub fn is_in_flight(&self) -> bool {
    matches!(self, InstanceState::Queued | InstanceState::Running)
  }
}

impl fmt::Display for InstanceState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      InstanceState::Queued => "QUEUED",
      InstanceState::Running => "RUNNING",
      InstanceState::Completed => "COMPLETED",
      InstanceState::Failed => "FAILED",
    };
    write!(f, "{}", s)
  }
}

/// Una ejecución concreta de un workflow. La instancia referencia a su
/// workflow (`workflow_id`) pero es propiedad de éste: borrar el workflow
/// borra sus instancias en cascada.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowInstance {
  pub id: Uuid,
  pub workflow_id: Uuid,
  pub state: InstanceState,
  /// Identificador que enlaza el trigger con la instancia en los logs.
  pub correlation_id: String,
  pub triggered_by: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl WorkflowInstance {
  /// Crea una instancia recién admitida, en estado `Queued`.
  pub fn queued(workflow_id: Uuid, correlation_id: impl Into<String>, triggered_by: impl Into<String>) -> Self {
    let now = Utc::now();
    Self { id: Uuid::new_v4(),
           workflow_id,
           state: InstanceState::Queued,
           correlation_id: correlation_id.into(),
           triggered_by: triggered_by.into(),
           created_at: now,
           updated_at: now }
  }

  /// Copia con el estado cambiado (refresca `updated_at`).
  pub fn with_state(&self, state: InstanceState) -> Self {
    let mut next = self.clone();
    next.state = state;
    next.updated_at = Utc::now();
    next
  }
}
