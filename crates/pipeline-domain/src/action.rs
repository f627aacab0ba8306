// action.rs
use crate::DomainError;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionState {
  Pending,
  Running,
  Completed,
  Failed,
}

impl fmt::Display for ActionState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      ActionState::Pending => "PENDING",
      ActionState::Running => "RUNNING",
      ActionState::Completed => "COMPLETED",
      ActionState::Failed => "FAILED",
    };
    write!(f, "{}", s)
  }
}

/// Unidad de trabajo dentro de una instancia, ejecutada por un engine
/// concreto. El progreso es una fracción en [0,1] monótona no
/// decreciente; llega exactamente a 1 sólo al completarse con éxito (o
/// inmediatamente tras planificar en modo dry-run).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
  pub id: Uuid,
  pub workflow_instance_id: Uuid,
  pub engine_name: String,
  pub name: String,
  /// Parámetros específicos del engine, en orden de inserción.
  pub args: IndexMap<String, JsonValue>,
  pub progress: f64,
  /// Metadatos generados (por ejemplo el plan completo bajo dry-run).
  pub extra_data: JsonValue,
  pub state: ActionState,
  pub error_message: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Action {
  pub fn new(workflow_instance_id: Uuid,
             engine_name: impl Into<String>,
             name: impl Into<String>,
             args: IndexMap<String, JsonValue>)
             -> Self {
    let now = Utc::now();
    Self { id: Uuid::new_v4(),
           workflow_instance_id,
           engine_name: engine_name.into(),
           name: name.into(),
           args,
           progress: 0.0,
           extra_data: JsonValue::Null,
           state: ActionState::Pending,
           error_message: None,
           created_at: now,
           updated_at: now }
  }

  /// Lee un argumento obligatorio como string.
  pub fn require_arg(&self, key: &str) -> Result<&str, DomainError> {
    self.args
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| DomainError::ValidationError(format!("Falta el argumento obligatorio '{}'", key)))
  }

  /// Registra un avance de progreso. La escritura es idempotente y
  /// monótona: un reporte posterior nunca disminuye el progreso; un valor
  /// fuera de [0,1] es un error de validación.
  pub fn report_progress(&mut self, fraction: f64) -> Result<(), DomainError> {
    if !(0.0..=1.0).contains(&fraction) {
      return Err(DomainError::ValidationError(format!("El progreso debe estar en [0,1]: {}", fraction)));
    }
    if fraction > self.progress {
      self.progress = fraction;
    }
    if self.state == ActionState::Pending {
      self.state = ActionState::Running;
    }
    self.updated_at = Utc::now();
    Ok(())
  }

  /// Funde claves nuevas dentro de `extra_data` (crea el objeto si hace
  /// falta). Las claves existentes se sobreescriben.
  pub fn merge_extra_data(&mut self, extra: JsonValue) {
    match (&mut self.extra_data, extra) {
      (JsonValue::Object(current), JsonValue::Object(incoming)) => {
        for (k, v) in incoming {
          current.insert(k, v);
        }
      }
      (slot, incoming) => *slot = incoming,
    }
    self.updated_at = Utc::now();
  }

  /// Marca la acción como terminada con éxito (progreso exactamente 1).
  pub fn complete(&mut self) {
    self.progress = 1.0;
    self.state = ActionState::Completed;
    self.error_message = None;
    self.updated_at = Utc::now();
  }

  /// Marca la acción como fallada con el diagnóstico completo.
  pub fn fail(&mut self, message: impl Into<String>) {
    self.state = ActionState::Failed;
    self.error_message = Some(message.into());
    self.updated_at = Utc::now();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn sample_action() -> Action {
    let mut args = IndexMap::new();
    args.insert("source_path".to_string(), json!("/a/b"));
    Action::new(Uuid::new_v4(), "tier-copy", "copy", args)
  }

  #[test]
  fn progress_is_monotonic() -> Result<(), DomainError> {
    let mut action = sample_action();
    action.report_progress(0.5)?;
    assert_eq!(action.progress, 0.5);
    assert_eq!(action.state, ActionState::Running);
    // a lower report must not decrease progress
    action.report_progress(0.2)?;
    assert_eq!(action.progress, 0.5);
    action.report_progress(0.9)?;
    assert_eq!(action.progress, 0.9);
    Ok(())
  }

  #[test]
  fn out_of_range_progress_is_rejected() {
    let mut action = sample_action();
    assert!(action.report_progress(1.5).is_err());
    assert!(action.report_progress(-0.1).is_err());
    assert_eq!(action.progress, 0.0);
  }

  #[test]
  fn merge_extra_data_keeps_existing_keys() {
    let mut action = sample_action();
    action.merge_extra_data(json!({"a": 1}));
    action.merge_extra_data(json!({"b": 2}));
    assert_eq!(action.extra_data, json!({"a": 1, "b": 2}));
  }

  #[test]
  fn require_arg_reports_missing_key() {
    let action = sample_action();
    assert_eq!(action.require_arg("source_path").unwrap(), "/a/b");
    assert!(action.require_arg("destination_path").is_err());
  }
}
