// state_machine.rs
use crate::{DomainError, Workflow, WorkflowState};

/// Valida transiciones de estado y aplica la whitelist de campos
/// editables de un workflow.
///
/// Un update (reemplazo completo o parche) sólo se admite cuando el
/// estado actual es `Active` o `Inactive`. De la entrada del caller se
/// honran únicamente: name, state, concurrency, on_failure,
/// on_failure_email, on_success_email, on_started_email,
/// retries_on_failure y tags. Todo lo demás (id, datastore_id,
/// engine_name, created_at) se rederiva del entity almacenado.
pub struct WorkflowStateMachine;

impl WorkflowStateMachine {
  /// Falla con `ValidationError` nombrando los estados requeridos si el
  /// workflow no está en un estado editable.
  pub fn ensure_editable(original: &Workflow) -> Result<(), DomainError> {
    if !original.is_editable() {
      return Err(DomainError::ValidationError(format!(
        "El estado debe ser {} o {} para editar; estado actual: {}",
        WorkflowState::Active,
        WorkflowState::Inactive,
        original.state
      )));
    }
    Ok(())
  }

  /// Copia saneada: parte del entity almacenado y toma de `updated` sólo
  /// los campos de la whitelist.
  fn sanitize(original: &Workflow, updated: &Workflow) -> Workflow {
    // only allow updating fields that are editable
    let mut sanitized = original.clone();
    sanitized.name = updated.name.clone();
    sanitized.state = updated.state;
    sanitized.concurrency = updated.concurrency;
    sanitized.on_failure = updated.on_failure;
    sanitized.on_failure_email = updated.on_failure_email.clone();
    sanitized.on_success_email = updated.on_success_email.clone();
    sanitized.on_started_email = updated.on_started_email.clone();
    sanitized.retries_on_failure = updated.retries_on_failure;
    sanitized.tags = updated.tags.clone();
    sanitized.updated_at = chrono::Utc::now();
    sanitized
  }

  /// Ruta completa de actualización: precondición de estado, whitelist y
  /// revalidación con defaults. El resultado queda listo para persistir.
  pub fn apply_update(original: &Workflow, updated: &Workflow) -> Result<Workflow, DomainError> {
    Self::ensure_editable(original)?;
    Self::sanitize(original, updated).default_and_validate()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{Datastore, DatastoreState, WorkflowDraft};
  use serde_json::json;
  use uuid::Uuid;

  fn stored_workflow() -> Workflow {
    let ds = Datastore::new("warehouse", "tier-copy", DatastoreState::Templated, json!({}));
    Workflow::for_datastore(WorkflowDraft { name: "nightly".into(), concurrency: Some(2), ..Default::default() }, &ds)
      .unwrap()
  }

  #[test]
  fn whitelist_fields_are_taken_from_update() -> Result<(), DomainError> {
    let original = stored_workflow();
    let mut updated = original.clone();
    updated.name = "nightly-v2".into();
    updated.state = WorkflowState::Inactive;
    updated.concurrency = 5;
    updated.retries_on_failure = 3;
    updated.tags = vec!["etl".into()];

    let merged = WorkflowStateMachine::apply_update(&original, &updated)?;
    assert_eq!(merged.name, "nightly-v2");
    assert_eq!(merged.state, WorkflowState::Inactive);
    assert_eq!(merged.concurrency, 5);
    assert_eq!(merged.retries_on_failure, 3);
    assert_eq!(merged.tags, vec!["etl".to_string()]);
    Ok(())
  }

  #[test]
  fn immutable_fields_come_from_the_original() -> Result<(), DomainError> {
    let original = stored_workflow();
    let mut updated = original.clone();
    // a hostile update tries to move the workflow elsewhere
    updated.id = Uuid::new_v4();
    updated.datastore_id = Uuid::new_v4();
    updated.engine_name = "other-engine".into();

    let merged = WorkflowStateMachine::apply_update(&original, &updated)?;
    assert_eq!(merged.id, original.id);
    assert_eq!(merged.datastore_id, original.datastore_id);
    assert_eq!(merged.engine_name, original.engine_name);
    Ok(())
  }

  #[test]
  fn update_in_transitional_state_is_rejected() {
    let mut original = stored_workflow();
    original.state = WorkflowState::Deleting;
    let updated = original.clone();
    let err = WorkflowStateMachine::apply_update(&original, &updated).unwrap_err();
    match err {
      DomainError::ValidationError(msg) => {
        assert!(msg.contains("ACTIVE"));
        assert!(msg.contains("INACTIVE"));
      }
      other => panic!("se esperaba ValidationError, se obtuvo {:?}", other),
    }
  }

  #[test]
  fn merged_result_is_revalidated() {
    let original = stored_workflow();
    let mut updated = original.clone();
    updated.concurrency = 0;
    assert!(WorkflowStateMachine::apply_update(&original, &updated).is_err());
  }
}
