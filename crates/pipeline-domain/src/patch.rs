// patch.rs
use crate::{DomainError, Workflow, WorkflowStateMachine};
use json_patch::Patch;

/// Aplica un documento de parche RFC 6902 sobre un workflow.
///
/// Flujo: decode → apply (todo-o-nada) → re-encode → revalidación por la
/// `WorkflowStateMachine`. Si cualquier operación del parche falla (un
/// `test` que no coincide, un path inexistente para remove/replace) el
/// parche completo se aborta y el entity original queda intacto; nunca se
/// escribe estado intermedio.
pub struct PartialUpdateApplier;

impl PartialUpdateApplier {
  /// Devuelve la copia parcheada y saneada, lista para persistir. El
  /// `original` no se muta en ningún caso.
  pub fn apply(original: &Workflow, patch: &Patch) -> Result<Workflow, DomainError> {
    let mut doc = serde_json::to_value(original)?;
    // `json_patch::patch` es atómico: ante un fallo el documento queda
    // sin tocar, así que no hay estado parcial que limpiar.
    json_patch::patch(&mut doc, patch)?;
    let updated: Workflow = serde_json::from_value(doc)?;
    WorkflowStateMachine::apply_update(original, &updated)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{Datastore, DatastoreState, WorkflowDraft, WorkflowState};
  use serde_json::json;

  fn stored_workflow() -> Workflow {
    let ds = Datastore::new("warehouse", "tier-copy", DatastoreState::Templated, json!({}));
    let draft = WorkflowDraft { name: "nightly".into(),
                                concurrency: Some(2),
                                tags: vec!["etl".into()],
                                ..Default::default() };
    Workflow::for_datastore(draft, &ds).unwrap()
  }

  fn parse_patch(value: serde_json::Value) -> Patch {
    serde_json::from_value(value).unwrap()
  }

  #[test]
  fn replace_and_add_operations_apply() -> Result<(), DomainError> {
    let original = stored_workflow();
    let patch = parse_patch(json!([
      {"op": "replace", "path": "/name", "value": "nightly-v2"},
      {"op": "replace", "path": "/state", "value": "INACTIVE"},
      {"op": "add", "path": "/tags/-", "value": "daily"}
    ]));
    let patched = PartialUpdateApplier::apply(&original, &patch)?;
    assert_eq!(patched.name, "nightly-v2");
    assert_eq!(patched.state, WorkflowState::Inactive);
    assert_eq!(patched.tags, vec!["etl".to_string(), "daily".to_string()]);
    Ok(())
  }

  #[test]
  fn failing_test_op_aborts_the_whole_patch() {
    let original = stored_workflow();
    let patch = parse_patch(json!([
      {"op": "replace", "path": "/name", "value": "should-not-stick"},
      {"op": "test", "path": "/state", "value": "INACTIVE"}
    ]));
    let err = PartialUpdateApplier::apply(&original, &patch).unwrap_err();
    assert!(matches!(err, DomainError::PatchError(_)));
    // the stored entity is untouched
    assert_eq!(original.name, "nightly");
    assert_eq!(original.state, WorkflowState::Active);
  }

  #[test]
  fn missing_path_aborts_the_whole_patch() {
    let original = stored_workflow();
    let patch = parse_patch(json!([
      {"op": "remove", "path": "/tags/9"}
    ]));
    assert!(matches!(PartialUpdateApplier::apply(&original, &patch), Err(DomainError::PatchError(_))));
  }

  #[test]
  fn patch_cannot_move_immutable_fields() -> Result<(), DomainError> {
    let original = stored_workflow();
    let patch = parse_patch(json!([
      {"op": "replace", "path": "/engine_name", "value": "other-engine"},
      {"op": "replace", "path": "/name", "value": "renamed"}
    ]));
    // the patch applies over the decoded document, but the whitelist
    // rederives engine_name from the stored entity
    let patched = PartialUpdateApplier::apply(&original, &patch)?;
    assert_eq!(patched.engine_name, original.engine_name);
    assert_eq!(patched.name, "renamed");
    Ok(())
  }

  #[test]
  fn patched_result_goes_through_validation() {
    let original = stored_workflow();
    let patch = parse_patch(json!([
      {"op": "replace", "path": "/concurrency", "value": 0}
    ]));
    assert!(matches!(PartialUpdateApplier::apply(&original, &patch), Err(DomainError::ValidationError(_))));
  }
}
