// tier_copy.rs
use crate::errors::EngineError;
use crate::registry::PipelineEngine;
use crate::staging::{ObjectStore, StagingLease};
use crate::step::Step;
use once_cell::sync::Lazy;
use pipeline_domain::Action;
use serde_json::json;
use std::sync::Arc;

/// Template del script de copia que se materializa en staging. Los
/// placeholders se sustituyen al planificar cada acción.
static COPY_SCRIPT_TEMPLATE: Lazy<String> = Lazy::new(|| {
  ["#!/bin/sh",
   "# copia recursiva entre tiers de almacenamiento",
   "SRC={source}",
   "DEST={destination}",
   "ACTION_ID={action_id}",
   "copy_recursive \"$SRC\" \"$DEST\""].join("\n")
});

/// Engine ilustrativo: copia entre tiers de almacenamiento.
///
/// Planifica exactamente un paso parametrizado por el path origen, el
/// path destino, el id de la acción dueña y contadores attempt/total
/// fijos en 1/1. El script templateado se materializa en staging durante
/// la planificación; nada cruza hacia el store de objetos hasta el
/// publish, por lo que el plan bajo dry-run no deja rastro externo.
pub struct TierCopyEngine {
  objects: Arc<dyn ObjectStore>,
}

impl TierCopyEngine {
  pub const NAME: &'static str = "tier-copy";

  pub fn new(objects: Arc<dyn ObjectStore>) -> Self {
    Self { objects }
  }

  fn render_script(source: &str, destination: &str, action: &Action) -> String {
    COPY_SCRIPT_TEMPLATE.replace("{source}", source)
                        .replace("{destination}", destination)
                        .replace("{action_id}", &action.id.to_string())
  }
}

impl PipelineEngine for TierCopyEngine {
  fn name(&self) -> &str {
    Self::NAME
  }

  fn plan(&self, action: &Action, _dry_run: bool, staging: &StagingLease) -> Result<Vec<Step>, EngineError> {
    let source = action.require_arg("source_path")?;
    let destination = action.require_arg("destination_path")?;

    // el script se stagea siempre; la decisión de publicar es del caller
    let script = Self::render_script(source, destination, action);
    let script_key = staging.stage("copy_step.sh", script.as_bytes())?;

    let payload = json!({
      "source_path": source,
      "destination_path": destination,
      "script_key": script_key,
      "action_id": action.id,
    });
    Ok(vec![Step::new("copy", payload, action.id, 1, 1)])
  }

  fn run_step(&self, step: &Step) -> Result<(), EngineError> {
    let source = step.payload
                     .get("source_path")
                     .and_then(|v| v.as_str())
                     .ok_or_else(|| EngineError::MissingArgument("source_path".into()))?;
    let destination = step.payload
                          .get("destination_path")
                          .and_then(|v| v.as_str())
                          .ok_or_else(|| EngineError::MissingArgument("destination_path".into()))?;
    self.objects.copy(source, destination)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::staging::StagingStore;
  use crate::stubs::{InMemoryObjectStore, InMemoryStagingStore};
  use indexmap::IndexMap;
  use uuid::Uuid;

  fn copy_action(source: &str, destination: &str) -> Action {
    let mut args = IndexMap::new();
    args.insert("source_path".to_string(), json!(source));
    args.insert("destination_path".to_string(), json!(destination));
    Action::new(Uuid::new_v4(), TierCopyEngine::NAME, "copy", args)
  }

  #[test]
  fn plan_produces_one_step_with_fixed_attempts() -> Result<(), EngineError> {
    let objects = Arc::new(InMemoryObjectStore::new());
    let staging: Arc<dyn StagingStore> = Arc::new(InMemoryStagingStore::new(objects.clone()));
    let engine = TierCopyEngine::new(objects);

    let action = copy_action("/a/b", "s3://x/y");
    let lease = StagingLease::acquire(staging)?;
    let steps = engine.plan(&action, true, &lease)?;

    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].attempt, 1);
    assert_eq!(steps[0].total_attempts, 1);
    assert_eq!(steps[0].action_id, action.id);
    assert_eq!(steps[0].payload["source_path"], json!("/a/b"));
    assert_eq!(steps[0].payload["destination_path"], json!("s3://x/y"));
    Ok(())
  }

  #[test]
  fn plan_without_required_args_fails() -> Result<(), EngineError> {
    let objects = Arc::new(InMemoryObjectStore::new());
    let staging: Arc<dyn StagingStore> = Arc::new(InMemoryStagingStore::new(objects.clone()));
    let engine = TierCopyEngine::new(objects);

    let mut args = IndexMap::new();
    args.insert("source_path".to_string(), json!("/a/b"));
    let action = Action::new(Uuid::new_v4(), TierCopyEngine::NAME, "copy", args);

    let lease = StagingLease::acquire(staging)?;
    assert!(engine.plan(&action, true, &lease).is_err());
    Ok(())
  }
}
