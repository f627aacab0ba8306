// Archivo: executor_copy.rs
// Propósito: pruebas de integración del ciclo plan → publish → execute
// sobre el engine de copia, con repositorio y stores en memoria.
use control::stubs::InMemoryControlRepository;
use control::ControlRepository;
use indexmap::IndexMap;
use pipeline_domain::{Action, ActionState};
use pipeline_engine::{ActionExecutor, ActionRuntime, EngineError, EngineRegistry, InMemoryObjectStore,
                      InMemoryStagingStore, ObjectStore, RepoActionRuntime, StagingStore, TierCopyEngine};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

struct Harness {
    repo: Arc<InMemoryControlRepository>,
    objects: Arc<InMemoryObjectStore>,
    staging: Arc<InMemoryStagingStore>,
    runtime: Arc<RepoActionRuntime>,
    executor: ActionExecutor,
}

fn harness() -> Harness {
    let repo = Arc::new(InMemoryControlRepository::new());
    let objects = Arc::new(InMemoryObjectStore::new());
    let staging = Arc::new(InMemoryStagingStore::new(objects.clone()));

    let registry = Arc::new(EngineRegistry::new());
    registry.register(Arc::new(TierCopyEngine::new(objects.clone())));

    let runtime = Arc::new(RepoActionRuntime::new(repo.clone()));
    let executor = ActionExecutor::new(registry, runtime.clone(), staging.clone() as Arc<dyn StagingStore>);
    Harness { repo, objects, staging, runtime, executor }
}

fn copy_action(source: &str, destination: &str) -> Action {
    let mut args = IndexMap::new();
    args.insert("source_path".to_string(), json!(source));
    args.insert("destination_path".to_string(), json!(destination));
    Action::new(Uuid::new_v4(), TierCopyEngine::NAME, "copy", args)
}

#[test]
fn dry_run_records_plan_without_side_effects() -> Result<(), EngineError> {
    let h = harness();
    let action = h.repo.save_action(copy_action("src/data/", "dest/data/"))?;

    let steps = h.executor.run(&action, true)?;
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].attempt, 1);
    assert_eq!(steps[0].total_attempts, 1);

    let stored = h.repo.get_action(&action.id)?.unwrap();
    assert_eq!(stored.state, ActionState::Completed);
    assert_eq!(stored.progress, 1.0);
    let plan = stored.extra_data.get("steps").and_then(|v| v.as_array()).unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0]["name"], json!("copy"));

    // nada cruzó hacia el store de objetos: ni copia ni script publicado
    assert!(h.objects.list("dest/").unwrap().is_empty());
    assert!(h.objects.list("steps/").unwrap().is_empty());
    // el área de staging se liberó al terminar
    assert_eq!(h.staging.open_leases(), 0);
    Ok(())
}

#[test]
fn real_run_matches_dry_run_plan_and_copies() -> Result<(), EngineError> {
    let h = harness();
    h.objects.put("src/data/part-0", b"alpha")?;
    h.objects.put("src/data/part-1", b"beta")?;

    let dry_action = h.repo.save_action(copy_action("src/data/", "dest/data/"))?;
    let dry_plan = h.executor.run(&dry_action, true)?;

    let action = h.repo.save_action(copy_action("src/data/", "dest/data/"))?;
    let plan = h.executor.run(&action, false)?;

    // mismo plan salvo la identidad: los steps se comparan por contenido
    assert_eq!(plan.len(), dry_plan.len());
    for (executed, inspected) in plan.iter().zip(dry_plan.iter()) {
        assert_eq!(executed.name, inspected.name);
        assert_eq!(executed.attempt, inspected.attempt);
        assert_eq!(executed.total_attempts, inspected.total_attempts);
        assert_eq!(executed.payload["source_path"], inspected.payload["source_path"]);
        assert_eq!(executed.payload["destination_path"], inspected.payload["destination_path"]);
    }

    assert_eq!(h.objects.get("dest/data/part-0")?.as_deref(), Some(b"alpha".as_slice()));
    assert_eq!(h.objects.get("dest/data/part-1")?.as_deref(), Some(b"beta".as_slice()));
    // el script staged se publicó antes de ejecutar
    assert_eq!(h.objects.list("steps/").unwrap().len(), 1);

    let stored = h.repo.get_action(&action.id)?.unwrap();
    assert_eq!(stored.state, ActionState::Completed);
    assert_eq!(stored.progress, 1.0);
    assert_eq!(h.staging.open_leases(), 0);
    Ok(())
}

#[test]
fn step_failure_carries_engine_identity_and_fails_action() -> Result<(), EngineError> {
    let h = harness();
    // origen sin objetos: la copia del paso falla
    let action = h.repo.save_action(copy_action("src/missing/", "dest/data/"))?;

    let err = h.executor.run(&action, false).unwrap_err();
    match &err {
        EngineError::Execution { engine, message } => {
            assert_eq!(engine, TierCopyEngine::NAME);
            assert!(message.contains("paso 'copy' (1/1)"));
            assert!(message.contains("src/missing/"));
        }
        other => panic!("se esperaba Execution, llegó {:?}", other),
    }

    let stored = h.repo.get_action(&action.id)?.unwrap();
    assert_eq!(stored.state, ActionState::Failed);
    let diagnostic = stored.error_message.unwrap();
    assert!(diagnostic.contains(TierCopyEngine::NAME));
    // el lease también se libera cuando la corrida falla
    assert_eq!(h.staging.open_leases(), 0);
    Ok(())
}

#[test]
fn unknown_engine_is_rejected_before_planning() -> Result<(), EngineError> {
    let h = harness();
    let mut action = copy_action("src/data/", "dest/data/");
    action.engine_name = "no-such-engine".to_string();
    let action = h.repo.save_action(action)?;

    assert!(matches!(h.executor.run(&action, false), Err(EngineError::UnknownEngine(_))));
    // sin engine resuelto no hay fallo terminal persistido
    let stored = h.repo.get_action(&action.id)?.unwrap();
    assert_eq!(stored.state, ActionState::Pending);
    Ok(())
}

#[test]
fn runtime_progress_is_monotonic_and_idempotent() -> Result<(), EngineError> {
    let h = harness();
    let action = h.repo.save_action(copy_action("src/data/", "dest/data/"))?;

    h.runtime.report_progress(&action.id, 0.5, None)?;
    h.runtime.report_progress(&action.id, 0.2, None)?;
    let stored = h.repo.get_action(&action.id)?.unwrap();
    assert_eq!(stored.progress, 0.5);
    assert_eq!(stored.state, ActionState::Running);

    h.runtime.report_progress(&action.id, 0.5, Some(json!({"checkpoint": "half"})))?;
    let stored = h.repo.get_action(&action.id)?.unwrap();
    assert_eq!(stored.progress, 0.5);
    assert_eq!(stored.extra_data["checkpoint"], json!("half"));
    Ok(())
}
