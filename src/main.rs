use control::stubs::{InMemoryControlRepository, InMemoryTriggerQueue};
use control::{ControlRepository, InstanceFilter, WorkflowFilter, WorkflowService};
use indexmap::IndexMap;
use pipeline_domain::{Action, Datastore, DatastoreState, WorkflowDraft};
use pipeline_engine::{ActionExecutor, EngineRegistry, InMemoryObjectStore, InMemoryStagingStore, ObjectStore,
                      RepoActionRuntime, StagingStore, TierCopyEngine};
use serde_json::json;
use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;
use uuid::Uuid;

/// Pequeño menú interactivo para administrar workflows usando el
/// repositorio y la cola en memoria del crate `control`.
///
/// Opciones soportadas:
/// 1) Ver workflows (tabla con id, estado y concurrencia)
/// 2) Crear workflow
/// 3) Disparar workflow
/// 4) Procesar el siguiente trigger pendiente (worker de un paso)
/// 5) Ver instancias de un workflow
/// 6) Eliminar workflow (cascada: instancias y acciones)
/// 7) Salir
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    let actor = std::env::var("PIPEFLOW_ACTOR").unwrap_or_else(|_| "anonymous".to_string());

    let repo = Arc::new(InMemoryControlRepository::new());
    let queue = Arc::new(InMemoryTriggerQueue::new());
    let service = WorkflowService::new(repo.clone(), queue.clone());

    let objects = Arc::new(InMemoryObjectStore::new());
    let staging: Arc<dyn StagingStore> = Arc::new(InMemoryStagingStore::new(objects.clone()));
    let registry = Arc::new(EngineRegistry::new());
    registry.register(Arc::new(TierCopyEngine::new(objects.clone())));
    println!("Engines disponibles: {}", registry.names().join(", "));
    let runtime = Arc::new(RepoActionRuntime::new(repo.clone()));
    let executor = ActionExecutor::new(registry.clone(), runtime, staging);

    // Datastores de demo: uno templated (concurrencia libre) y uno activo
    // que además corre en dry-run.
    let templated = Datastore::new("warehouse", TierCopyEngine::NAME, DatastoreState::Templated, json!({}));
    let live = Datastore::new("cluster", TierCopyEngine::NAME, DatastoreState::Active, json!({ "dry_run": true }));
    let datastores = vec![templated, live];

    // objetos de ejemplo para que la copia tenga algo que mover
    objects.put("src/demo/part-0", b"alpha")?;
    objects.put("src/demo/part-1", b"beta")?;

    loop {
        println!("\n== Pipeflow CLI menu ==");
        println!("1) Ver workflows");
        println!("2) Crear workflow");
        println!("3) Disparar workflow");
        println!("4) Procesar siguiente trigger pendiente ({} en cola)", queue.pending());
        println!("5) Ver instancias de un workflow");
        println!("6) Eliminar workflow");
        println!("7) Salir");
        print!("Elige una opción: ");
        io::stdout().flush().ok();

        let mut choice = String::new();
        io::stdin().read_line(&mut choice)?;
        match choice.trim() {
            "1" => {
                match service.list_workflows(&WorkflowFilter::default(), 100, 0) {
                    Ok((workflows, total)) => {
                        println!("\nID                                   | ESTADO   | CONC | NAME");
                        println!("--------------------------------------------------------------------");
                        for w in workflows {
                            println!("{} | {:<8} | {:>4} | {}", w.id, w.state.to_string(), w.concurrency, w.name);
                        }
                        println!("({} en total)", total);
                    }
                    Err(e) => eprintln!("Error listando workflows: {}", e),
                }
            }
            "2" => {
                println!("Datastores disponibles:");
                for (i, ds) in datastores.iter().enumerate() {
                    println!("  {}) {} [{:?}]", i + 1, ds.name, ds.state);
                }
                let pick = prompt("Datastore (número): ")?;
                let datastore = match pick.trim().parse::<usize>().ok().and_then(|n| datastores.get(n.wrapping_sub(1))) {
                    Some(ds) => ds,
                    None => { eprintln!("Selección inválida"); continue; }
                };
                let name = prompt("Nombre del workflow: ")?;
                let conc_s = prompt("Concurrencia (enter para 1): ")?;
                let concurrency = conc_s.trim().parse::<u32>().ok();
                let draft = WorkflowDraft { name: name.trim().to_string(), concurrency, ..Default::default() };
                match service.create_workflow(draft, datastore) {
                    Ok(w) => println!("Workflow creado: {} (concurrencia efectiva {})", w.id, w.concurrency),
                    Err(e) => eprintln!("Error creando workflow: {}", e),
                }
            }
            "3" => {
                let id_s = prompt("Workflow id (UUID): ")?;
                let id = match Uuid::parse_str(id_s.trim()) {
                    Ok(u) => u,
                    Err(_) => { eprintln!("UUID inválido"); continue; }
                };
                match service.trigger(&id, &actor).await {
                    Ok(ack) => println!("Trigger encolado con uuid={}", ack.correlation_id),
                    Err(e) => eprintln!("Error disparando workflow: {}", e),
                }
            }
            "4" => {
                let message = match queue.claim() {
                    Some(m) => m,
                    None => { println!("No hay triggers pendientes"); continue; }
                };
                let instance = match service.materialize_instance(&message) {
                    Ok(i) => i,
                    Err(e) => { eprintln!("Error materializando instancia: {}", e); continue; }
                };
                println!("Instancia {} en estado {:?}", instance.id, instance.state);

                let workflow = match service.get_workflow(&message.workflow_id) {
                    Ok(w) => w,
                    Err(e) => { eprintln!("Workflow desaparecido: {}", e); continue; }
                };
                let dry_run = datastores.iter()
                                        .find(|ds| ds.id == workflow.datastore_id)
                                        .map(|ds| ds.dry_run())
                                        .unwrap_or(false);

                let mut args = IndexMap::new();
                args.insert("source_path".to_string(), json!("src/demo/"));
                args.insert("destination_path".to_string(), json!(format!("dest/{}/", instance.id)));
                let action = Action::new(instance.id, workflow.engine_name.clone(), "copy", args);
                let action = match repo.save_action(action) {
                    Ok(a) => a,
                    Err(e) => { eprintln!("Error guardando acción: {}", e); continue; }
                };

                match executor.run(&action, dry_run) {
                    Ok(steps) => println!("Acción {} terminada: {} paso(s), dry_run={}", action.id, steps.len(), dry_run),
                    Err(e) => eprintln!("Acción fallida: {}", e),
                }
            }
            "5" => {
                let id_s = prompt("Workflow id (UUID): ")?;
                let id = match Uuid::parse_str(id_s.trim()) {
                    Ok(u) => u,
                    Err(_) => { eprintln!("UUID inválido"); continue; }
                };
                let filter = InstanceFilter { workflow_id: Some(id), ..Default::default() };
                match service.list_instances(&filter, 100, 0) {
                    Ok((instances, total)) => {
                        for i in instances {
                            println!("{} | {:?} | uuid={} | por {}", i.id, i.state, i.correlation_id, i.triggered_by);
                        }
                        println!("({} en total)", total);
                    }
                    Err(e) => eprintln!("Error listando instancias: {}", e),
                }
            }
            "6" => {
                let id_s = prompt("Workflow id a eliminar (UUID): ")?;
                let id = match Uuid::parse_str(id_s.trim()) {
                    Ok(u) => u,
                    Err(_) => { eprintln!("UUID inválido"); continue; }
                };
                let confirm = prompt(&format!("Confirma borrado de {}? escribir 'yes' para confirmar: ", id))?;
                if confirm.trim().to_lowercase() == "yes" {
                    match service.delete_workflow(&id) {
                        Ok(()) => println!("Workflow eliminado: {}", id),
                        Err(e) => eprintln!("Error eliminando workflow: {}", e),
                    }
                } else {
                    println!("Borrado cancelado");
                }
            }
            "7" => {
                println!("Saliendo...");
                break;
            }
            other => {
                println!("Opción inválida: {}", other);
            }
        }
    }

    Ok(())
}

fn prompt(msg: &str) -> io::Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s)
}
