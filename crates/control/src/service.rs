// Archivo: service.rs
// Propósito: implementar `WorkflowService`, la capa orquestadora que
// expone las operaciones de alto nivel sobre workflows, instancias y
// triggers. Esta capa debe ser invocada desde handlers HTTP o desde
// workers; el routing y la autenticación quedan fuera.
use crate::dispatch::{TriggerAck, TriggerDispatcher, TriggerMessage};
use crate::errors::{ControlError, Result};
use crate::gate::ConcurrencyGate;
use crate::repository::{ControlRepository, InstanceFilter, WorkflowFilter};
use pipeline_domain::{Datastore, PartialUpdateApplier, Patch, Workflow, WorkflowDraft, WorkflowInstance,
                      WorkflowStateMachine};
use std::sync::Arc;
use uuid::Uuid;

/// Servicio de alto nivel del plano de control.
///
/// Orquesta el repositorio, la compuerta de concurrencia y el despacho de
/// triggers. Los colaboradores se inyectan por constructor.
pub struct WorkflowService {
    repo: Arc<dyn ControlRepository>,
    dispatcher: Arc<dyn TriggerDispatcher>,
    gate: ConcurrencyGate,
}

impl WorkflowService {
    pub fn new(repo: Arc<dyn ControlRepository>, dispatcher: Arc<dyn TriggerDispatcher>) -> Self {
        let gate = ConcurrencyGate::new(repo.clone());
        Self { repo, dispatcher, gate }
    }

    /// Crea un workflow a partir de un borrador, vinculado al datastore.
    /// Aplica el invariante de concurrencia forzada y la validación de
    /// esquema antes de persistir.
    pub fn create_workflow(&self, draft: WorkflowDraft, datastore: &Datastore) -> Result<Workflow> {
        let workflow = Workflow::for_datastore(draft, datastore)?;
        self.repo.save_workflow(workflow)
    }

    /// Lista workflows con paginación. Devuelve (items, total filtrado).
    pub fn list_workflows(&self, filter: &WorkflowFilter, limit: usize, offset: usize)
        -> Result<(Vec<Workflow>, usize)> {
        self.repo.list_workflows(filter, limit, offset)
    }

    pub fn get_workflow(&self, id: &Uuid) -> Result<Workflow> {
        self.repo
            .get_workflow(id)?
            .ok_or_else(|| ControlError::NotFound(format!("workflow {}", id)))
    }

    /// Reemplazo completo: el documento del caller pasa por la whitelist
    /// y la revalidación de la máquina de estados antes de persistirse.
    pub fn replace_workflow(&self, id: &Uuid, document: Workflow) -> Result<Workflow> {
        let original = self.get_workflow(id)?;
        let merged = WorkflowStateMachine::apply_update(&original, &document)?;
        self.repo.save_workflow(merged)
    }

    /// Update parcial: aplica el parche RFC 6902 todo-o-nada y enruta el
    /// resultado por la misma vía de validación que el reemplazo.
    pub fn apply_patch(&self, id: &Uuid, patch: &Patch) -> Result<Workflow> {
        let original = self.get_workflow(id)?;
        let merged = PartialUpdateApplier::apply(&original, patch)?;
        self.repo.save_workflow(merged)
    }

    /// Borra el workflow en cascada: instancias → acciones → workflow, en
    /// ese orden, sin dejar huérfanos.
    pub fn delete_workflow(&self, id: &Uuid) -> Result<()> {
        // ensure it exists before touching children
        let _ = self.get_workflow(id)?;
        let instance_ids = self.repo.delete_instances(id)?;
        self.repo.delete_actions_for_instances(&instance_ids)?;
        self.repo.delete_workflow(id)
    }

    /// Dispara el workflow para `actor`.
    ///
    /// 1. Valida el estado y la concurrencia vía `ConcurrencyGate`.
    /// 2. Acuña un correlation id fresco y encola el mensaje de trigger.
    /// 3. Retorna el acuse de inmediato, sin esperar la materialización
    ///    de la instancia.
    ///
    /// La verificación y el encolado no son transaccionales entre sí;
    /// este check-then-enqueue es el único backpressure del sistema.
    pub async fn trigger(&self, id: &Uuid, actor: &str) -> Result<TriggerAck> {
        let workflow = self.get_workflow(id)?;
        self.gate.admit(&workflow)?;

        let message = TriggerMessage::mint(workflow.id, actor);
        log::info!("Lanzando workflow {} para user={} con uuid={}",
                   workflow.id,
                   actor,
                   message.correlation_id);
        let ack = TriggerAck { workflow_id: message.workflow_id, correlation_id: message.correlation_id.clone() };
        self.dispatcher.submit(message).await?;
        Ok(ack)
    }

    /// Convierte un mensaje de trigger reclamado en una instancia QUEUED.
    /// Es la pieza que correría el worker consumidor de la cola.
    pub fn materialize_instance(&self, message: &TriggerMessage) -> Result<WorkflowInstance> {
        let instance =
            WorkflowInstance::queued(message.workflow_id, message.correlation_id.clone(), message.triggered_by.clone());
        self.repo.save_instance(instance)
    }

    pub fn list_instances(&self, filter: &InstanceFilter, limit: usize, offset: usize)
        -> Result<(Vec<WorkflowInstance>, usize)> {
        self.repo.list_instances(filter, limit, offset)
    }

    pub fn get_instance(&self, id: &Uuid) -> Result<WorkflowInstance> {
        self.repo
            .get_instance(id)?
            .ok_or_else(|| ControlError::NotFound(format!("instancia {}", id)))
    }

    /// Borra todas las instancias del workflow (y sus acciones).
    pub fn delete_instances_for_workflow(&self, workflow_id: &Uuid) -> Result<()> {
        let instance_ids = self.repo.delete_instances(workflow_id)?;
        self.repo.delete_actions_for_instances(&instance_ids)
    }
}
