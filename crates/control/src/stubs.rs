// Archivo: stubs.rs
// Propósito: implementaciones en memoria para pruebas y wiring rápido.
//
// Incluye un repositorio en memoria (`InMemoryControlRepository`) y una
// cola de triggers (`InMemoryTriggerQueue`). Estas implementaciones no
// son durables y se usan para demos o pruebas locales.
use crate::dispatch::{TriggerDispatcher, TriggerMessage};
use crate::errors::{ControlError, Result};
use crate::repository::{ControlRepository, InstanceFilter, WorkflowFilter};
use async_trait::async_trait;
use pipeline_domain::{Action, InstanceState, Workflow, WorkflowInstance};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Cola simple en memoria para encolar y reclamar mensajes de trigger.
///
/// Uso pensado para pruebas locales y ejemplos. No garantiza durabilidad
/// ni comportamiento distribuido.
#[derive(Debug, Default)]
pub struct InMemoryTriggerQueue {
    queue: Mutex<VecDeque<TriggerMessage>>,
}

impl InMemoryTriggerQueue {
    pub fn new() -> Self {
        Self { queue: Mutex::new(VecDeque::new()) }
    }

    /// Reclama el siguiente mensaje pendiente, si existe.
    pub fn claim(&self) -> Option<TriggerMessage> {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).pop_front()
    }

    /// Cantidad de mensajes pendientes (para aserciones en tests).
    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl TriggerDispatcher for InMemoryTriggerQueue {
    async fn submit(&self, message: TriggerMessage) -> Result<()> {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).push_back(message);
        Ok(())
    }
}

/// Repositorio en memoria del plano de control (no durable).
pub struct InMemoryControlRepository {
    /// Workflows indexados por id.
    workflows: Mutex<HashMap<Uuid, Workflow>>,
    /// Instancias indexadas por id.
    instances: Mutex<HashMap<Uuid, WorkflowInstance>>,
    /// Acciones indexadas por id.
    actions: Mutex<HashMap<Uuid, Action>>,
}

impl InMemoryControlRepository {
    pub fn new() -> Self {
        Self { workflows: Mutex::new(HashMap::new()),
               instances: Mutex::new(HashMap::new()),
               actions: Mutex::new(HashMap::new()) }
    }

    /// Helper para mapear `Mutex::lock()` en un `Result` con
    /// `ControlError::Storage`.
    fn lock<'a, T>(&'a self, m: &'a Mutex<T>) -> std::result::Result<MutexGuard<'a, T>, ControlError> {
        m.lock().map_err(|e| ControlError::Storage(format!("mutex poisoned: {:?}", e)))
    }
}

impl Default for InMemoryControlRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn page<T>(mut items: Vec<T>, limit: usize, offset: usize) -> (Vec<T>, usize) {
    let total = items.len();
    let items = if offset >= total {
        Vec::new()
    } else {
        items.drain(offset..).take(limit).collect()
    };
    (items, total)
}

impl ControlRepository for InMemoryControlRepository {
    fn save_workflow(&self, workflow: Workflow) -> Result<Workflow> {
        self.lock(&self.workflows)?.insert(workflow.id, workflow.clone());
        Ok(workflow)
    }

    fn get_workflow(&self, id: &Uuid) -> Result<Option<Workflow>> {
        Ok(self.lock(&self.workflows)?.get(id).cloned())
    }

    fn list_workflows(&self, filter: &WorkflowFilter, limit: usize, offset: usize) -> Result<(Vec<Workflow>, usize)> {
        let workflows = self.lock(&self.workflows)?;
        let mut matched: Vec<Workflow> = workflows.values()
                                                  .filter(|w| filter.state.map_or(true, |s| w.state == s))
                                                  .filter(|w| {
                                                      filter.name_contains
                                                            .as_deref()
                                                            .map_or(true, |n| w.name.contains(n))
                                                  })
                                                  .filter(|w| {
                                                      filter.tag
                                                            .as_deref()
                                                            .map_or(true, |t| w.tags.iter().any(|x| x == t))
                                                  })
                                                  .cloned()
                                                  .collect();
        // stable order for pagination
        matched.sort_by_key(|w| w.created_at);
        Ok(page(matched, limit, offset))
    }

    fn delete_workflow(&self, id: &Uuid) -> Result<()> {
        self.lock(&self.workflows)?
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ControlError::NotFound(format!("workflow {}", id)))
    }

    fn save_instance(&self, instance: WorkflowInstance) -> Result<WorkflowInstance> {
        self.lock(&self.instances)?.insert(instance.id, instance.clone());
        Ok(instance)
    }

    fn get_instance(&self, id: &Uuid) -> Result<Option<WorkflowInstance>> {
        Ok(self.lock(&self.instances)?.get(id).cloned())
    }

    fn list_instances(&self, filter: &InstanceFilter, limit: usize, offset: usize)
        -> Result<(Vec<WorkflowInstance>, usize)> {
        let instances = self.lock(&self.instances)?;
        let mut matched: Vec<WorkflowInstance> =
            instances.values()
                     .filter(|i| filter.workflow_id.map_or(true, |w| i.workflow_id == w))
                     .filter(|i| filter.state.map_or(true, |s| i.state == s))
                     .cloned()
                     .collect();
        matched.sort_by_key(|i| i.created_at);
        Ok(page(matched, limit, offset))
    }

    fn count_instances_in(&self, workflow_id: &Uuid, states: &[InstanceState]) -> Result<usize> {
        let instances = self.lock(&self.instances)?;
        Ok(instances.values()
                    .filter(|i| &i.workflow_id == workflow_id && states.contains(&i.state))
                    .count())
    }

    fn delete_instances(&self, workflow_id: &Uuid) -> Result<Vec<Uuid>> {
        let mut instances = self.lock(&self.instances)?;
        let doomed: Vec<Uuid> = instances.values()
                                         .filter(|i| &i.workflow_id == workflow_id)
                                         .map(|i| i.id)
                                         .collect();
        for id in &doomed {
            instances.remove(id);
        }
        Ok(doomed)
    }

    fn save_action(&self, action: Action) -> Result<Action> {
        self.lock(&self.actions)?.insert(action.id, action.clone());
        Ok(action)
    }

    fn get_action(&self, id: &Uuid) -> Result<Option<Action>> {
        Ok(self.lock(&self.actions)?.get(id).cloned())
    }

    fn list_actions_for_instance(&self, instance_id: &Uuid) -> Result<Vec<Action>> {
        let actions = self.lock(&self.actions)?;
        let mut matched: Vec<Action> = actions.values()
                                              .filter(|a| &a.workflow_instance_id == instance_id)
                                              .cloned()
                                              .collect();
        matched.sort_by_key(|a| a.created_at);
        Ok(matched)
    }

    fn delete_actions_for_instances(&self, instance_ids: &[Uuid]) -> Result<()> {
        let mut actions = self.lock(&self.actions)?;
        actions.retain(|_, a| !instance_ids.contains(&a.workflow_instance_id));
        Ok(())
    }
}
