// Archivo: repository.rs
// Propósito: definir el trait `ControlRepository`, el contrato que deben
// implementar las persistencias (Postgres, in-memory, etc.) para
// workflows, instancias y acciones.
use crate::errors::Result;
use pipeline_domain::{Action, InstanceState, Workflow, WorkflowInstance, WorkflowState};
use uuid::Uuid;

/// Filtros soportados al listar workflows.
#[derive(Debug, Clone, Default)]
pub struct WorkflowFilter {
    pub state: Option<WorkflowState>,
    pub name_contains: Option<String>,
    pub tag: Option<String>,
}

/// Filtros soportados al listar instancias.
#[derive(Debug, Clone, Default)]
pub struct InstanceFilter {
    pub workflow_id: Option<Uuid>,
    pub state: Option<InstanceState>,
}

/// Contrato mínimo del repositorio del plano de control.
///
/// El repositorio persiste las tres entidades (workflow, instancia,
/// acción) y expone los conteos que necesita la compuerta de
/// concurrencia. Todas las mutaciones son upserts seguros de reemitir.
pub trait ControlRepository: Send + Sync {
    /// Inserta o reemplaza un workflow.
    fn save_workflow(&self, workflow: Workflow) -> Result<Workflow>;

    /// Obtiene un workflow por id. `None` si no existe.
    fn get_workflow(&self, id: &Uuid) -> Result<Option<Workflow>>;

    /// Lista workflows con paginación. Devuelve (items, total filtrado).
    fn list_workflows(&self, filter: &WorkflowFilter, limit: usize, offset: usize) -> Result<(Vec<Workflow>, usize)>;

    /// Borra sólo la fila del workflow (el cascade lo orquesta el
    /// servicio en el orden instancias → acciones → workflow).
    fn delete_workflow(&self, id: &Uuid) -> Result<()>;

    /// Inserta o reemplaza una instancia.
    fn save_instance(&self, instance: WorkflowInstance) -> Result<WorkflowInstance>;

    fn get_instance(&self, id: &Uuid) -> Result<Option<WorkflowInstance>>;

    fn list_instances(&self, filter: &InstanceFilter, limit: usize, offset: usize)
        -> Result<(Vec<WorkflowInstance>, usize)>;

    /// Cuenta las instancias del workflow cuyo estado está en `states`.
    /// Es la lectura de la que depende la compuerta de concurrencia.
    fn count_instances_in(&self, workflow_id: &Uuid, states: &[InstanceState]) -> Result<usize>;

    /// Borra todas las instancias del workflow. Devuelve los ids borrados
    /// para que el caller pueda borrar sus acciones.
    fn delete_instances(&self, workflow_id: &Uuid) -> Result<Vec<Uuid>>;

    /// Inserta o reemplaza una acción.
    fn save_action(&self, action: Action) -> Result<Action>;

    fn get_action(&self, id: &Uuid) -> Result<Option<Action>>;

    /// Acciones de una instancia, ordenadas por creación.
    fn list_actions_for_instance(&self, instance_id: &Uuid) -> Result<Vec<Action>>;

    /// Borra las acciones pertenecientes a las instancias dadas.
    fn delete_actions_for_instances(&self, instance_ids: &[Uuid]) -> Result<()>;
}
