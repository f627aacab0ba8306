// workflow.rs
use crate::{Datastore, DatastoreState, DomainError};
use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Estados del ciclo de vida de un workflow.
///
/// `Creating` y `Deleting` son estados transicionales no editables: un
/// update (completo o parcial) sólo se admite en `Active` o `Inactive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowState {
  Creating,
  Active,
  Inactive,
  Deleting,
}

impl fmt::Display for WorkflowState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      WorkflowState::Creating => "CREATING",
      WorkflowState::Active => "ACTIVE",
      WorkflowState::Inactive => "INACTIVE",
      WorkflowState::Deleting => "DELETING",
    };
    write!(f, "{}", s)
  }
}

/// Política al fallar una instancia del workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnFailure {
  Deactivate,
  Continue,
}

impl Default for OnFailure {
  fn default() -> Self {
    OnFailure::Deactivate
  }
}

/// Definición reutilizable de un pipeline, vinculada a un datastore y a un
/// engine concretos. `datastore_id` y `engine_name` son inmutables después
/// de la creación; ver `WorkflowStateMachine` para la whitelist de campos
/// editables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
  pub id: Uuid,
  pub name: String,
  pub datastore_id: Uuid,
  pub engine_name: String,
  pub state: WorkflowState,
  pub concurrency: u32,
  pub on_failure: OnFailure,
  pub on_failure_email: Vec<String>,
  pub on_success_email: Vec<String>,
  pub on_started_email: Vec<String>,
  pub retries_on_failure: u32,
  pub tags: Vec<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Borrador con los campos que el caller puede proponer al crear un
/// workflow; el resto se deriva del datastore o de los defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowDraft {
  pub name: String,
  pub state: Option<WorkflowState>,
  pub concurrency: Option<u32>,
  pub on_failure: Option<OnFailure>,
  #[serde(default)]
  pub on_failure_email: Vec<String>,
  #[serde(default)]
  pub on_success_email: Vec<String>,
  #[serde(default)]
  pub on_started_email: Vec<String>,
  pub retries_on_failure: Option<u32>,
  #[serde(default)]
  pub tags: Vec<String>,
}

impl Workflow {
  /// Construye un workflow a partir de un borrador y del datastore al que
  /// queda vinculado. `datastore_id` y `engine_name` se toman siempre del
  /// datastore, nunca del borrador.
  ///
  /// Invariantes:
  /// - si el datastore está `Active` (no templated), la concurrencia se
  ///   fuerza a 1 sin importar el valor pedido.
  /// - el estado inicial sólo puede ser `Active` (default) o `Inactive`.
  pub fn for_datastore(draft: WorkflowDraft, datastore: &Datastore) -> Result<Self, DomainError> {
    let state = draft.state.unwrap_or(WorkflowState::Active);
    if !matches!(state, WorkflowState::Active | WorkflowState::Inactive) {
      // Creating/Deleting son transicionales: un workflow creado ahí
      // quedaría ineditable e indisparable
      return Err(DomainError::ValidationError(format!("Un workflow no puede crearse en estado {}", state)));
    }
    let mut concurrency = draft.concurrency.unwrap_or(1);
    if datastore.state == DatastoreState::Active {
      // only templated datastores can use concurrencies > 1
      concurrency = 1;
    }
    let now = Utc::now();
    let workflow = Self { id: Uuid::new_v4(),
                          name: draft.name,
                          datastore_id: datastore.id,
                          engine_name: datastore.engine_name.clone(),
                          state,
                          concurrency,
                          on_failure: draft.on_failure.unwrap_or_default(),
                          on_failure_email: draft.on_failure_email,
                          on_success_email: draft.on_success_email,
                          on_started_email: draft.on_started_email,
                          retries_on_failure: draft.retries_on_failure.unwrap_or(0),
                          tags: draft.tags,
                          created_at: now,
                          updated_at: now };
    workflow.default_and_validate()
  }

  /// Completa defaults y valida el esquema. Devuelve una copia saneada o
  /// un `ValidationError` con el primer problema encontrado.
  ///
  /// Reglas:
  /// - `name` no puede quedar vacío (se recorta whitespace).
  /// - `concurrency` debe ser >= 1.
  /// - las direcciones de notificación deben contener '@'.
  /// - `tags` se deduplica preservando el orden de inserción.
  pub fn default_and_validate(mut self) -> Result<Self, DomainError> {
    self.name = self.name.trim().to_string();
    if self.name.is_empty() {
      return Err(DomainError::ValidationError("El nombre del workflow no puede estar vacío".to_string()));
    }
    if self.concurrency < 1 {
      return Err(DomainError::ValidationError("La concurrencia debe ser >= 1".to_string()));
    }
    for email in self.on_failure_email.iter().chain(&self.on_success_email).chain(&self.on_started_email) {
      if !email.contains('@') {
        return Err(DomainError::ValidationError(format!("Dirección de notificación inválida: {}", email)));
      }
    }
    let deduped: IndexSet<String> = self.tags.drain(..).collect();
    self.tags = deduped.into_iter().collect();
    Ok(self)
  }

  pub fn is_editable(&self) -> bool {
    matches!(self.state, WorkflowState::Active | WorkflowState::Inactive)
  }
}

impl fmt::Display for Workflow {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f,
           "Workflow(id: {}, name: {}, state: {}, concurrency: {})",
           self.id, self.name, self.state, self.concurrency)
  }
}
