// datastore.rs
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use uuid::Uuid;

/// Estado del datastore al que se vincula un workflow.
///
/// Sólo los datastores `Templated` admiten concurrencia > 1: un datastore
/// `Active` representa un recurso físico único (cluster, warehouse) donde
/// varias corridas simultáneas pisarían los mismos datos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DatastoreState {
  Templated,
  Active,
  Inactive,
}

impl fmt::Display for DatastoreState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      DatastoreState::Templated => "TEMPLATED",
      DatastoreState::Active => "ACTIVE",
      DatastoreState::Inactive => "INACTIVE",
    };
    write!(f, "{}", s)
  }
}

/// Resumen del datastore colaborador: lo mínimo que el plano de control
/// necesita para crear workflows y resolver el engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Datastore {
  pub id: Uuid,
  pub name: String,
  pub engine_name: String,
  pub state: DatastoreState,
  /// Parámetros específicos del engine (puede incluir `dry_run`).
  pub args: JsonValue,
}

impl Datastore {
  pub fn new(name: impl Into<String>, engine_name: impl Into<String>, state: DatastoreState, args: JsonValue) -> Self {
    Self { id: Uuid::new_v4(), name: name.into(), engine_name: engine_name.into(), state, args }
  }

  /// Indica si el datastore pide planificación sin efectos (`dry_run`).
  pub fn dry_run(&self) -> bool {
    self.args.get("dry_run").and_then(|v| v.as_bool()).unwrap_or(false)
  }
}
