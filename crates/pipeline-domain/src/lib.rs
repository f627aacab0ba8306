mod action;
mod datastore;
mod errors;
mod instance;
mod patch;
mod state_machine;
mod workflow;

pub use action::{Action, ActionState};
pub use datastore::{Datastore, DatastoreState};
pub use errors::DomainError;
pub use instance::{InstanceState, WorkflowInstance};
pub use patch::PartialUpdateApplier;
pub use state_machine::WorkflowStateMachine;
pub use workflow::{OnFailure, Workflow, WorkflowDraft, WorkflowState};
// Re-export del tipo de documento de parche para que las capas superiores
// no dependan directamente del crate `json-patch`.
pub use json_patch::Patch;
