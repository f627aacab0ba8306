//! Crate `pipeline-engine` — contrato de engines enchufables
//!
//! Define la frontera de polimorfismo por engine: el trait
//! `PipelineEngine` (planificar y correr pasos), el `EngineRegistry` que
//! resuelve implementaciones por `engine_name`, el `ActionRuntime` que
//! persiste progreso/terminales, los stores de staging/objetos y el
//! `ActionExecutor` que orquesta plan → publish → execute con soporte de
//! dry-run.
pub mod engines;
pub mod errors;
pub mod executor;
pub mod registry;
pub mod runtime;
pub mod staging;
pub mod step;
pub mod stubs;

pub use engines::TierCopyEngine;
pub use errors::EngineError;
pub use executor::ActionExecutor;
pub use registry::{EngineRegistry, PipelineEngine};
pub use runtime::{ActionRuntime, RepoActionRuntime};
pub use staging::{ObjectStore, StagingLease, StagingStore};
pub use step::Step;
pub use stubs::{InMemoryObjectStore, InMemoryStagingStore};
