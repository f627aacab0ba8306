//! Crate `control` — plano de control de workflows
//!
//! Este crate define el contrato de persistencia `ControlRepository`, una
//! implementación en memoria útil para pruebas (`InMemoryControlRepository`),
//! la compuerta de concurrencia (`ConcurrencyGate`), el despacho asíncrono
//! de triggers (`TriggerDispatcher`) y el servicio de alto nivel
//! `WorkflowService` que expone las operaciones hacia la capa de requests.
//!
//! Diseño resumido:
//! - Inyección explícita de dependencias: cada componente recibe sus
//!   colaboradores (`Arc<dyn ...>`) por constructor, sin lookups globales.
//! - La admisión de un trigger (conteo de instancias en vuelo) y el
//!   encolado del mensaje no son transaccionales entre sí: el límite de
//!   concurrencia es consultivo bajo triggers concurrentes.
//! - El disparo es fire-and-forget: el caller recibe un acuse con el
//!   correlation id y nunca espera la materialización de la instancia.
//!
//! Ejemplo rápido:
//! ```rust
//! use control::stubs::{InMemoryControlRepository, InMemoryTriggerQueue};
//! use control::WorkflowService;
//! use std::sync::Arc;
//! let repo = Arc::new(InMemoryControlRepository::new());
//! let queue = Arc::new(InMemoryTriggerQueue::new());
//! let service = WorkflowService::new(repo, queue);
//! ```
pub mod dispatch;
pub mod errors;
pub mod gate;
pub mod repository;
pub mod service;
pub mod stubs;

pub use dispatch::*;
pub use errors::*;
pub use gate::*;
pub use repository::*;
pub use service::*;
pub use stubs::*;
