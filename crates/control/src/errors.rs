// Archivo: errors.rs
// Propósito: definir los errores del plano de control y el alias Result<T>
// usado por las APIs del crate.
use pipeline_domain::DomainError;
use thiserror::Error;

/// Errores comunes del plano de control.
///
/// - `NotFound`: entidad no encontrada.
/// - `Validation`: precondición de estado o esquema violada; nunca se
///   reintenta automáticamente.
/// - `ConcurrencyExceeded`: la compuerta rechazó el trigger; lleva el
///   límite configurado y el caller puede reintentar más tarde.
/// - `Dispatch`: fallo al entregar el mensaje de trigger.
/// - `Storage`: error al acceder al almacenamiento.
#[derive(Error, Debug)]
pub enum ControlError {
  /// Entidad no encontrada (workflow, instancia o acción).
  #[error("No encontrado: {0}")]
  NotFound(String),
  /// Violación de precondición de estado o de esquema.
  #[error("Error de validación: {0}")]
  Validation(String),
  /// Concurrencia máxima alcanzada para el workflow.
  #[error("Concurrencia máxima alcanzada: {limit}")]
  ConcurrencyExceeded { limit: u32 },
  /// Fallo al encolar el mensaje de trigger.
  #[error("Error de despacho: {0}")]
  Dispatch(String),
  /// Error genérico de almacenamiento.
  #[error("Error de almacenamiento: {0}")]
  Storage(String),
  /// Errores originados en el dominio.
  #[error("{0}")]
  Domain(#[from] DomainError),
}

/// Alias de resultado usado por las APIs del crate.
pub type Result<T> = std::result::Result<T, ControlError>;
