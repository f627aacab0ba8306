// errors.rs
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum DomainError {
  /// Violación de esquema, whitelist o precondición de estado.
  #[error("Error de validación: {0}")]
  ValidationError(String),
  /// Un parche RFC 6902 no pudo aplicarse (precondición `test` fallida,
  /// path inexistente, etc.). El parche se aborta completo.
  #[error("Error de parche: {0}")]
  PatchError(String),
  #[error("Error de serialización: {0}")]
  SerializationError(String),
}

impl From<serde_json::Error> for DomainError {
  fn from(e: serde_json::Error) -> Self {
    Self::SerializationError(e.to_string())
  }
}

impl From<json_patch::PatchError> for DomainError {
  fn from(e: json_patch::PatchError) -> Self {
    Self::PatchError(e.to_string())
  }
}
