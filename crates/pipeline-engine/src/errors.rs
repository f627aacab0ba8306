use control::ControlError;
use pipeline_domain::DomainError;
use thiserror::Error;

// Errores comunes de la capa de engines.
//
// Este enum centraliza los errores que pueden ocurrir durante la
// planificación y ejecución de acciones: fallos de ejecución de pasos
// (con identidad del engine y diagnóstico completo), argumentos
// faltantes, staging y errores propagados del plano de control.
#[derive(Error, Debug)]
pub enum EngineError {
  /// Fallo terminal de un paso, envuelto con la identidad del engine y
  /// el contexto de diagnóstico completo (error subyacente + traza).
  #[error("El engine '{engine}' falló al ejecutar: {message}")]
  Execution { engine: String, message: String },

  /// Argumento obligatorio ausente en `Action.args`.
  #[error("Falta el argumento obligatorio '{0}'")]
  MissingArgument(String),

  /// No hay engine registrado bajo ese nombre.
  #[error("Engine desconocido: {0}")]
  UnknownEngine(String),

  /// Fallo del área de staging local.
  #[error("Error de staging: {0}")]
  Staging(String),

  /// Fallo del object store destino.
  #[error("Error del object store: {0}")]
  ObjectStore(String),

  /// Errores originados por el plano de control (persistencia de
  /// progreso y estados terminales).
  #[error("Error de control: {0}")]
  Control(#[from] ControlError),

  /// Errores originados por el dominio.
  #[error("Error de dominio: {0}")]
  Domain(#[from] DomainError),

  /// Errores de serializacion/deserializacion JSON.
  #[error("Error de serializacion: {0}")]
  Serialization(#[from] serde_json::Error),
}
