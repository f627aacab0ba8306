// Archivo: staging.rs
// Propósito: definir los traits de almacenamiento de bajo nivel
// (`ObjectStore`, `StagingStore`) y el lease RAII del área de staging.
use crate::errors::EngineError;
use std::sync::Arc;

/// Store de objetos destino (tier de almacenamiento publicado).
///
/// Las keys son paths jerárquicos (`s3://bucket/prefix/...`, `/hdfs/...`).
/// `copy` opera por prefijo: copia todos los objetos bajo `src` hacia
/// `dest`, preservando los sufijos.
pub trait ObjectStore: Send + Sync {
    /// Escribe un blob bajo la key dada.
    fn put(&self, key: &str, blob: &[u8]) -> Result<(), EngineError>;
    /// Recupera el blob por key exacta, si existe.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, EngineError>;
    /// Lista las keys bajo un prefijo.
    fn list(&self, prefix: &str) -> Result<Vec<String>, EngineError>;
    /// Copia recursiva por prefijo. Falla si el origen no tiene objetos.
    fn copy(&self, src: &str, dest: &str) -> Result<(), EngineError>;
}

/// Área de staging local para artefactos producidos durante la
/// planificación (scripts templateados, manifiestos).
///
/// El ciclo de vida es estricto: se adquiere un lease inmediatamente
/// antes de planificar y se libera incondicionalmente después del
/// publish, con éxito o sin él. `publish` es la única operación que
/// cruza la frontera hacia el store de objetos.
pub trait StagingStore: Send + Sync {
    /// Abre un área de staging nueva y devuelve su key de lease.
    fn open(&self) -> Result<String, EngineError>;
    /// Materializa un archivo en el área; devuelve su key direccionada
    /// por contenido.
    fn stage(&self, lease: &str, name: &str, blob: &[u8]) -> Result<String, EngineError>;
    /// Publica los artefactos staged hacia el store de objetos. Devuelve
    /// las keys publicadas.
    fn publish(&self, lease: &str) -> Result<Vec<String>, EngineError>;
    /// Libera el área (descarta lo no publicado). Idempotente.
    fn release(&self, lease: &str);
}

/// Lease RAII sobre un área de staging: se libera al soltarse, pase lo
/// que pase en la planificación o el publish.
pub struct StagingLease {
    key: String,
    store: Arc<dyn StagingStore>,
}

impl StagingLease {
    /// Adquiere un área nueva sobre el store dado.
    pub fn acquire(store: Arc<dyn StagingStore>) -> Result<Self, EngineError> {
        let key = store.open()?;
        Ok(Self { key, store })
    }

    /// Materializa un archivo dentro del área.
    pub fn stage(&self, name: &str, blob: &[u8]) -> Result<String, EngineError> {
        self.store.stage(&self.key, name, blob)
    }

    /// Publica lo staged hacia el store de objetos.
    pub fn publish(&self) -> Result<Vec<String>, EngineError> {
        self.store.publish(&self.key)
    }
}

impl Drop for StagingLease {
    fn drop(&mut self) {
        self.store.release(&self.key);
    }
}
