// Archivo: stubs.rs
// Propósito: implementaciones en memoria de los stores para pruebas y
// wiring rápido. No son durables.
use crate::errors::EngineError;
use crate::staging::{ObjectStore, StagingStore};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Store de objetos en memoria: un mapa key → bytes.
pub struct InMemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self { objects: Mutex::new(HashMap::new()) }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Vec<u8>>>, EngineError> {
        self.objects
            .lock()
            .map_err(|e| EngineError::ObjectStore(format!("mutex poisoned: {:?}", e)))
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn put(&self, key: &str, blob: &[u8]) -> Result<(), EngineError> {
        self.lock()?.insert(key.to_string(), blob.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, EngineError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, EngineError> {
        let objects = self.lock()?;
        let mut keys: Vec<String> = objects.keys().filter(|k| k.starts_with(prefix)).cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn copy(&self, src: &str, dest: &str) -> Result<(), EngineError> {
        let mut objects = self.lock()?;
        let matched: Vec<(String, Vec<u8>)> = objects.iter()
                                                     .filter(|(k, _)| k.starts_with(src))
                                                     .map(|(k, v)| (k.clone(), v.clone()))
                                                     .collect();
        if matched.is_empty() {
            return Err(EngineError::ObjectStore(format!("origen vacío o inexistente: {}", src)));
        }
        for (key, blob) in matched {
            let suffix = &key[src.len()..];
            objects.insert(format!("{}{}", dest, suffix), blob);
        }
        Ok(())
    }
}

/// Área de staging en memoria. Los archivos staged viven bajo su lease
/// hasta que se publican hacia el `ObjectStore` o se libera el área.
pub struct InMemoryStagingStore {
    /// lease → [(nombre, key de contenido, bytes)]
    staged: Mutex<HashMap<String, Vec<(String, String, Vec<u8>)>>>,
    objects: std::sync::Arc<dyn ObjectStore>,
}

impl InMemoryStagingStore {
    pub fn new(objects: std::sync::Arc<dyn ObjectStore>) -> Self {
        Self { staged: Mutex::new(HashMap::new()), objects }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Vec<(String, String, Vec<u8>)>>>, EngineError> {
        self.staged
            .lock()
            .map_err(|e| EngineError::Staging(format!("mutex poisoned: {:?}", e)))
    }

    /// Cantidad de áreas vivas (para aserciones en tests).
    pub fn open_leases(&self) -> usize {
        self.staged.lock().map(|s| s.len()).unwrap_or(0)
    }
}

impl StagingStore for InMemoryStagingStore {
    fn open(&self) -> Result<String, EngineError> {
        let key = Uuid::new_v4().simple().to_string();
        self.lock()?.insert(key.clone(), Vec::new());
        Ok(key)
    }

    fn stage(&self, lease: &str, name: &str, blob: &[u8]) -> Result<String, EngineError> {
        let mut staged = self.lock()?;
        let files = staged.get_mut(lease)
                          .ok_or_else(|| EngineError::Staging(format!("lease desconocido: {}", lease)))?;
        // content-addressed key so identical scripts share identity
        let digest = format!("{:x}", Sha256::digest(blob));
        let content_key = format!("steps/{}/{}", digest, name);
        files.push((name.to_string(), content_key.clone(), blob.to_vec()));
        Ok(content_key)
    }

    fn publish(&self, lease: &str) -> Result<Vec<String>, EngineError> {
        let staged = self.lock()?;
        let files = staged.get(lease)
                          .ok_or_else(|| EngineError::Staging(format!("lease desconocido: {}", lease)))?
                          .clone();
        drop(staged);
        let mut published = Vec::with_capacity(files.len());
        for (_name, content_key, blob) in files {
            self.objects.put(&content_key, &blob)?;
            published.push(content_key);
        }
        Ok(published)
    }

    fn release(&self, lease: &str) {
        if let Ok(mut staged) = self.staged.lock() {
            staged.remove(lease);
        }
    }
}
