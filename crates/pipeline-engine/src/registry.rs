use crate::errors::EngineError;
use crate::staging::StagingLease;
use crate::step::Step;
use dashmap::DashMap;
use pipeline_domain::Action;
use std::sync::Arc;

/// Capacidad que debe satisfacer cada engine enchufable.
///
/// Hay una implementación por `engine_name`; el `EngineRegistry` resuelve
/// la variante correcta sin inspección de tipos en runtime. La
/// planificación no debe producir efectos observables hacia el sistema
/// destino cuando `dry_run` es true; sí puede materializar artefactos en
/// el área de staging local mientras nada cruce la frontera de publish.
pub trait PipelineEngine: Send + Sync {
    /// Nombre bajo el que se registra el engine.
    fn name(&self) -> &str;

    /// Convierte los argumentos de la acción en una secuencia ordenada de
    /// pasos. Con los mismos argumentos, el plan con y sin dry-run debe
    /// ser la misma secuencia.
    fn plan(&self, action: &Action, dry_run: bool, staging: &StagingLease) -> Result<Vec<Step>, EngineError>;

    /// Ejecuta un paso contra el sistema destino.
    fn run_step(&self, step: &Step) -> Result<(), EngineError>;
}

/// Registro de engines indexado por nombre.
#[derive(Default)]
pub struct EngineRegistry {
    engines: DashMap<String, Arc<dyn PipelineEngine>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self { engines: DashMap::new() }
    }

    /// Registra (o reemplaza) el engine bajo su propio nombre.
    pub fn register(&self, engine: Arc<dyn PipelineEngine>) {
        self.engines.insert(engine.name().to_string(), engine);
    }

    /// Resuelve el engine para `engine_name`; `UnknownEngine` si no hay
    /// ninguno registrado bajo ese nombre.
    pub fn resolve(&self, engine_name: &str) -> Result<Arc<dyn PipelineEngine>, EngineError> {
        self.engines
            .get(engine_name)
            .map(|e| e.value().clone())
            .ok_or_else(|| EngineError::UnknownEngine(engine_name.to_string()))
    }

    /// Nombres registrados (para listados/diagnóstico).
    pub fn names(&self) -> Vec<String> {
        self.engines.iter().map(|e| e.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopEngine;

    impl PipelineEngine for NoopEngine {
        fn name(&self) -> &str {
            "noop"
        }

        fn plan(&self, _action: &Action, _dry_run: bool, _staging: &StagingLease) -> Result<Vec<Step>, EngineError> {
            Ok(Vec::new())
        }

        fn run_step(&self, _step: &Step) -> Result<(), EngineError> {
            Ok(())
        }
    }

    #[test]
    fn resolve_unknown_engine_fails() {
        let registry = EngineRegistry::new();
        registry.register(Arc::new(NoopEngine));
        assert!(registry.resolve("noop").is_ok());
        match registry.resolve("missing") {
            Err(EngineError::UnknownEngine(name)) => assert_eq!(name, "missing"),
            other => panic!("se esperaba UnknownEngine, se obtuvo {:?}", other.map(|e| e.name().to_string())),
        }
    }
}
