use super::{Registry, RegistryStore};
use crate::error::AcryptError;

/// registry living only as long as the value, counts the saves
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    registry: Registry,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: Registry) -> Self {
        Self { registry, saves: 0 }
    }

    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl RegistryStore for MemoryStore {
    fn load(&self) -> Result<Registry, AcryptError> {
        Ok(self.registry.clone())
    }

    fn save(&mut self, registry: &Registry) -> Result<(), AcryptError> {
        self.registry = registry.clone();
        self.saves += 1;
        Ok(())
    }
}
