//! Generator registry: a named collection of available text backends.

use std::collections::HashMap;
use std::sync::Arc;

use super::trait_def::TextGenerator;

/// Registered [`TextGenerator`] implementations, keyed by name.
///
/// Generators are held as `Arc` so a looked-up backend can be handed to
/// long-lived owners such as the HTTP server state.
#[derive(Default)]
pub struct GeneratorRegistry {
    generators: HashMap<String, Arc<dyn TextGenerator>>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a generator under [`TextGenerator::name`], returning the
    /// one it replaced, if any.
    pub fn register(
        &mut self,
        generator: impl TextGenerator + 'static,
    ) -> Option<Arc<dyn TextGenerator>> {
        let name = generator.name().to_string();
        self.generators.insert(name, Arc::new(generator))
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn TextGenerator>> {
        self.generators.get(name).cloned()
    }

    /// Registered names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.generators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("generators", &self.list())
            .finish()
    }
}
