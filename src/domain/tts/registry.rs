use crate::infrastructure::repositories::TtsRepository;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Name accepted everywhere an engine is chosen, resolving to the configured default.
pub const DEFAULT_ENGINE_ALIAS: &str = "default";

/// Speech engines available to the processor, keyed by lower-case name.
#[derive(Clone)]
pub struct EngineRegistry {
    engines: BTreeMap<String, Arc<dyn TtsRepository>>,
    default_engine: String,
}

impl EngineRegistry {
    pub fn new(default_engine: impl Into<String>) -> Self {
        Self {
            engines: BTreeMap::new(),
            default_engine: default_engine.into().to_lowercase(),
        }
    }

    pub fn register(mut self, name: impl Into<String>, engine: Arc<dyn TtsRepository>) -> Self {
        self.engines.insert(name.into().to_lowercase(), engine);
        self
    }

    /// Canonical engine name for a requested one, if it is registered.
    pub fn resolve_name(&self, requested: &str) -> Option<&str> {
        let requested = requested.trim().to_lowercase();
        let name = if requested.is_empty() || requested == DEFAULT_ENGINE_ALIAS {
            self.default_engine.as_str()
        } else {
            requested.as_str()
        };

        self.engines.get_key_value(name).map(|(key, _)| key.as_str())
    }

    pub fn get(&self, requested: &str) -> Option<Arc<dyn TtsRepository>> {
        self.resolve_name(requested)
            .and_then(|name| self.engines.get(name))
            .cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.engines.keys().cloned().collect()
    }

    pub fn default_engine(&self) -> &str {
        &self.default_engine
    }
}
