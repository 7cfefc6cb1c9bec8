//! Text generator selection for the `generate` and `serve` commands.

use std::sync::Arc;

use anyhow::{Context, Result, bail};

use cadence_core::generator::{GeminiGenerator, GeneratorRegistry, TemplateGenerator, TextGenerator};

use crate::config::CadenceConfig;

pub const ONLINE: &str = "gemini";
pub const OFFLINE: &str = "template";

/// Register every backend the resolved config allows. The offline template
/// generator is always available; Gemini only when an API key is set.
pub fn build_registry(cfg: &CadenceConfig) -> Result<GeneratorRegistry> {
    let mut registry = GeneratorRegistry::new();
    registry.register(TemplateGenerator::new());

    if let Some(key) = &cfg.api_key {
        let gemini = GeminiGenerator::new(key.as_str(), cfg.model.as_str(), cfg.retry)
            .context("failed to initialize Gemini generator")?;
        tracing::debug!(model = gemini.model(), "gemini generator configured");
        registry.register(gemini);
    }

    tracing::debug!(?registry, "generator registry built");
    Ok(registry)
}

/// Pick the backend for a run.
pub fn select(cfg: &CadenceConfig, offline: bool) -> Result<Arc<dyn TextGenerator>> {
    let registry = build_registry(cfg)?;
    let name = if offline { OFFLINE } else { ONLINE };

    match registry.get(name) {
        Some(generator) => {
            tracing::info!(generator = name, "using text generator");
            Ok(generator)
        }
        None => bail!(
            "no API key configured for the {ONLINE} generator; set CADENCE_API_KEY, \
             run `cadence init --api-key <KEY>`, or pass --offline"
        ),
    }
}
