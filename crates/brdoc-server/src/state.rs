//! Shared application state.

use std::sync::Arc;

use sqlx::postgres::PgPool;

use brdoc_generators::DocumentGenerator;
use brdoc_llm::FallbackChain;
use brdoc_render::Renderer;
use brdoc_runtime::BrConfig;
use brdoc_sources::DataSourceRegistry;
use brdoc_templates::TemplateRegistry;

/// State shared by all routes.
///
/// Registries are read-only after construction; the renderer and the
/// generator are stateless per request.
#[derive(Clone)]
pub struct AppState {
    pub sources: Arc<DataSourceRegistry>,
    pub templates: Arc<TemplateRegistry>,
    pub generator: Arc<DocumentGenerator>,
    pub renderer: Arc<Renderer>,
    pub pool: Option<PgPool>,
    pub base_url: String,
}

impl AppState {
    pub fn new(config: &BrConfig, pool: Option<PgPool>) -> Self {
        let sources = Arc::new(DataSourceRegistry::with_defaults(pool.clone()));
        let templates = Arc::new(TemplateRegistry::with_builtins());
        let chain = Arc::new(FallbackChain::new(config.models.clone()));
        let generator = Arc::new(DocumentGenerator::new(
            Arc::clone(&templates),
            Arc::clone(&sources),
            chain,
            config.base_url.clone(),
        ));
        Self {
            sources,
            templates,
            generator,
            renderer: Arc::new(Renderer::default()),
            pool,
            base_url: config.base_url.clone(),
        }
    }
}
