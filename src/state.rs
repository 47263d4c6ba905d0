//! Shared application state for request handlers.

use std::sync::Arc;
use tera::Tera;

use crate::config::AppConfig;
use crate::store::RecipeStore;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// The recipe store is injected here once at startup; handlers reach storage
/// only through this handle.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tera: Arc<Tera>,
    pub store: Arc<dyn RecipeStore>,
}

impl AppState {
    /// Creates a new application state from the given configuration, templates, and store.
    pub fn new(config: AppConfig, tera: Tera, store: Arc<dyn RecipeStore>) -> Self {
        Self {
            config: Arc::new(config),
            tera: Arc::new(tera),
            store,
        }
    }
}
