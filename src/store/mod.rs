//! Recipe persistence.
//!
//! Handlers talk to storage only through [`RecipeStore`]. The handle is built
//! once at startup and carried in `AppState`, so tests can swap in
//! [`MemoryStore`] for [`MongoStore`].

mod memory;
mod mongo;

use async_trait::async_trait;

use crate::model::{NewRecipe, Recipe, RecipeId, RecipePatch};

pub use memory::MemoryStore;
pub use mongo::MongoStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("A recipe with this title already exists")]
    DuplicateTitle,

    #[error("Database error: {0}")]
    Database(String),
}

/// One logical round trip to storage per call. No retries, no transactions.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Insert a new recipe, assigning its id.
    async fn create(&self, recipe: NewRecipe) -> Result<Recipe, StoreError>;

    /// All recipes in insertion order.
    async fn find_all(&self) -> Result<Vec<Recipe>, StoreError>;

    async fn find_by_id(&self, id: RecipeId) -> Result<Option<Recipe>, StoreError>;

    /// Apply `patch` and return the record as it is after the update.
    async fn find_by_id_and_update(
        &self,
        id: RecipeId,
        patch: RecipePatch,
    ) -> Result<Option<Recipe>, StoreError>;

    /// Remove a recipe, returning what was removed.
    async fn find_by_id_and_delete(&self, id: RecipeId) -> Result<Option<Recipe>, StoreError>;
}
