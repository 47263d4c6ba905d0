//! In-process recipe store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{RecipeStore, StoreError};
use crate::model::{NewRecipe, Recipe, RecipeId, RecipePatch};

/// Recipes kept in insertion order behind an async lock.
///
/// Enforces the same title uniqueness as the MongoDB index.
#[derive(Debug, Default)]
pub struct MemoryStore {
    recipes: RwLock<Vec<Recipe>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn title_taken(recipes: &[Recipe], title: &str, except: Option<RecipeId>) -> bool {
    recipes
        .iter()
        .any(|r| r.title == title && Some(r.id) != except)
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn create(&self, recipe: NewRecipe) -> Result<Recipe, StoreError> {
        let mut recipes = self.recipes.write().await;
        if title_taken(&recipes, &recipe.title, None) {
            return Err(StoreError::DuplicateTitle);
        }
        let recipe = Recipe::from_new(RecipeId::new(), recipe);
        recipes.push(recipe.clone());
        Ok(recipe)
    }

    async fn find_all(&self) -> Result<Vec<Recipe>, StoreError> {
        Ok(self.recipes.read().await.clone())
    }

    async fn find_by_id(&self, id: RecipeId) -> Result<Option<Recipe>, StoreError> {
        let recipes = self.recipes.read().await;
        Ok(recipes.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_id_and_update(
        &self,
        id: RecipeId,
        patch: RecipePatch,
    ) -> Result<Option<Recipe>, StoreError> {
        let mut recipes = self.recipes.write().await;
        let Some(index) = recipes.iter().position(|r| r.id == id) else {
            return Ok(None);
        };
        if let Some(title) = patch.title.as_deref() {
            if title_taken(&recipes, title, Some(id)) {
                return Err(StoreError::DuplicateTitle);
            }
        }
        let recipe = &mut recipes[index];
        recipe.apply(patch);
        Ok(Some(recipe.clone()))
    }

    async fn find_by_id_and_delete(&self, id: RecipeId) -> Result<Option<Recipe>, StoreError> {
        let mut recipes = self.recipes.write().await;
        Ok(recipes
            .iter()
            .position(|r| r.id == id)
            .map(|index| recipes.remove(index)))
    }
}
