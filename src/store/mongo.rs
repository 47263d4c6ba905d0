//! MongoDB-backed recipe store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};

use super::{RecipeStore, StoreError};
use crate::config::DatabaseConfig;
use crate::model::{Level, NewRecipe, Recipe, RecipeId, RecipePatch};

/// Server error code for a unique index violation
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Recipe as stored in the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecipeDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    instructions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    level: Option<Level>,
    #[serde(default)]
    ingredients: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_archived: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created: Option<BsonDateTime>,
}

fn to_bson_datetime(dt: DateTime<Utc>) -> BsonDateTime {
    BsonDateTime::from_millis(dt.timestamp_millis())
}

impl From<&Recipe> for RecipeDocument {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id.object_id(),
            title: recipe.title.clone(),
            instructions: recipe.instructions.clone(),
            level: recipe.level,
            ingredients: recipe.ingredients.clone(),
            image: recipe.image.clone(),
            duration: recipe.duration,
            is_archived: recipe.is_archived,
            created: recipe.created.map(to_bson_datetime),
        }
    }
}

impl From<RecipeDocument> for Recipe {
    fn from(doc: RecipeDocument) -> Self {
        Self {
            id: RecipeId::from(doc.id),
            title: doc.title,
            instructions: doc.instructions,
            level: doc.level,
            ingredients: doc.ingredients,
            image: doc.image,
            duration: doc.duration,
            is_archived: doc.is_archived,
            created: doc
                .created
                .and_then(|c| DateTime::from_timestamp_millis(c.timestamp_millis())),
        }
    }
}

/// Build the `$set` document for the fields present in `patch`.
fn set_document(patch: &RecipePatch) -> Document {
    let mut set = Document::new();
    if let Some(title) = &patch.title {
        set.insert("title", title.as_str());
    }
    if let Some(instructions) = &patch.instructions {
        set.insert("instructions", instructions.as_str());
    }
    if let Some(level) = patch.level {
        set.insert("level", level.as_str());
    }
    if let Some(ingredients) = &patch.ingredients {
        set.insert("ingredients", ingredients.clone());
    }
    if let Some(image) = &patch.image {
        set.insert("image", image.as_str());
    }
    if let Some(duration) = patch.duration {
        set.insert("duration", duration);
    }
    if let Some(is_archived) = patch.is_archived {
        set.insert("isArchived", is_archived);
    }
    if let Some(created) = patch.created {
        set.insert("created", to_bson_datetime(created));
    }
    set
}

fn is_duplicate_key(err: &MongoError) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

impl From<MongoError> for StoreError {
    fn from(err: MongoError) -> Self {
        if is_duplicate_key(&err) {
            StoreError::DuplicateTitle
        } else {
            StoreError::Database(err.to_string())
        }
    }
}

/// Store backed by a single MongoDB collection.
pub struct MongoStore {
    collection: Collection<RecipeDocument>,
}

impl MongoStore {
    /// Connect, verify the server responds, and ensure the unique title index.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(&config.uri).await?;
        let database = client.database(&config.name);
        database.run_command(doc! { "ping": 1 }).await?;

        let collection = database.collection::<RecipeDocument>(&config.collection);
        let index = IndexModel::builder()
            .keys(doc! { "title": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        collection.create_index(index).await?;

        tracing::info!(
            database = %config.name,
            collection = %config.collection,
            "Connected to MongoDB"
        );

        Ok(Self { collection })
    }
}

#[async_trait]
impl RecipeStore for MongoStore {
    async fn create(&self, recipe: NewRecipe) -> Result<Recipe, StoreError> {
        let document = RecipeDocument::from(&Recipe::from_new(RecipeId::new(), recipe));
        self.collection.insert_one(&document).await?;
        Ok(Recipe::from(document))
    }

    async fn find_all(&self) -> Result<Vec<Recipe>, StoreError> {
        let cursor = self.collection.find(doc! {}).sort(doc! { "_id": 1 }).await?;
        let docs: Vec<RecipeDocument> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(Recipe::from).collect())
    }

    async fn find_by_id(&self, id: RecipeId) -> Result<Option<Recipe>, StoreError> {
        let doc = self
            .collection
            .find_one(doc! { "_id": id.object_id() })
            .await?;
        Ok(doc.map(Recipe::from))
    }

    async fn find_by_id_and_update(
        &self,
        id: RecipeId,
        patch: RecipePatch,
    ) -> Result<Option<Recipe>, StoreError> {
        let set = set_document(&patch);
        if set.is_empty() {
            // MongoDB rejects an empty $set
            return self.find_by_id(id).await;
        }
        let doc = self
            .collection
            .find_one_and_update(doc! { "_id": id.object_id() }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?;
        Ok(doc.map(Recipe::from))
    }

    async fn find_by_id_and_delete(&self, id: RecipeId) -> Result<Option<Recipe>, StoreError> {
        let doc = self
            .collection
            .find_one_and_delete(doc! { "_id": id.object_id() })
            .await?;
        Ok(doc.map(Recipe::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::Bson;

    fn sample() -> Recipe {
        Recipe::from_new(
            RecipeId::new(),
            NewRecipe {
                title: "Tacos".to_string(),
                instructions: "Cook it".to_string(),
                level: Some(Level::AmateurChef),
                ingredients: vec!["tortilla".to_string()],
                duration: Some(20.0),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_document_round_trip_is_lossless() {
        let recipe = sample();
        assert_eq!(Recipe::from(RecipeDocument::from(&recipe)), recipe);
    }

    #[test]
    fn test_sub_millisecond_created_survives_storage() {
        let created = DateTime::parse_from_rfc3339("2024-05-01T10:00:00.123456Z")
            .unwrap()
            .with_timezone(&Utc);
        let recipe = Recipe::from_new(
            RecipeId::new(),
            NewRecipe {
                title: "Soup".to_string(),
                instructions: "Simmer".to_string(),
                created: Some(created),
                ..Default::default()
            },
        );
        assert_eq!(Recipe::from(RecipeDocument::from(&recipe)), recipe);
    }

    #[test]
    fn test_document_uses_stored_field_names() {
        let mut recipe = sample();
        recipe.is_archived = Some(true);
        let doc = mongodb::bson::to_document(&RecipeDocument::from(&recipe)).unwrap();
        assert_eq!(doc.get("_id"), Some(&Bson::ObjectId(recipe.id.object_id())));
        assert_eq!(doc.get_str("level").unwrap(), "Amateur Chef");
        assert!(doc.get_bool("isArchived").unwrap());
        assert!(matches!(doc.get("created"), Some(Bson::DateTime(_))));
        assert!(doc.get("image").is_none());
    }

    #[test]
    fn test_set_document_only_present_fields() {
        let set = set_document(&RecipePatch {
            duration: Some(42.0),
            is_archived: Some(false),
            ..Default::default()
        });
        assert_eq!(set.len(), 2);
        assert_eq!(set.get_f64("duration").unwrap(), 42.0);
        assert!(!set.get_bool("isArchived").unwrap());
    }

    #[test]
    fn test_set_document_empty_patch() {
        assert!(set_document(&RecipePatch::default()).is_empty());
    }
}
