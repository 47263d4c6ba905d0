//! Recipe record types.
//!
//! `Recipe` is the stored record as returned to clients. `NewRecipe` and
//! `RecipePatch` are the validated inputs for creation and partial update;
//! they are only ever built by the validation layer.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Difficulty of a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    #[serde(rename = "Easy Peasy")]
    EasyPeasy,
    #[serde(rename = "Amateur Chef")]
    AmateurChef,
    #[serde(rename = "UltraPro Chef")]
    UltraProChef,
}

impl Level {
    /// Wire names accepted for `level`, in declaration order.
    pub const ALLOWED: &'static [&'static str] = &["Easy Peasy", "Amateur Chef", "UltraPro Chef"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::EasyPeasy => "Easy Peasy",
            Level::AmateurChef => "Amateur Chef",
            Level::UltraProChef => "UltraPro Chef",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Easy Peasy" => Some(Level::EasyPeasy),
            "Amateur Chef" => Some(Level::AmateurChef),
            "UltraPro Chef" => Some(Level::UltraProChef),
            _ => None,
        }
    }
}

/// Storage-assigned recipe identifier, rendered as a 24-character hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecipeId(ObjectId);

impl RecipeId {
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }
}

impl Default for RecipeId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ObjectId> for RecipeId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid recipe id: {0}")]
pub struct InvalidRecipeId(pub String);

impl FromStr for RecipeId {
    type Err = InvalidRecipeId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s)
            .map(Self)
            .map_err(|_| InvalidRecipeId(s.to_string()))
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

impl Serialize for RecipeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_hex())
    }
}

impl<'de> Deserialize<'de> for RecipeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A stored recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(rename = "_id")]
    pub id: RecipeId,
    pub title: String,
    pub instructions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_duration"
    )]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
}

/// Whole durations are written as integers so `15` echoes back as `15`.
fn serialize_duration<S: Serializer>(duration: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match *duration {
        Some(d) if d.fract() == 0.0 && d.abs() < i64::MAX as f64 => {
            serializer.serialize_some(&(d as i64))
        }
        Some(d) => serializer.serialize_some(&d),
        None => serializer.serialize_none(),
    }
}

/// Storage keeps millisecond precision; timestamps are cut to match.
fn to_stored_precision(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.trunc_subsecs(3)
}

impl Recipe {
    /// Materialize a new record with a fresh id. `created` defaults to now.
    pub fn from_new(id: RecipeId, new: NewRecipe) -> Self {
        Self {
            id,
            title: new.title,
            instructions: new.instructions,
            level: new.level,
            ingredients: new.ingredients,
            image: new.image,
            duration: new.duration,
            is_archived: new.is_archived,
            created: Some(to_stored_precision(new.created.unwrap_or_else(Utc::now))),
        }
    }

    /// Apply the fields present in `patch`, leaving the others untouched.
    pub fn apply(&mut self, patch: RecipePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(instructions) = patch.instructions {
            self.instructions = instructions;
        }
        if let Some(level) = patch.level {
            self.level = Some(level);
        }
        if let Some(ingredients) = patch.ingredients {
            self.ingredients = ingredients;
        }
        if let Some(image) = patch.image {
            self.image = Some(image);
        }
        if let Some(duration) = patch.duration {
            self.duration = Some(duration);
        }
        if let Some(is_archived) = patch.is_archived {
            self.is_archived = Some(is_archived);
        }
        if let Some(created) = patch.created {
            self.created = Some(to_stored_precision(created));
        }
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// Validated payload for creating a recipe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewRecipe {
    pub title: String,
    pub instructions: String,
    pub level: Option<Level>,
    pub ingredients: Vec<String>,
    pub image: Option<String>,
    pub duration: Option<f64>,
    pub is_archived: Option<bool>,
    pub created: Option<DateTime<Utc>>,
}

/// Validated subset of recipe fields for a partial update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub instructions: Option<String>,
    pub level: Option<Level>,
    pub ingredients: Option<Vec<String>>,
    pub image: Option<String>,
    pub duration: Option<f64>,
    pub is_archived: Option<bool>,
    pub created: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tacos() -> NewRecipe {
        NewRecipe {
            title: "Tacos".to_string(),
            instructions: "Cook it".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_level_names_round_trip() {
        for name in Level::ALLOWED {
            let level = Level::from_name(name).unwrap();
            assert_eq!(level.as_str(), *name);
        }
        assert_eq!(Level::from_name("Master Chef"), None);
    }

    #[test]
    fn test_recipe_id_parse() {
        let id: RecipeId = "507f1f77bcf86cd799439011".parse().unwrap();
        assert_eq!(id.to_string(), "507f1f77bcf86cd799439011");
        assert!("not-an-id".parse::<RecipeId>().is_err());
        assert!("".parse::<RecipeId>().is_err());
    }

    #[test]
    fn test_from_new_defaults_created() {
        let recipe = Recipe::from_new(RecipeId::new(), tacos());
        assert!(recipe.created.is_some());
        assert!(recipe.ingredients.is_empty());
    }

    #[test]
    fn test_serialize_omits_absent_fields() {
        let mut recipe = Recipe::from_new(RecipeId::new(), tacos());
        recipe.created = None;
        let json = serde_json::to_value(&recipe).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj["title"], "Tacos");
        assert_eq!(obj["_id"], recipe.id.to_string());
        assert_eq!(obj["ingredients"], serde_json::json!([]));
        assert!(!obj.contains_key("level"));
        assert!(!obj.contains_key("isArchived"));
    }

    #[test]
    fn test_serialize_uses_wire_names() {
        let mut recipe = Recipe::from_new(RecipeId::new(), tacos());
        recipe.level = Some(Level::UltraProChef);
        recipe.is_archived = Some(true);
        let json = serde_json::to_value(&recipe).unwrap();
        assert_eq!(json["level"], "UltraPro Chef");
        assert_eq!(json["isArchived"], true);
    }

    #[test]
    fn test_apply_patch_only_touches_present_fields() {
        let mut recipe = Recipe::from_new(RecipeId::new(), tacos());
        let before = recipe.clone();
        recipe.apply(RecipePatch {
            duration: Some(42.0),
            ..Default::default()
        });
        assert_eq!(recipe.duration, Some(42.0));
        assert_eq!(recipe.title, before.title);
        assert_eq!(recipe.instructions, before.instructions);
        assert_eq!(recipe.created, before.created);
    }

    #[test]
    fn test_from_new_truncates_created_to_millis() {
        let created = DateTime::parse_from_rfc3339("2024-05-01T10:00:00.123456Z")
            .unwrap()
            .with_timezone(&Utc);
        let recipe = Recipe::from_new(
            RecipeId::new(),
            NewRecipe {
                created: Some(created),
                ..tacos()
            },
        );
        assert_eq!(
            recipe.created.unwrap().to_rfc3339(),
            "2024-05-01T10:00:00.123+00:00"
        );
        assert_eq!(
            Recipe::from_new(RecipeId::new(), tacos())
                .created
                .unwrap()
                .timestamp_subsec_nanos()
                % 1_000_000,
            0
        );
    }

    #[test]
    fn test_duration_serializes_whole_numbers_as_integers() {
        let mut recipe = Recipe::from_new(RecipeId::new(), tacos());
        recipe.duration = Some(15.0);
        assert_eq!(serde_json::to_value(&recipe).unwrap()["duration"], serde_json::json!(15));
        recipe.duration = Some(7.5);
        assert_eq!(serde_json::to_value(&recipe).unwrap()["duration"], serde_json::json!(7.5));
    }

    #[test]
    fn test_display_is_json() {
        let recipe = Recipe::from_new(RecipeId::new(), tacos());
        let rendered = recipe.to_string();
        let parsed: Recipe = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed, recipe);
    }
}
