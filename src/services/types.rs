use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of the recipe record being populated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(Uuid);

impl RecipeId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RecipeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RecipeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Downloaded media produced by video verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedMedia {
    pub file_uri: String,
    pub mime_type: String,
}

impl VerifiedMedia {
    pub fn new(file_uri: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            file_uri: file_uri.into(),
            mime_type: mime_type.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, amount: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount: Some(amount),
            unit: Some(unit.into()),
        }
    }

    /// Ingredient without a measured quantity ("salt to taste")
    pub fn unmeasured(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount: None,
            unit: None,
        }
    }
}

/// Structured detail extracted from a cooking video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDetail {
    pub ingredients: Vec<Ingredient>,
    pub tags: Vec<String>,
    /// Total cook time in minutes
    pub cook_time: u32,
    pub servings: u32,
    pub description: String,
}

impl RecipeDetail {
    /// Metadata part of the detail, combined with the submitted title
    pub fn meta(&self, title: &str) -> DetailMeta {
        DetailMeta {
            cook_time: self.cook_time,
            servings: self.servings,
            description: self.description.clone(),
            title: title.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailMeta {
    pub cook_time: u32,
    pub servings: u32,
    pub description: String,
    pub title: String,
}

/// Handle to the caption track resolved for a video
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Caption(String);

impl Caption {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Caption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Narrative briefing generated for a recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Briefing {
    pub caption: Caption,
    #[serde(default)]
    pub content: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_id_parse_and_display() {
        let id = RecipeId::new();
        let parsed: RecipeId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<RecipeId>().is_err());
    }

    #[test]
    fn test_ingredient_omits_missing_quantity() {
        let json = serde_json::to_value(Ingredient::unmeasured("salt")).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "salt" }));

        let parsed: Ingredient =
            serde_json::from_value(serde_json::json!({ "name": "kimchi", "amount": 200.0, "unit": "g" }))
                .unwrap();
        assert_eq!(parsed, Ingredient::new("kimchi", 200.0, "g"));
    }

    #[test]
    fn test_detail_meta_uses_submitted_title() {
        let detail = RecipeDetail {
            ingredients: vec![],
            tags: vec![],
            cook_time: 30,
            servings: 2,
            description: "Spicy stew".to_string(),
        };

        let meta = detail.meta("Kimchi Jjigae");
        assert_eq!(meta.cook_time, 30);
        assert_eq!(meta.servings, 2);
        assert_eq!(meta.title, "Kimchi Jjigae");
    }

    #[test]
    fn test_caption_blank() {
        assert!(Caption::new("  ").is_blank());
        assert!(!Caption::new("cap-1").is_blank());
        assert_eq!(serde_json::to_string(&Caption::new("cap-1")).unwrap(), "\"cap-1\"");
    }
}
