use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Due, lenient};

/// A recipe (`/objects/recipes`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(deserialize_with = "lenient::i64")]
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub picture_file_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub base_servings: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub desired_servings: Option<f64>,
}

/// A meal plan row (`/objects/meal_plan`), optionally joined with its recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlanEntry {
    #[serde(deserialize_with = "lenient::i64")]
    pub id: i64,
    #[serde(deserialize_with = "lenient::date")]
    pub day: NaiveDate,
    #[serde(rename = "type", default, deserialize_with = "lenient::opt_string")]
    pub entry_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub recipe_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub recipe_servings: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub note: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub product_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub section_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::bool")]
    pub done: bool,
    #[serde(default)]
    pub recipe: Option<Recipe>,
}

impl MealPlanEntry {
    pub fn due(&self) -> Due {
        Due::Date(self.day)
    }

    /// Recipe name, or the note for note-only entries.
    pub fn summary(&self) -> String {
        self.recipe
            .as_ref()
            .map(|r| r.name.clone())
            .or_else(|| self.note.clone())
            .unwrap_or_else(|| format!("Meal plan entry {}", self.id))
    }
}
