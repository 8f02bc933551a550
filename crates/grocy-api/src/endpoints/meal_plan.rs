use std::collections::HashMap;

use crate::filter::QueryFilter;
use crate::models::{MealPlanEntry, Recipe};
use crate::{Error, GrocyClient};

impl GrocyClient {
    /// `GET /objects/meal_plan`, optionally joined with `/objects/recipes`.
    pub async fn meal_plan(
        &self,
        filters: &[QueryFilter],
        with_details: bool,
    ) -> Result<Vec<MealPlanEntry>, Error> {
        let mut entries: Vec<MealPlanEntry> =
            self.get_filtered("objects/meal_plan", filters).await?;
        if with_details && entries.iter().any(|e| e.recipe_id.is_some()) {
            let recipes: HashMap<i64, Recipe> = self
                .recipes()
                .await?
                .into_iter()
                .map(|r| (r.id, r))
                .collect();
            for entry in &mut entries {
                entry.recipe = entry.recipe_id.and_then(|id| recipes.get(&id).cloned());
            }
        }
        Ok(entries)
    }

    pub async fn recipes(&self) -> Result<Vec<Recipe>, Error> {
        self.get("objects/recipes").await
    }

    pub async fn consume_recipe(&self, recipe_id: i64) -> Result<(), Error> {
        self.post_no_response(
            &format!("recipes/{recipe_id}/consume"),
            &serde_json::json!({}),
        )
        .await
    }
}
