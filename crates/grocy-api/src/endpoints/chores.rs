use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::grocy_time;
use crate::filter::QueryFilter;
use crate::models::{Chore, lenient};
use crate::{Error, GrocyClient};

#[derive(Deserialize)]
struct ChoreDefinition {
    #[serde(deserialize_with = "lenient::i64")]
    id: i64,
    #[serde(default)]
    name: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    description: Option<String>,
}

impl GrocyClient {
    /// `GET /chores`, optionally joined with `/objects/chores` for
    /// descriptions.
    pub async fn chores(
        &self,
        filters: &[QueryFilter],
        with_details: bool,
    ) -> Result<Vec<Chore>, Error> {
        let mut chores: Vec<Chore> = self.get_filtered("chores", filters).await?;
        if with_details && !chores.is_empty() {
            let definitions: Vec<ChoreDefinition> = self.get("objects/chores").await?;
            let by_id: HashMap<i64, ChoreDefinition> =
                definitions.into_iter().map(|d| (d.id, d)).collect();
            for chore in &mut chores {
                if let Some(def) = by_id.get(&chore.id) {
                    chore.description.clone_from(&def.description);
                    if chore.name.is_empty() {
                        chore.name.clone_from(&def.name);
                    }
                }
            }
        }
        Ok(chores)
    }

    pub async fn execute_chore(
        &self,
        chore_id: i64,
        done_by: Option<i64>,
        tracked_time: Option<NaiveDateTime>,
        skipped: bool,
    ) -> Result<(), Error> {
        #[derive(Serialize)]
        struct Body {
            #[serde(skip_serializing_if = "Option::is_none")]
            tracked_time: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            done_by: Option<i64>,
            skipped: bool,
        }

        self.post_no_response(
            &format!("chores/{chore_id}/execute"),
            &Body {
                tracked_time: grocy_time(tracked_time),
                done_by,
                skipped,
            },
        )
        .await
    }
}
