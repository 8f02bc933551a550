use chrono::NaiveDateTime;
use serde::Serialize;

use super::grocy_time;
use crate::filter::QueryFilter;
use crate::models::Task;
use crate::{Error, GrocyClient};

impl GrocyClient {
    pub async fn tasks(&self, filters: &[QueryFilter]) -> Result<Vec<Task>, Error> {
        self.get_filtered("tasks", filters).await
    }

    pub async fn complete_task(
        &self,
        task_id: i64,
        done_time: Option<NaiveDateTime>,
    ) -> Result<(), Error> {
        #[derive(Serialize)]
        struct Body {
            #[serde(skip_serializing_if = "Option::is_none")]
            done_time: Option<String>,
        }

        self.post_no_response(
            &format!("tasks/{task_id}/complete"),
            &Body {
                done_time: grocy_time(done_time),
            },
        )
        .await
    }
}
