use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::grocy_time;
use crate::filter::QueryFilter;
use crate::models::{Battery, BatteryDetails};
use crate::{Error, GrocyClient};

impl GrocyClient {
    /// `GET /batteries`, optionally joined with `/objects/batteries` for
    /// names and descriptions.
    pub async fn batteries(
        &self,
        filters: &[QueryFilter],
        with_details: bool,
    ) -> Result<Vec<Battery>, Error> {
        let mut batteries: Vec<Battery> = self.get_filtered("batteries", filters).await?;
        if with_details && !batteries.is_empty() {
            let details: Vec<BatteryDetails> = self.get("objects/batteries").await?;
            let mut by_id: HashMap<i64, BatteryDetails> =
                details.into_iter().map(|d| (d.id, d)).collect();
            for battery in &mut batteries {
                battery.details = by_id.remove(&battery.id);
            }
        }
        Ok(batteries)
    }

    pub async fn charge_battery(
        &self,
        battery_id: i64,
        tracked_time: Option<NaiveDateTime>,
    ) -> Result<(), Error> {
        #[derive(Serialize)]
        struct Body {
            #[serde(skip_serializing_if = "Option::is_none")]
            tracked_time: Option<String>,
        }

        self.post_no_response(
            &format!("batteries/{battery_id}/charge"),
            &Body {
                tracked_time: grocy_time(tracked_time),
            },
        )
        .await
    }
}
