use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Due, lenient};

/// Battery master data (`/objects/batteries`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryDetails {
    #[serde(deserialize_with = "lenient::i64")]
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub used_in: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub charge_interval_days: Option<i64>,
}

/// A battery with its charge cycle state (`/batteries`), optionally joined
/// with its master data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Battery {
    #[serde(rename(deserialize = "battery_id"), deserialize_with = "lenient::i64")]
    pub id: i64,
    #[serde(
        default,
        deserialize_with = "lenient::opt_datetime",
        serialize_with = "lenient::grocy_datetime::serialize"
    )]
    pub last_tracked_time: Option<NaiveDateTime>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_datetime",
        serialize_with = "lenient::grocy_datetime::serialize"
    )]
    pub next_estimated_charge_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub details: Option<BatteryDetails>,
}

impl Battery {
    pub fn name(&self) -> String {
        self.details
            .as_ref()
            .map_or_else(|| format!("Battery {}", self.id), |d| d.name.clone())
    }

    pub fn description(&self) -> Option<&str> {
        self.details.as_ref().and_then(|d| d.description.as_deref())
    }

    pub fn due(&self) -> Option<Due> {
        self.next_estimated_charge_time.map(Due::DateTime)
    }
}
