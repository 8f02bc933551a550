use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Due, lenient};

/// A chore with its scheduling state (`/chores`).
///
/// `/chores` reports `chore_id`/`chore_name`; they serialize back out as
/// `id`/`name`. The description comes from `/objects/chores`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chore {
    #[serde(rename(deserialize = "chore_id"), deserialize_with = "lenient::i64")]
    pub id: i64,
    #[serde(rename(deserialize = "chore_name"), default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
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
    pub next_estimated_execution_time: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient::bool")]
    pub track_date_only: bool,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub next_execution_assigned_to_user_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::bool")]
    pub is_rescheduled: bool,
}

impl Chore {
    /// Next execution, at day precision when the chore tracks dates only.
    pub fn due(&self) -> Option<Due> {
        self.next_estimated_execution_time.map(|t| {
            if self.track_date_only {
                Due::Date(t.date())
            } else {
                Due::DateTime(t)
            }
        })
    }
}
