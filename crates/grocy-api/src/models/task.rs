use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Due, lenient};

/// A task (`/tasks`). Grocy only lists tasks that are not done yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(deserialize_with = "lenient::i64")]
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::bool")]
    pub done: bool,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub category_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub assigned_to_user_id: Option<i64>,
}

impl Task {
    pub fn due(&self) -> Option<Due> {
        self.due_date.map(Due::Date)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn empty_due_date_is_none() {
        let task: Task =
            serde_json::from_str(r#"{"id":"2","name":"Taxes","description":"","due_date":"","done":"0"}"#).unwrap();
        assert_eq!(task.due(), None);
        assert_eq!(task.description, None);
        assert!(!task.done);
    }
}
