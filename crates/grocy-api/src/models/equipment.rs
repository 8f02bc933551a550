use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;

/// An equipment record (`/objects/equipment`) with its custom fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    #[serde(deserialize_with = "lenient::i64")]
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub instruction_manual_file_name: Option<String>,
    /// Grocy "userfields"; `null` when none are defined.
    #[serde(default, deserialize_with = "userfields")]
    pub userfields: BTreeMap<String, Value>,
}

fn userfields<'de, D: serde::Deserializer<'de>>(d: D) -> Result<BTreeMap<String, Value>, D::Error> {
    Ok(Option::<BTreeMap<String, Value>>::deserialize(d)?.unwrap_or_default())
}

impl Equipment {
    /// Custom fields that carry a value, in name order.
    pub fn filled_userfields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.userfields.iter().filter_map(|(k, v)| {
            let blank = match v {
                Value::Null => true,
                Value::String(s) => s.trim().is_empty(),
                _ => false,
            };
            (!blank).then_some((k.as_str(), v))
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn skips_blank_userfields() {
        let eq: Equipment = serde_json::from_str(
            r#"{"id":"1","name":"Freezer","userfields":{"temperature":"-18","serial":"","power":null}}"#,
        )
        .unwrap();
        let filled: Vec<_> = eq.filled_userfields().map(|(k, _)| k).collect();
        assert_eq!(filled, vec!["temperature"]);
    }

    #[test]
    fn null_userfields_decode_empty() {
        let eq: Equipment = serde_json::from_str(r#"{"id":2,"name":"Drill","userfields":null}"#).unwrap();
        assert!(eq.userfields.is_empty());
    }
}
