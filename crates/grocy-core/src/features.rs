// ── Feature resolver ──
//
// Maps Grocy's `FEATURE_FLAG_*` settings onto the set of entity keys that
// may exist. Runs once per setup; a config reload re-resolves.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use grocy_api::models::SystemConfig;

use crate::entity::EntityKey;

/// What to do when the server config omits a feature flag entirely.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MissingFlagPolicy {
    /// Treat an absent flag as enabled.
    Enabled,
    /// Only flags present in the payload can enable entities.
    #[default]
    Disabled,
}

/// Static flag → keys table, in resolution order.
pub const FEATURE_FLAGS: [(&str, &[EntityKey]); 7] = [
    (
        "FEATURE_FLAG_STOCK",
        &[
            EntityKey::Stock,
            EntityKey::MissingProducts,
            EntityKey::ExpiredProducts,
            EntityKey::ExpiringProducts,
            EntityKey::OverdueProducts,
        ],
    ),
    ("FEATURE_FLAG_SHOPPINGLIST", &[EntityKey::ShoppingList]),
    (
        "FEATURE_FLAG_TASKS",
        &[EntityKey::Tasks, EntityKey::OverdueTasks],
    ),
    (
        "FEATURE_FLAG_CHORES",
        &[EntityKey::Chores, EntityKey::OverdueChores],
    ),
    ("FEATURE_FLAG_RECIPES", &[EntityKey::MealPlan]),
    (
        "FEATURE_FLAG_BATTERIES",
        &[EntityKey::Batteries, EntityKey::OverdueBatteries],
    ),
    ("FEATURE_FLAG_EQUIPMENT", &[EntityKey::Equipment]),
];

/// A flag is on unless its value is exactly `false` or the string `"0"`.
pub fn flag_enabled(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s != "0",
        _ => true,
    }
}

/// Resolve the ordered set of available entity keys.
///
/// An empty payload yields no keys regardless of policy.
pub fn resolve_available(config: &SystemConfig, policy: MissingFlagPolicy) -> Vec<EntityKey> {
    if config.is_empty() {
        return Vec::new();
    }

    FEATURE_FLAGS
        .iter()
        .filter(|(flag, _)| {
            config
                .get(flag)
                .map_or(policy == MissingFlagPolicy::Enabled, flag_enabled)
        })
        .flat_map(|(_, keys)| keys.iter().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn config(value: Value) -> SystemConfig {
        serde_json::from_value(value).unwrap_or_default()
    }

    #[test]
    fn stock_on_tasks_off() {
        let keys = resolve_available(
            &config(json!({"FEATURE_FLAG_STOCK": true, "FEATURE_FLAG_TASKS": false})),
            MissingFlagPolicy::Disabled,
        );
        assert_eq!(
            keys,
            vec![
                EntityKey::Stock,
                EntityKey::MissingProducts,
                EntityKey::ExpiredProducts,
                EntityKey::ExpiringProducts,
                EntityKey::OverdueProducts,
            ]
        );
    }

    #[test]
    fn legacy_string_flags() {
        let keys = resolve_available(
            &config(json!({"FEATURE_FLAG_CHORES": "1", "FEATURE_FLAG_BATTERIES": "0"})),
            MissingFlagPolicy::Disabled,
        );
        assert_eq!(keys, vec![EntityKey::Chores, EntityKey::OverdueChores]);
    }

    #[test]
    fn false_and_zero_never_contribute() {
        for value in [json!(false), json!("0")] {
            let mut payload = serde_json::Map::new();
            for (flag, _) in FEATURE_FLAGS {
                payload.insert(flag.to_owned(), value.clone());
            }
            let keys = resolve_available(&config(Value::Object(payload)), MissingFlagPolicy::Enabled);
            assert!(keys.is_empty(), "{value}");
        }
    }

    #[test]
    fn other_values_count_as_enabled() {
        assert!(flag_enabled(&json!(true)));
        assert!(flag_enabled(&json!("1")));
        assert!(flag_enabled(&json!("false")));
        assert!(flag_enabled(&json!(0)));
        assert!(!flag_enabled(&json!(false)));
        assert!(!flag_enabled(&json!("0")));
    }

    #[test]
    fn missing_flags_follow_policy() {
        let payload = config(json!({"FEATURE_FLAG_RECIPES": true}));
        assert_eq!(
            resolve_available(&payload, MissingFlagPolicy::Disabled),
            vec![EntityKey::MealPlan]
        );
        assert_eq!(
            resolve_available(&payload, MissingFlagPolicy::Enabled).len(),
            14
        );
    }

    #[test]
    fn empty_payload_yields_nothing() {
        assert!(resolve_available(&SystemConfig::default(), MissingFlagPolicy::Enabled).is_empty());
    }
}
