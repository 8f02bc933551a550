// ── Entity adapters ──
//
// Read-only projections of the latest coordinator data into host-facing
// entity states: count sensors, list binary sensors, todo lists, and one
// sensor per filled-in equipment user field.

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;

use grocy_api::models::Equipment;

use crate::attributes::{AttributeValue, Attributes};
use crate::entity::{EntityKey, EntityKind};
use crate::store::{CoordinatorData, EntityData};
use crate::todo::{self, TodoItem};

const EQUIPMENT_ICON: &str = "mdi:tools";

/// One entity as presented to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityState {
    pub entity_id: String,
    pub key: EntityKey,
    pub name: String,
    pub kind: EntityKind,
    /// `false` while the key has no data at all.
    pub available: bool,
    pub state: AttributeValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub icon: String,
    /// Last fetch failed; values are from an earlier one.
    pub stale: bool,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodoListState {
    pub entity_id: String,
    pub key: EntityKey,
    pub name: String,
    pub available: bool,
    pub items: Vec<TodoItem>,
}

fn list_attributes(key: EntityKey, data: Option<&EntityData>) -> Attributes {
    let mut attrs = Attributes::new();
    if let Some(data) = data {
        attrs.insert(
            key.to_string(),
            AttributeValue::List(data.to_attribute_list()),
        );
        attrs.insert("count".into(), data.len().into());
    }
    attrs
}

/// Count sensor (or list binary sensor, per the key's kind) for `key`.
pub fn entity_state(key: EntityKey, data: &CoordinatorData) -> EntityState {
    let snapshot = data.get(key);
    let records = snapshot.map(|s| s.data.as_ref());
    let kind = key.kind();

    let state = match (kind, records) {
        (_, None) => AttributeValue::Null,
        (EntityKind::Sensor, Some(r)) => r.len().into(),
        (EntityKind::BinarySensor, Some(r)) => (!r.is_empty()).into(),
    };

    EntityState {
        entity_id: format!("{kind}.grocy_{key}"),
        key,
        name: key.name().to_owned(),
        kind,
        available: records.is_some(),
        state,
        unit: key.unit().map(str::to_owned),
        icon: key.icon().to_owned(),
        stale: snapshot.is_some_and(|s| s.stale),
        attributes: list_attributes(key, records),
    }
}

/// Binary sensors read "off" when nothing was fetched.
pub fn is_on(key: EntityKey, data: &CoordinatorData) -> bool {
    data.data(key).is_some_and(|d| !d.is_empty())
}

pub fn todo_list_state(key: EntityKey, data: &CoordinatorData, now: NaiveDateTime) -> TodoListState {
    let records = data.data(key);
    TodoListState {
        entity_id: format!("todo.grocy_{key}"),
        key,
        name: key.name().to_owned(),
        available: records.is_some(),
        items: records.map(|r| todo::items(key, r, now)).unwrap_or_default(),
    }
}

// ── Equipment field sensors ──────────────────────────────────────────

/// Icon and unit for a user field, from its value type and name.
pub fn field_presentation(field: &str, value: &Value) -> (&'static str, Option<&'static str>) {
    match value {
        Value::Bool(true) => ("mdi:checkbox-marked", None),
        Value::Bool(false) => ("mdi:checkbox-blank-outline", None),
        Value::Number(_) => ("mdi:numeric", None),
        _ => {
            let name = field.to_lowercase();
            if name.contains("temperature") {
                ("mdi:thermometer", Some("°C"))
            } else if name.contains("volt") {
                ("mdi:flash", Some("V"))
            } else if name.contains("power") || name.contains("watt") {
                ("mdi:power-plug", Some("W"))
            } else if name.contains("weight") {
                ("mdi:weight", Some("kg"))
            } else if ["length", "width", "height"].iter().any(|w| name.contains(w)) {
                ("mdi:ruler", Some("m"))
            } else if name.contains("date") {
                ("mdi:calendar", None)
            } else {
                (EQUIPMENT_ICON, None)
            }
        }
    }
}

fn field_state(equipment: &Equipment, field: &str, value: &Value, stale: bool) -> EntityState {
    let (icon, unit) = field_presentation(field, value);
    let mut attributes = Attributes::new();
    attributes.insert("equipment_name".into(), equipment.name.as_str().into());
    attributes.insert("equipment_id".into(), equipment.id.into());
    attributes.insert("field_name".into(), field.into());

    EntityState {
        entity_id: format!("sensor.grocy_equipment_{}_{field}", equipment.id),
        key: EntityKey::Equipment,
        name: format!("{} {field}", equipment.name),
        kind: EntityKind::Sensor,
        available: true,
        state: AttributeValue::from(value),
        unit: unit.map(str::to_owned),
        icon: icon.to_owned(),
        stale,
        attributes,
    }
}

/// One sensor per non-empty user field across all equipment.
pub fn equipment_field_states(data: &CoordinatorData) -> Vec<EntityState> {
    let Some(snapshot) = data.get(EntityKey::Equipment) else {
        return Vec::new();
    };
    let EntityData::Equipment(equipment) = snapshot.data.as_ref() else {
        return Vec::new();
    };
    equipment
        .iter()
        .flat_map(|eq| {
            eq.filled_userfields()
                .map(move |(field, value)| field_state(eq, field, value, snapshot.stale))
        })
        .collect()
}

/// States for every registered, enabled key, followed by equipment field
/// sensors when equipment is among them.
pub fn all_states(keys: &[EntityKey], data: &CoordinatorData) -> Vec<EntityState> {
    let mut states: Vec<EntityState> = keys.iter().map(|k| entity_state(*k, data)).collect();
    if keys.contains(&EntityKey::Equipment) {
        states.extend(equipment_field_states(data));
    }
    states
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn missing_data_is_unavailable_and_off() {
        let data = CoordinatorData::default();
        let state = entity_state(EntityKey::OverdueChores, &data);
        assert!(!state.available);
        assert_eq!(state.entity_id, "binary_sensor.grocy_overdue_chores");
        assert_eq!(state.state, AttributeValue::Null);
        assert!(!is_on(EntityKey::OverdueChores, &data));
        assert!(state.attributes.is_empty());
    }

    #[test]
    fn field_icons_follow_name_and_type() {
        assert_eq!(
            field_presentation("Temperature", &json!("-18")),
            ("mdi:thermometer", Some("°C"))
        );
        assert_eq!(
            field_presentation("input_voltage", &json!("230")),
            ("mdi:flash", Some("V"))
        );
        assert_eq!(field_presentation("temperature", &json!(4)), ("mdi:numeric", None));
        assert_eq!(
            field_presentation("warranty", &json!(false)),
            ("mdi:checkbox-blank-outline", None)
        );
        assert_eq!(
            field_presentation("purchase_date", &json!("2020-01-01")),
            ("mdi:calendar", None)
        );
        assert_eq!(field_presentation("serial", &json!("X1")), ("mdi:tools", None));
    }

    #[test]
    fn equipment_fields_named_after_owner() {
        let eq: Equipment = serde_json::from_value(json!({
            "id": 2,
            "name": "Freezer",
            "userfields": {"temperature": "-18", "notes": ""}
        }))
        .unwrap();
        let state = field_state(&eq, "temperature", &json!("-18"), false);
        assert_eq!(state.entity_id, "sensor.grocy_equipment_2_temperature");
        assert_eq!(state.name, "Freezer temperature");
        assert_eq!(state.unit.as_deref(), Some("°C"));
        assert_eq!(state.attributes["equipment_id"], AttributeValue::Int(2));
    }
}
