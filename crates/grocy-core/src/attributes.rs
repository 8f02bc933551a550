// ── Attribute serialization ──
//
// Every record the bridge exposes implements `ToAttributes`, producing an
// `AttributeValue` tree that is independent of any wire format. The HTTP
// layer and CLI render that tree with serde.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::Value;

use grocy_api::models::{
    Battery, Chore, Due, Equipment, MealPlanEntry, MissingProduct, ProductDetails, Recipe,
    ShoppingListItem, StockEntry, Task,
};

use crate::store::EntityData;

/// Ordered attribute map.
pub type Attributes = IndexMap<String, AttributeValue>;

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<AttributeValue>),
    Map(Attributes),
}

pub trait ToAttributes {
    fn to_attributes(&self) -> Attributes;

    fn to_attribute_value(&self) -> AttributeValue {
        AttributeValue::Map(self.to_attributes())
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<usize> for AttributeValue {
    fn from(v: usize) -> Self {
        Self::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Due> for AttributeValue {
    fn from(v: Due) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<NaiveDateTime> for AttributeValue {
    fn from(v: NaiveDateTime) -> Self {
        Self::Text(v.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl From<&Value> for AttributeValue {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or(Self::Null),
            Value::String(s) => Self::Text(s.clone()),
            Value::Array(items) => Self::List(items.iter().map(Self::from).collect()),
            Value::Object(map) => Self::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Text(s) => serializer.serialize_str(s),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

/// Build an `Attributes` map from `(name, value)` pairs.
macro_rules! attrs {
    ($($name:literal => $value:expr),* $(,)?) => {{
        let mut map = Attributes::new();
        $(map.insert($name.to_owned(), AttributeValue::from($value));)*
        map
    }};
}

// ── Records ──────────────────────────────────────────────────────────

impl ToAttributes for ProductDetails {
    fn to_attributes(&self) -> Attributes {
        attrs! {
            "id" => self.id,
            "name" => self.name.as_str(),
            "description" => self.description.clone(),
            "location_id" => self.location_id,
            "product_group_id" => self.product_group_id,
            "qu_id_stock" => self.qu_id_stock,
            "min_stock_amount" => self.min_stock_amount,
            "picture_file_name" => self.picture_file_name.clone(),
        }
    }
}

impl ToAttributes for StockEntry {
    fn to_attributes(&self) -> Attributes {
        let mut map = attrs! {
            "id" => self.product_id,
            "name" => self.name(),
            "available_amount" => self.available_amount(),
            "amount_opened" => self.amount_opened,
            "best_before_date" => self.best_before_date.map(Due::Date),
        };
        if let Some(product) = &self.product {
            map.insert("product".into(), product.to_attribute_value());
        }
        map
    }
}

impl ToAttributes for MissingProduct {
    fn to_attributes(&self) -> Attributes {
        attrs! {
            "id" => self.id,
            "name" => self.name.as_str(),
            "amount_missing" => self.amount_missing,
            "is_partly_in_stock" => self.is_partly_in_stock,
        }
    }
}

impl ToAttributes for Chore {
    fn to_attributes(&self) -> Attributes {
        attrs! {
            "id" => self.id,
            "name" => self.name.as_str(),
            "description" => self.description.clone(),
            "last_tracked_time" => self.last_tracked_time,
            "next_estimated_execution_time" => self.next_estimated_execution_time,
            "track_date_only" => self.track_date_only,
            "next_execution_assigned_to_user_id" => self.next_execution_assigned_to_user_id,
        }
    }
}

impl ToAttributes for Task {
    fn to_attributes(&self) -> Attributes {
        attrs! {
            "id" => self.id,
            "name" => self.name.as_str(),
            "description" => self.description.clone(),
            "due_date" => self.due(),
            "done" => self.done,
            "category_id" => self.category_id,
            "assigned_to_user_id" => self.assigned_to_user_id,
        }
    }
}

impl ToAttributes for Battery {
    fn to_attributes(&self) -> Attributes {
        attrs! {
            "id" => self.id,
            "name" => self.name(),
            "description" => self.description(),
            "used_in" => self.details.as_ref().and_then(|d| d.used_in.clone()),
            "charge_interval_days" => self.details.as_ref().and_then(|d| d.charge_interval_days),
            "last_tracked_time" => self.last_tracked_time,
            "next_estimated_charge_time" => self.next_estimated_charge_time,
        }
    }
}

impl ToAttributes for Recipe {
    fn to_attributes(&self) -> Attributes {
        attrs! {
            "id" => self.id,
            "name" => self.name.as_str(),
            "description" => self.description.clone(),
            "picture_file_name" => self.picture_file_name.clone(),
            "base_servings" => self.base_servings,
            "desired_servings" => self.desired_servings,
        }
    }
}

impl ToAttributes for MealPlanEntry {
    fn to_attributes(&self) -> Attributes {
        let mut map = attrs! {
            "id" => self.id,
            "day" => self.due(),
            "type" => self.entry_type.clone(),
            "recipe_id" => self.recipe_id,
            "recipe_servings" => self.recipe_servings,
            "note" => self.note.clone(),
            "done" => self.done,
        };
        if let Some(recipe) = &self.recipe {
            map.insert("recipe".into(), recipe.to_attribute_value());
            if let Some(file) = &recipe.picture_file_name {
                map.insert("picture_url".into(), picture_url("recipepictures", file).into());
            }
        }
        map
    }
}

impl ToAttributes for ShoppingListItem {
    fn to_attributes(&self) -> Attributes {
        let mut map = attrs! {
            "id" => self.id,
            "product_id" => self.product_id,
            "name" => self.product_name(),
            "note" => self.note.clone(),
            "amount" => self.amount,
            "shopping_list_id" => self.shopping_list_id,
            "done" => self.done,
        };
        if let Some(product) = &self.product {
            map.insert("product".into(), product.to_attribute_value());
        }
        map
    }
}

impl ToAttributes for Equipment {
    fn to_attributes(&self) -> Attributes {
        let userfields = self
            .userfields
            .iter()
            .map(|(k, v)| (k.clone(), AttributeValue::from(v)))
            .collect();
        attrs! {
            "id" => self.id,
            "name" => self.name.as_str(),
            "description" => self.description.clone(),
            "instruction_manual_file_name" => self.instruction_manual_file_name.clone(),
            "userfields" => AttributeValue::Map(userfields),
        }
    }
}

/// Proxied picture path served by the bridge's image endpoint.
pub fn picture_url(picture_type: &str, file_name: &str) -> String {
    format!(
        "/api/grocy/{picture_type}/{}",
        BASE64.encode(file_name.as_bytes())
    )
}

fn list<T: ToAttributes>(records: &[T]) -> Vec<AttributeValue> {
    records.iter().map(ToAttributes::to_attribute_value).collect()
}

impl EntityData {
    /// Every record as an attribute value, in fetch order.
    pub fn to_attribute_list(&self) -> Vec<AttributeValue> {
        match self {
            Self::Stock(v) | Self::Products(v) => list(v),
            Self::MissingProducts(v) => list(v),
            Self::Chores(v) => list(v),
            Self::Tasks(v) => list(v),
            Self::ShoppingList(v) => list(v),
            Self::MealPlan(v) => list(v),
            Self::Batteries(v) => list(v),
            Self::Equipment(v) => list(v),
        }
    }
}
