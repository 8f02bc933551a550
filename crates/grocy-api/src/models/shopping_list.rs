use serde::{Deserialize, Serialize};

use super::{ProductDetails, lenient};

fn default_list_id() -> i64 {
    1
}

/// A shopping list row (`/objects/shopping_list`), optionally joined with
/// its product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingListItem {
    #[serde(deserialize_with = "lenient::i64")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub product_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub note: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub amount: f64,
    #[serde(default = "default_list_id", deserialize_with = "lenient::i64")]
    pub shopping_list_id: i64,
    #[serde(default, deserialize_with = "lenient::bool")]
    pub done: bool,
    #[serde(default)]
    pub product: Option<ProductDetails>,
}

impl ShoppingListItem {
    /// Product name; free-text rows fall back to their note.
    pub fn product_name(&self) -> String {
        self.product
            .as_ref()
            .map(|p| p.name.clone())
            .or_else(|| self.note.clone())
            .unwrap_or_else(|| format!("Item {}", self.id))
    }
}
