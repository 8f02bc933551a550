use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::lenient;

/// Product master data (`/objects/products` row, or the `product` object
/// embedded in stock listings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetails {
    #[serde(deserialize_with = "lenient::i64")]
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub location_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub product_group_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub qu_id_stock: Option<i64>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub min_stock_amount: f64,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub picture_file_name: Option<String>,
}

/// One product's current stock (`/stock`, and the due/overdue/expired
/// lists of `/stock/volatile`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockEntry {
    #[serde(deserialize_with = "lenient::i64")]
    pub product_id: i64,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub amount: f64,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub amount_aggregated: f64,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub amount_opened: f64,
    #[serde(default, deserialize_with = "lenient::opt_date")]
    pub best_before_date: Option<NaiveDate>,
    #[serde(default)]
    pub product: Option<ProductDetails>,
}

impl StockEntry {
    /// Product name, falling back to `Product <id>` when the listing carried
    /// no product object.
    pub fn name(&self) -> String {
        self.product
            .as_ref()
            .map_or_else(|| format!("Product {}", self.product_id), |p| p.name.clone())
    }

    /// Amount on hand, preferring the aggregated amount for parent products.
    pub fn available_amount(&self) -> f64 {
        if self.amount_aggregated > self.amount {
            self.amount_aggregated
        } else {
            self.amount
        }
    }
}

/// A product whose stock is below its minimum (`missing_products`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingProduct {
    #[serde(deserialize_with = "lenient::i64")]
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub amount_missing: f64,
    #[serde(default, deserialize_with = "lenient::bool")]
    pub is_partly_in_stock: bool,
}

/// `/stock/volatile` response: everything due soon, overdue, expired or
/// below minimum stock in one round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolatileStock {
    #[serde(default)]
    pub due_products: Vec<StockEntry>,
    #[serde(default)]
    pub overdue_products: Vec<StockEntry>,
    #[serde(default)]
    pub expired_products: Vec<StockEntry>,
    #[serde(default)]
    pub missing_products: Vec<MissingProduct>,
}
