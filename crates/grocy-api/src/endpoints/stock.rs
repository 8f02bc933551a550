use serde::Serialize;

use crate::models::{ProductDetails, StockEntry, TransactionType, VolatileStock};
use crate::{Error, GrocyClient};

impl GrocyClient {
    // ── Reads ────────────────────────────────────────────────────────

    pub async fn stock(&self) -> Result<Vec<StockEntry>, Error> {
        self.get("stock").await
    }

    /// Due-soon, overdue, expired and missing products in one call.
    pub async fn volatile_stock(&self, due_soon_days: u32) -> Result<VolatileStock, Error> {
        self.get_with_params(
            "stock/volatile",
            &[("due_soon_days", due_soon_days.to_string())],
        )
        .await
    }

    pub async fn products(&self) -> Result<Vec<ProductDetails>, Error> {
        self.get("objects/products").await
    }

    // ── Mutations ────────────────────────────────────────────────────

    pub async fn add_product(
        &self,
        product_id: i64,
        amount: f64,
        price: Option<f64>,
    ) -> Result<(), Error> {
        #[derive(Serialize)]
        struct Body {
            amount: f64,
            #[serde(skip_serializing_if = "Option::is_none")]
            price: Option<f64>,
            transaction_type: TransactionType,
        }

        self.post_no_response(
            &format!("stock/products/{product_id}/add"),
            &Body {
                amount,
                price,
                transaction_type: TransactionType::Purchase,
            },
        )
        .await
    }

    pub async fn consume_product(
        &self,
        product_id: i64,
        amount: f64,
        spoiled: bool,
        transaction_type: TransactionType,
        allow_subproduct_substitution: bool,
    ) -> Result<(), Error> {
        #[derive(Serialize)]
        struct Body {
            amount: f64,
            spoiled: bool,
            transaction_type: TransactionType,
            allow_subproduct_substitution: bool,
        }

        self.post_no_response(
            &format!("stock/products/{product_id}/consume"),
            &Body {
                amount,
                spoiled,
                transaction_type,
                allow_subproduct_substitution,
            },
        )
        .await
    }

    pub async fn open_product(
        &self,
        product_id: i64,
        amount: f64,
        allow_subproduct_substitution: bool,
    ) -> Result<(), Error> {
        #[derive(Serialize)]
        struct Body {
            amount: f64,
            allow_subproduct_substitution: bool,
        }

        self.post_no_response(
            &format!("stock/products/{product_id}/open"),
            &Body {
                amount,
                allow_subproduct_substitution,
            },
        )
        .await
    }
}
