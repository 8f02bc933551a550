use std::collections::HashMap;

use serde::Serialize;

use crate::models::{ProductDetails, ShoppingListItem};
use crate::{Error, GrocyClient};

impl GrocyClient {
    /// `GET /objects/shopping_list`, optionally joined with
    /// `/objects/products`.
    pub async fn shopping_list(&self, with_details: bool) -> Result<Vec<ShoppingListItem>, Error> {
        let mut items: Vec<ShoppingListItem> = self.get("objects/shopping_list").await?;
        if with_details && items.iter().any(|i| i.product_id.is_some()) {
            let products: HashMap<i64, ProductDetails> = self
                .products()
                .await?
                .into_iter()
                .map(|p| (p.id, p))
                .collect();
            for item in &mut items {
                item.product = item.product_id.and_then(|id| products.get(&id).cloned());
            }
        }
        Ok(items)
    }

    /// Put every product below its minimum stock on a shopping list
    /// (Grocy's default list when `list_id` is `None`).
    pub async fn add_missing_products_to_shopping_list(
        &self,
        list_id: Option<i64>,
    ) -> Result<(), Error> {
        #[derive(Serialize)]
        struct Body {
            #[serde(skip_serializing_if = "Option::is_none")]
            list_id: Option<i64>,
        }

        self.post_no_response(
            "stock/shoppinglist/add-missing-products",
            &Body { list_id },
        )
        .await
    }

    pub async fn remove_product_from_shopping_list(
        &self,
        product_id: i64,
        list_id: i64,
        amount: f64,
    ) -> Result<(), Error> {
        #[derive(Serialize)]
        struct Body {
            product_id: i64,
            list_id: i64,
            product_amount: f64,
        }

        self.post_no_response(
            "stock/shoppinglist/remove-product",
            &Body {
                product_id,
                list_id,
                product_amount: amount,
            },
        )
        .await
    }
}
