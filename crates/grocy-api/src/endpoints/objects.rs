use serde::Deserialize;
use serde_json::Value;

use crate::filter::QueryFilter;
use crate::models::{Equipment, GenericEntityType, lenient};
use crate::{Error, GrocyClient};

#[derive(Deserialize)]
struct Created {
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    created_object_id: Option<i64>,
}

impl GrocyClient {
    pub async fn equipment(&self) -> Result<Vec<Equipment>, Error> {
        self.get("objects/equipment").await
    }

    /// Raw rows of any generic entity type.
    pub async fn generic_objects(
        &self,
        entity_type: GenericEntityType,
        filters: &[QueryFilter],
    ) -> Result<Vec<Value>, Error> {
        self.get_filtered(&format!("objects/{entity_type}"), filters)
            .await
    }

    /// Create an object; returns the new id when Grocy reports it.
    pub async fn add_generic(
        &self,
        entity_type: GenericEntityType,
        data: &Value,
    ) -> Result<Option<i64>, Error> {
        let created: Created = self.post(&format!("objects/{entity_type}"), data).await?;
        Ok(created.created_object_id)
    }

    pub async fn update_generic(
        &self,
        entity_type: GenericEntityType,
        object_id: i64,
        data: &Value,
    ) -> Result<(), Error> {
        self.put_no_response(&format!("objects/{entity_type}/{object_id}"), data)
            .await
    }

    pub async fn delete_generic(
        &self,
        entity_type: GenericEntityType,
        object_id: i64,
    ) -> Result<(), Error> {
        self.delete(&format!("objects/{entity_type}/{object_id}"))
            .await
    }
}
