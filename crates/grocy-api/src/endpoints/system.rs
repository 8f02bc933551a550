use crate::models::{SystemConfig, SystemInfo};
use crate::{Error, GrocyClient};

impl GrocyClient {
    /// `GET /system/info`. A cheap authenticated read, used to validate
    /// credentials before anything else is set up.
    pub async fn system_info(&self) -> Result<SystemInfo, Error> {
        self.get("system/info").await
    }

    /// `GET /system/config`, including the `FEATURE_FLAG_*` switches.
    pub async fn system_config(&self) -> Result<SystemConfig, Error> {
        self.get("system/config").await
    }
}
