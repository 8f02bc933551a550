use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Release information nested in `/system/info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrocyVersion {
    #[serde(rename = "Version", default)]
    pub version: String,
    #[serde(rename = "ReleaseDate", default)]
    pub release_date: String,
}

/// `/system/info`: used to validate a connection before setup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    #[serde(default)]
    pub grocy_version: GrocyVersion,
    #[serde(default)]
    pub php_version: String,
    #[serde(default)]
    pub sqlite_version: String,
    #[serde(default)]
    pub os: Option<String>,
}

/// `/system/config`: server settings, including the `FEATURE_FLAG_*` map.
///
/// Values are kept raw; flags may be JSON booleans, `"0"`/`"1"` strings,
/// or anything else an older server wrote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystemConfig(pub BTreeMap<String, Value>);

impl SystemConfig {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All `FEATURE_FLAG_*` entries.
    pub fn feature_flags(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0
            .iter()
            .filter(|(k, _)| k.starts_with("FEATURE_FLAG_"))
            .map(|(k, v)| (k.as_str(), v))
    }
}

impl From<BTreeMap<String, Value>> for SystemConfig {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}
