// Asset entity
// Current-state read model, keyed by the client-visible asset id

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{AssetStatus, GpsPoint};

pub const LAST_GPS_KEY: &str = "lastGps";
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub asset_id: String,
    pub name: String,
    pub status: AssetStatus,
    pub location: String,
    #[serde(default)]
    pub last_scanned_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_scanned_by: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    pub fn new(
        asset_id: impl Into<String>,
        name: impl Into<String>,
        location: impl Into<String>,
        status: AssetStatus,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            asset_id: asset_id.into(),
            name: name.into(),
            status,
            location: location.into(),
            last_scanned_at: None,
            last_scanned_by: None,
            metadata: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn last_gps(&self) -> Option<GpsPoint> {
        self.metadata.get(LAST_GPS_KEY).and_then(GpsPoint::from_json)
    }

    pub fn set_last_gps(&mut self, gps: GpsPoint) {
        self.metadata.insert(LAST_GPS_KEY.to_string(), gps.to_json());
    }

    pub fn record_scan(&mut self, scanned_at: DateTime<Utc>, scanned_by: &str) {
        self.last_scanned_at = Some(scanned_at);
        self.last_scanned_by = Some(scanned_by.to_string());
    }

    /// Must be called on every mutation before the asset is persisted.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Filter used by the paginated asset listing.
#[derive(Debug, Clone, Default)]
pub struct AssetFilter {
    pub search: Option<String>,
    pub status: Option<AssetStatus>,
}

impl AssetFilter {
    pub fn matches(&self, asset: &Asset) -> bool {
        if let Some(status) = self.status {
            if asset.status != status {
                return false;
            }
        }
        match self.search.as_deref() {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                asset.name.to_lowercase().contains(&needle)
                    || asset.asset_id.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Asset {
        Asset::new("AS-1001", "Forklift 7", "Dock A", AssetStatus::Operational, Utc::now())
    }

    #[test]
    fn filter_searches_name_and_id_case_insensitively() {
        let asset = sample();
        let by_name = AssetFilter {
            search: Some("FORK".to_string()),
            status: None,
        };
        let by_id = AssetFilter {
            search: Some("as-10".to_string()),
            status: None,
        };
        let miss = AssetFilter {
            search: Some("crane".to_string()),
            status: None,
        };
        assert!(by_name.matches(&asset));
        assert!(by_id.matches(&asset));
        assert!(!miss.matches(&asset));
    }

    #[test]
    fn filter_by_status_is_exact() {
        let asset = sample();
        let filter = AssetFilter {
            search: None,
            status: Some(AssetStatus::Maintenance),
        };
        assert!(!filter.matches(&asset));
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let mut asset = sample();
        asset.set_last_gps(GpsPoint::new(1.5, 2.5).expect("gps"));
        let value = serde_json::to_value(&asset).expect("serialize");
        assert_eq!(value["assetId"], "AS-1001");
        assert_eq!(value["status"], "operational");
        assert_eq!(value["metadata"]["lastGps"]["lat"], 1.5);
    }
}
