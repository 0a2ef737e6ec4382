// Request and response shapes shared with the interface layer

use serde::{Deserialize, Serialize};

use backend_domain::{Asset, EventRecord, Role};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResults {
    pub processed: u64,
    pub errors: u64,
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub message: String,
    pub results: SyncResults,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncAssetsQuery {
    pub last_sync: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AssetListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AssetPage {
    pub assets: Vec<Asset>,
    pub page: usize,
    pub pages: usize,
    pub total: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub asset_id: Option<String>,
}

/// Event log entry with the acting user's name resolved.
#[derive(Debug, Clone, Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub record: EventRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_assets: u64,
    pub maintenance_assets: u64,
    pub total_events: u64,
    pub recent_activity: Vec<EventView>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub role: Role,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct SeedAccount {
    pub username: String,
    pub password: String,
    pub role: Role,
}
