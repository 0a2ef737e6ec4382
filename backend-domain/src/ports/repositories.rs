use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{Asset, AssetFilter, EventRecord, User};

#[async_trait]
pub trait AssetRepository: Send + Sync {
    async fn find_asset(&self, asset_id: &str) -> anyhow::Result<Option<Asset>>;
    /// Insert or replace the asset stored under `asset.asset_id`.
    async fn save_asset(&self, asset: &Asset) -> anyhow::Result<()>;
    /// Assets whose `updated_at` is strictly after `since`; all assets when `since` is `None`.
    async fn list_assets_updated_since(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> anyhow::Result<Vec<Asset>>;
    /// Newest `updated_at` first.
    async fn search_assets(
        &self,
        filter: &AssetFilter,
        offset: usize,
        limit: usize,
    ) -> anyhow::Result<Vec<Asset>>;
    async fn count_assets(&self, filter: &AssetFilter) -> anyhow::Result<u64>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn ensure_schema(&self) -> anyhow::Result<()>;
    async fn find_event(&self, event_id: &str) -> anyhow::Result<Option<EventRecord>>;
    async fn insert_event(&self, event: &EventRecord) -> anyhow::Result<()>;
    /// Newest `occurred_at` first.
    async fn list_events_for_asset(&self, asset_id: &str) -> anyhow::Result<Vec<EventRecord>>;
    async fn recent_events(&self, limit: usize) -> anyhow::Result<Vec<EventRecord>>;
    async fn count_events(&self) -> anyhow::Result<u64>;
    async fn ping(&self) -> anyhow::Result<()>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    async fn find_user_by_id(&self, id: &str) -> anyhow::Result<Option<User>>;
    /// Insert or replace the user stored under `user.username`.
    async fn save_user(&self, user: &User) -> anyhow::Result<()>;
    async fn list_users(&self) -> anyhow::Result<Vec<User>>;
}
