use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use backend_domain::{
    Asset, AssetFilter, AssetRepository, EventRecord, EventRepository, User, UserRepository,
};

/// Process-local store used by tests and the `memory` storage backend.
#[derive(Default)]
pub struct MemoryRepository {
    assets: RwLock<HashMap<String, Asset>>,
    events: RwLock<HashMap<String, EventRecord>>,
    users: RwLock<HashMap<String, User>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_updated_first(assets: &mut [Asset]) {
    assets.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| a.asset_id.cmp(&b.asset_id))
    });
}

fn newest_occurred_first(events: &mut [EventRecord]) {
    events.sort_by(|a, b| {
        b.occurred_at
            .cmp(&a.occurred_at)
            .then_with(|| b.synced_at.cmp(&a.synced_at))
            .then_with(|| a.event_id.cmp(&b.event_id))
    });
}

#[async_trait]
impl AssetRepository for MemoryRepository {
    async fn find_asset(&self, asset_id: &str) -> Result<Option<Asset>> {
        Ok(self.assets.read().await.get(asset_id).cloned())
    }

    async fn save_asset(&self, asset: &Asset) -> Result<()> {
        self.assets
            .write()
            .await
            .insert(asset.asset_id.clone(), asset.clone());
        Ok(())
    }

    async fn list_assets_updated_since(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Asset>> {
        let guard = self.assets.read().await;
        let mut assets: Vec<Asset> = guard
            .values()
            .filter(|asset| since.map_or(true, |since| asset.updated_at > since))
            .cloned()
            .collect();
        assets.sort_by(|a, b| {
            a.updated_at
                .cmp(&b.updated_at)
                .then_with(|| a.asset_id.cmp(&b.asset_id))
        });
        Ok(assets)
    }

    async fn search_assets(
        &self,
        filter: &AssetFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Asset>> {
        let guard = self.assets.read().await;
        let mut assets: Vec<Asset> = guard
            .values()
            .filter(|asset| filter.matches(asset))
            .cloned()
            .collect();
        newest_updated_first(&mut assets);
        Ok(assets.into_iter().skip(offset).take(limit).collect())
    }

    async fn count_assets(&self, filter: &AssetFilter) -> Result<u64> {
        let guard = self.assets.read().await;
        Ok(guard.values().filter(|asset| filter.matches(asset)).count() as u64)
    }
}

#[async_trait]
impl EventRepository for MemoryRepository {
    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn find_event(&self, event_id: &str) -> Result<Option<EventRecord>> {
        Ok(self.events.read().await.get(event_id).cloned())
    }

    async fn insert_event(&self, event: &EventRecord) -> Result<()> {
        self.events
            .write()
            .await
            .entry(event.event_id.clone())
            .or_insert_with(|| event.clone());
        Ok(())
    }

    async fn list_events_for_asset(&self, asset_id: &str) -> Result<Vec<EventRecord>> {
        let guard = self.events.read().await;
        let mut events: Vec<EventRecord> = guard
            .values()
            .filter(|event| event.asset_id == asset_id)
            .cloned()
            .collect();
        newest_occurred_first(&mut events);
        Ok(events)
    }

    async fn recent_events(&self, limit: usize) -> Result<Vec<EventRecord>> {
        let guard = self.events.read().await;
        let mut events: Vec<EventRecord> = guard.values().cloned().collect();
        newest_occurred_first(&mut events);
        events.truncate(limit);
        Ok(events)
    }

    async fn count_events(&self) -> Result<u64> {
        Ok(self.events.read().await.len() as u64)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let guard = self.users.read().await;
        Ok(guard.values().find(|user| user.id == id).cloned())
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        self.users
            .write()
            .await
            .insert(user.username.clone(), user.clone());
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let guard = self.users.read().await;
        let mut users: Vec<User> = guard.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }
}
