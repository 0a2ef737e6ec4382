use std::collections::BTreeMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clickhouse::{Client, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use backend_domain::{
    Asset, AssetFilter, AssetRepository, EventPayload, EventRecord, EventRepository, User,
    UserRepository,
};

use crate::utils::{from_offset_datetime, to_offset_datetime};

const ASSET_COLUMNS: &str = "asset_id, name, status, location, last_scanned_at, last_scanned_by, metadata_json, created_at, updated_at";
const EVENT_COLUMNS: &str =
    "event_id, asset_id, user_id, action_type, payload_json, occurred_at, synced_at, sync_rank";
const USER_COLUMNS: &str = "id, username, password_hash, role, created_at";

#[derive(Debug, Clone, Serialize, Deserialize, Row)]
struct AssetRow {
    asset_id: String,
    name: String,
    status: String,
    location: String,
    #[serde(with = "clickhouse::serde::time::datetime64::millis::option")]
    last_scanned_at: Option<OffsetDateTime>,
    last_scanned_by: Option<String>,
    metadata_json: String,
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    created_at: OffsetDateTime,
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    updated_at: OffsetDateTime,
}

impl AssetRow {
    fn from_asset(asset: &Asset) -> Result<Self> {
        Ok(Self {
            asset_id: asset.asset_id.clone(),
            name: asset.name.clone(),
            status: asset.status.as_str().to_string(),
            location: asset.location.clone(),
            last_scanned_at: asset.last_scanned_at.map(to_offset_datetime),
            last_scanned_by: asset.last_scanned_by.clone(),
            metadata_json: serde_json::to_string(&asset.metadata)?,
            created_at: to_offset_datetime(asset.created_at),
            updated_at: to_offset_datetime(asset.updated_at),
        })
    }

    fn into_asset(self) -> Result<Asset> {
        let metadata: BTreeMap<String, serde_json::Value> = if self.metadata_json.is_empty() {
            BTreeMap::new()
        } else {
            serde_json::from_str(&self.metadata_json)
                .with_context(|| format!("metadata of asset {}", self.asset_id))?
        };
        Ok(Asset {
            status: self.status.parse()?,
            last_scanned_at: self.last_scanned_at.map(from_offset_datetime).transpose()?,
            created_at: from_offset_datetime(self.created_at)?,
            updated_at: from_offset_datetime(self.updated_at)?,
            asset_id: self.asset_id,
            name: self.name,
            location: self.location,
            last_scanned_by: self.last_scanned_by,
            metadata,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Row)]
struct EventRow {
    event_id: String,
    asset_id: String,
    user_id: String,
    action_type: String,
    payload_json: String,
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    occurred_at: OffsetDateTime,
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    synced_at: OffsetDateTime,
    /// Replacing version: higher for earlier syncs, so merges keep the first copy of an id.
    sync_rank: u64,
}

fn sync_rank(synced_at: DateTime<Utc>) -> u64 {
    u64::MAX - synced_at.timestamp_millis().max(0) as u64
}

impl EventRow {
    fn from_record(record: &EventRecord) -> Result<Self> {
        Ok(Self {
            event_id: record.event_id.clone(),
            asset_id: record.asset_id.clone(),
            user_id: record.user_id.clone(),
            action_type: record.action_type.as_str().to_string(),
            payload_json: serde_json::to_string(&record.payload)?,
            occurred_at: to_offset_datetime(record.occurred_at),
            synced_at: to_offset_datetime(record.synced_at),
            sync_rank: sync_rank(record.synced_at),
        })
    }

    fn into_record(self) -> Result<EventRecord> {
        let payload: EventPayload = serde_json::from_str(&self.payload_json)
            .with_context(|| format!("payload of event {}", self.event_id))?;
        Ok(EventRecord {
            action_type: self.action_type.parse()?,
            occurred_at: from_offset_datetime(self.occurred_at)?,
            synced_at: from_offset_datetime(self.synced_at)?,
            event_id: self.event_id,
            asset_id: self.asset_id,
            user_id: self.user_id,
            payload,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Row)]
struct UserRow {
    id: String,
    username: String,
    password_hash: String,
    role: String,
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    created_at: OffsetDateTime,
}

impl UserRow {
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role.as_str().to_string(),
            created_at: to_offset_datetime(user.created_at),
        }
    }

    fn into_user(self) -> Result<User> {
        Ok(User {
            role: self.role.parse()?,
            created_at: from_offset_datetime(self.created_at)?,
            id: self.id,
            username: self.username,
            password_hash: self.password_hash,
        })
    }
}

#[derive(Clone)]
pub struct ClickhouseRepo {
    client: Client,
    database: String,
}

impl ClickhouseRepo {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    async fn fetch_assets(&self, sql: &str) -> Result<Vec<Asset>> {
        let rows = self.client.query(sql).fetch_all::<AssetRow>().await?;
        rows.into_iter().map(AssetRow::into_asset).collect()
    }
}

fn filter_clause(filter: &AssetFilter) -> (String, Vec<String>) {
    let mut conditions = Vec::new();
    let mut binds = Vec::new();
    if let Some(search) = filter.search.as_deref().filter(|value| !value.is_empty()) {
        conditions.push(
            "(positionCaseInsensitive(name, ?) > 0 OR positionCaseInsensitive(asset_id, ?) > 0)",
        );
        binds.push(search.to_string());
        binds.push(search.to_string());
    }
    if let Some(status) = filter.status {
        conditions.push("status = ?");
        binds.push(status.as_str().to_string());
    }
    if conditions.is_empty() {
        (String::new(), binds)
    } else {
        (format!(" WHERE {}", conditions.join(" AND ")), binds)
    }
}

#[async_trait]
impl AssetRepository for ClickhouseRepo {
    async fn find_asset(&self, asset_id: &str) -> Result<Option<Asset>> {
        let sql = format!(
            "SELECT {} FROM assets FINAL WHERE asset_id = ? LIMIT 1",
            ASSET_COLUMNS
        );
        let rows = self
            .client
            .query(&sql)
            .bind(asset_id)
            .fetch_all::<AssetRow>()
            .await?;
        rows.into_iter().next().map(AssetRow::into_asset).transpose()
    }

    async fn save_asset(&self, asset: &Asset) -> Result<()> {
        let mut insert = self.client.insert("assets")?;
        insert.write(&AssetRow::from_asset(asset)?).await?;
        insert.end().await?;
        Ok(())
    }

    async fn list_assets_updated_since(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Asset>> {
        match since {
            Some(since) => {
                let sql = format!(
                    "SELECT {} FROM assets FINAL WHERE updated_at > fromUnixTimestamp64Milli(?) ORDER BY updated_at",
                    ASSET_COLUMNS
                );
                let rows = self
                    .client
                    .query(&sql)
                    .bind(since.timestamp_millis())
                    .fetch_all::<AssetRow>()
                    .await?;
                rows.into_iter().map(AssetRow::into_asset).collect()
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM assets FINAL ORDER BY updated_at",
                    ASSET_COLUMNS
                );
                self.fetch_assets(&sql).await
            }
        }
    }

    async fn search_assets(
        &self,
        filter: &AssetFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Asset>> {
        let (clause, binds) = filter_clause(filter);
        let sql = format!(
            "SELECT {} FROM assets FINAL{} ORDER BY updated_at DESC, asset_id LIMIT {} OFFSET {}",
            ASSET_COLUMNS, clause, limit, offset
        );
        let mut query = self.client.query(&sql);
        for value in binds {
            query = query.bind(value);
        }
        let rows = query.fetch_all::<AssetRow>().await?;
        rows.into_iter().map(AssetRow::into_asset).collect()
    }

    async fn count_assets(&self, filter: &AssetFilter) -> Result<u64> {
        let (clause, binds) = filter_clause(filter);
        let sql = format!("SELECT count() FROM assets FINAL{}", clause);
        let mut query = self.client.query(&sql);
        for value in binds {
            query = query.bind(value);
        }
        Ok(query.fetch_one::<u64>().await?)
    }
}

#[async_trait]
impl EventRepository for ClickhouseRepo {
    async fn ensure_schema(&self) -> Result<()> {
        let create_db = format!("CREATE DATABASE IF NOT EXISTS {}", self.database);
        self.client.query(&create_db).execute().await?;

        let create_assets = r#"
CREATE TABLE IF NOT EXISTS assets (
    asset_id String,
    name String,
    status LowCardinality(String),
    location String,
    last_scanned_at Nullable(DateTime64(3)),
    last_scanned_by Nullable(String),
    metadata_json String,
    created_at DateTime64(3),
    updated_at DateTime64(3)
) ENGINE = ReplacingMergeTree(updated_at)
ORDER BY asset_id
"#;
        self.client.query(create_assets).execute().await?;

        let create_events = r#"
CREATE TABLE IF NOT EXISTS asset_events (
    event_id String,
    asset_id String,
    user_id String,
    action_type LowCardinality(String),
    payload_json String,
    occurred_at DateTime64(3),
    synced_at DateTime64(3),
    sync_rank UInt64
) ENGINE = ReplacingMergeTree(sync_rank)
ORDER BY event_id
"#;
        self.client.query(create_events).execute().await?;

        let create_users = r#"
CREATE TABLE IF NOT EXISTS users (
    id String,
    username String,
    password_hash String,
    role LowCardinality(String),
    created_at DateTime64(3)
) ENGINE = ReplacingMergeTree
ORDER BY username
"#;
        self.client.query(create_users).execute().await?;
        Ok(())
    }

    async fn find_event(&self, event_id: &str) -> Result<Option<EventRecord>> {
        let sql = format!(
            "SELECT {} FROM asset_events FINAL WHERE event_id = ? LIMIT 1",
            EVENT_COLUMNS
        );
        let rows = self
            .client
            .query(&sql)
            .bind(event_id)
            .fetch_all::<EventRow>()
            .await?;
        rows.into_iter().next().map(EventRow::into_record).transpose()
    }

    async fn insert_event(&self, event: &EventRecord) -> Result<()> {
        let mut insert = self.client.insert("asset_events")?;
        insert.write(&EventRow::from_record(event)?).await?;
        insert.end().await?;
        Ok(())
    }

    async fn list_events_for_asset(&self, asset_id: &str) -> Result<Vec<EventRecord>> {
        let sql = format!(
            "SELECT {} FROM asset_events FINAL WHERE asset_id = ? ORDER BY occurred_at DESC",
            EVENT_COLUMNS
        );
        let rows = self
            .client
            .query(&sql)
            .bind(asset_id)
            .fetch_all::<EventRow>()
            .await?;
        rows.into_iter().map(EventRow::into_record).collect()
    }

    async fn recent_events(&self, limit: usize) -> Result<Vec<EventRecord>> {
        let sql = format!(
            "SELECT {} FROM asset_events FINAL ORDER BY occurred_at DESC LIMIT {}",
            EVENT_COLUMNS, limit
        );
        let rows = self.client.query(&sql).fetch_all::<EventRow>().await?;
        rows.into_iter().map(EventRow::into_record).collect()
    }

    async fn count_events(&self) -> Result<u64> {
        Ok(self
            .client
            .query("SELECT count() FROM asset_events FINAL")
            .fetch_one::<u64>()
            .await?)
    }

    async fn ping(&self) -> Result<()> {
        let _: u8 = self.client.query("SELECT toUInt8(1)").fetch_one().await?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for ClickhouseRepo {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!(
            "SELECT {} FROM users FINAL WHERE username = ? LIMIT 1",
            USER_COLUMNS
        );
        let rows = self
            .client
            .query(&sql)
            .bind(username)
            .fetch_all::<UserRow>()
            .await?;
        rows.into_iter().next().map(UserRow::into_user).transpose()
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let sql = format!(
            "SELECT {} FROM users FINAL WHERE id = ? LIMIT 1",
            USER_COLUMNS
        );
        let rows = self
            .client
            .query(&sql)
            .bind(id)
            .fetch_all::<UserRow>()
            .await?;
        rows.into_iter().next().map(UserRow::into_user).transpose()
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        let mut insert = self.client.insert("users")?;
        insert.write(&UserRow::from_user(user)).await?;
        insert.end().await?;
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let sql = format!("SELECT {} FROM users FINAL ORDER BY username", USER_COLUMNS);
        let rows = self.client.query(&sql).fetch_all::<UserRow>().await?;
        rows.into_iter().map(UserRow::into_user).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use backend_domain::{ActionType, AssetStatus, GpsPoint, Role};

    use super::*;

    #[test]
    fn asset_row_preserves_metadata_and_scan_fields() {
        let now = Utc.timestamp_millis_opt(1_775_000_000_000).unwrap();
        let mut asset = Asset::new("AS-1", "Forklift", "Dock 4", AssetStatus::Maintenance, now);
        asset.set_last_gps(GpsPoint { lat: 1.5, lng: -2.25 });
        asset.record_scan(now, "user-7");

        let row = AssetRow::from_asset(&asset).expect("row");
        assert_eq!(row.status, "maintenance");
        assert_eq!(row.into_asset().expect("asset"), asset);
    }

    #[test]
    fn event_row_keeps_action_and_payload() {
        let at = Utc.timestamp_millis_opt(1_775_000_000_000).unwrap();
        let record = EventRecord {
            event_id: "evt-1".to_string(),
            asset_id: "AS-1".to_string(),
            user_id: "user-1".to_string(),
            action_type: ActionType::StatusChange,
            payload: EventPayload {
                status: Some(AssetStatus::Retired),
                location: Some("Yard".to_string()),
                gps: None,
            },
            occurred_at: at,
            synced_at: at,
        };
        let row = EventRow::from_record(&record).expect("row");
        assert_eq!(row.action_type, "STATUS_CHANGE");
        assert_eq!(row.into_record().expect("record"), record);
    }

    #[test]
    fn earlier_sync_outranks_a_later_duplicate() {
        let first = Utc.timestamp_millis_opt(1_775_000_000_000).unwrap();
        let record = |synced_at| EventRecord {
            event_id: "evt-1".to_string(),
            asset_id: "AS-1".to_string(),
            user_id: "user-1".to_string(),
            action_type: ActionType::Scan,
            payload: EventPayload::default(),
            occurred_at: first,
            synced_at,
        };
        let original = EventRow::from_record(&record(first)).expect("row");
        let duplicate =
            EventRow::from_record(&record(first + chrono::Duration::seconds(5))).expect("row");
        assert!(original.sync_rank > duplicate.sync_rank);
        assert_eq!(original.sync_rank, u64::MAX - 1_775_000_000_000);
    }

    #[test]
    fn user_row_round_trips_role() {
        let user = User {
            id: "u-1".to_string(),
            username: "manager".to_string(),
            password_hash: "hash".to_string(),
            role: Role::Manager,
            created_at: Utc.timestamp_millis_opt(1_775_000_000_000).unwrap(),
        };
        assert_eq!(UserRow::from_user(&user).into_user().expect("user"), user);
    }

    #[test]
    fn filter_clause_binds_search_twice() {
        let filter = AssetFilter {
            search: Some("fork".to_string()),
            status: Some(AssetStatus::Operational),
        };
        let (clause, binds) = filter_clause(&filter);
        assert!(clause.starts_with(" WHERE (positionCaseInsensitive"));
        assert_eq!(binds, vec!["fork", "fork", "operational"]);
        assert_eq!(filter_clause(&AssetFilter::default()).0, "");
    }
}
