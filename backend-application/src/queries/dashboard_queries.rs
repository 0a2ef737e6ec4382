use backend_domain::{AssetFilter, AssetStatus};

use crate::dtos::DashboardStats;
use crate::queries::asset_queries::with_usernames;
use crate::{AppError, AppState};

const RECENT_ACTIVITY_LIMIT: usize = 5;

pub async fn dashboard_stats(state: &AppState) -> Result<DashboardStats, AppError> {
    let total_assets = state.asset_repo.count_assets(&AssetFilter::default()).await?;
    let maintenance_assets = state
        .asset_repo
        .count_assets(&AssetFilter {
            search: None,
            status: Some(AssetStatus::Maintenance),
        })
        .await?;
    let total_events = state.event_repo.count_events().await?;
    let recent = state.event_repo.recent_events(RECENT_ACTIVITY_LIMIT).await?;

    Ok(DashboardStats {
        total_assets,
        maintenance_assets,
        total_events,
        recent_activity: with_usernames(state, recent).await?,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::commands::sync_commands::ingest_events;
    use crate::testing::memory_state;

    #[tokio::test]
    async fn counts_assets_and_caps_recent_activity() {
        let state = memory_state();
        let events = (0..7)
            .map(|idx| {
                json!({
                    "eventId": format!("evt-{idx}"),
                    "assetId": format!("AS-{}", idx % 3),
                    "userId": "user-1",
                    "actionType": "STATUS_CHANGE",
                    "occurredAt": format!("2026-06-01T10:0{idx}:00Z"),
                    "payload": { "status": "maintenance" }
                })
            })
            .collect();
        ingest_events(&state, events).await;

        let stats = dashboard_stats(&state).await.expect("stats");
        assert_eq!(stats.total_assets, 3);
        assert_eq!(stats.maintenance_assets, 3);
        assert_eq!(stats.total_events, 7);
        assert_eq!(stats.recent_activity.len(), 5);
        assert_eq!(stats.recent_activity[0].record.event_id, "evt-6");
    }
}
