use chrono::Utc;
use tracing::{info, warn};

use backend_domain::{replay_event, ReplayOutcome, SyncEvent, SyncEventInput};

use crate::dtos::SyncResults;
use crate::AppState;

#[derive(Debug)]
enum EventOutcome {
    Duplicate,
    Applied(ReplayOutcome),
}

/// Events are handled one after another; a failing event is counted and the
/// rest of the batch still runs. Duplicates count as neither processed nor error.
pub async fn ingest_events(state: &AppState, events: Vec<serde_json::Value>) -> SyncResults {
    state.metrics.record_sync_request();
    let mut results = SyncResults::default();

    for raw in events {
        let event_id = raw
            .get("eventId")
            .and_then(|value| value.as_str())
            .unwrap_or("<missing>")
            .to_string();
        match process_event(state, raw).await {
            Ok(EventOutcome::Duplicate) => {
                state.metrics.record_duplicate();
            }
            Ok(EventOutcome::Applied(outcome)) => {
                if let ReplayOutcome::Created(asset) = &outcome {
                    state.metrics.record_asset_created();
                    info!(
                        asset_id = %asset.asset_id,
                        location = %asset.location,
                        "auto-created asset"
                    );
                }
                state.metrics.record_processed();
                results.processed += 1;
            }
            Err(err) => {
                warn!("failed to process event {}: {:#}", event_id, err);
                state.metrics.record_failed();
                results.errors += 1;
            }
        }
    }

    results
}

async fn process_event(state: &AppState, raw: serde_json::Value) -> anyhow::Result<EventOutcome> {
    let input: SyncEventInput = serde_json::from_value(raw)?;
    let event = SyncEvent::try_from(input)?;

    if state.event_repo.find_event(&event.event_id).await?.is_some() {
        return Ok(EventOutcome::Duplicate);
    }

    let now = Utc::now();
    state.event_repo.insert_event(&event.to_record(now)).await?;

    let current = state.asset_repo.find_asset(&event.asset_id).await?;
    let outcome = replay_event(current, &event, now);
    if let Some(asset) = outcome.asset() {
        state.asset_repo.save_asset(asset).await?;
    }
    Ok(EventOutcome::Applied(outcome))
}
