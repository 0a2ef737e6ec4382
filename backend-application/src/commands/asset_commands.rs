use chrono::Utc;
use rand::Rng;

use backend_domain::{Asset, AssetStatus};

use crate::dtos::CreateAssetRequest;
use crate::{AppError, AppState};

const DEFAULT_LOCATION: &str = "Warehouse";
const GENERATED_ID_ATTEMPTS: usize = 5;

pub async fn create_asset(
    state: &AppState,
    creator_id: &str,
    request: CreateAssetRequest,
) -> Result<Asset, AppError> {
    let name = normalize_optional_text(request.name)
        .ok_or_else(|| AppError::BadRequest("name is required".to_string()))?;
    let status = match normalize_optional_text(request.status) {
        Some(raw) => raw
            .parse::<AssetStatus>()
            .map_err(|err| AppError::BadRequest(err.to_string()))?,
        None => AssetStatus::default(),
    };
    let location =
        normalize_optional_text(request.location).unwrap_or_else(|| DEFAULT_LOCATION.to_string());

    let asset_id = match normalize_optional_text(request.asset_id) {
        Some(asset_id) => {
            if find_asset(state, &asset_id).await?.is_some() {
                return Err(AppError::BadRequest("Asset ID already exists".to_string()));
            }
            asset_id
        }
        None => generate_unused_asset_id(state).await?,
    };

    let now = Utc::now();
    let mut asset = Asset::new(asset_id, name, location, status, now);
    asset.last_scanned_by = Some(creator_id.to_string());
    state
        .asset_repo
        .save_asset(&asset)
        .await
        .map_err(AppError::Internal)?;
    Ok(asset)
}

async fn find_asset(state: &AppState, asset_id: &str) -> Result<Option<Asset>, AppError> {
    state
        .asset_repo
        .find_asset(asset_id)
        .await
        .map_err(AppError::Internal)
}

async fn generate_unused_asset_id(state: &AppState) -> Result<String, AppError> {
    for _ in 0..GENERATED_ID_ATTEMPTS {
        let candidate = generate_asset_id();
        if find_asset(state, &candidate).await?.is_none() {
            return Ok(candidate);
        }
    }
    Err(AppError::Internal(anyhow::anyhow!(
        "could not generate a free asset id after {} attempts",
        GENERATED_ID_ATTEMPTS
    )))
}

/// `AS-<4 random digits>-<last 4 digits of the epoch millis>`
fn generate_asset_id() -> String {
    let random: u16 = rand::thread_rng().gen_range(1000..10000);
    let suffix = Utc::now().timestamp_millis().rem_euclid(10_000);
    format!("AS-{}-{:04}", random, suffix)
}

fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::memory_state;

    #[test]
    fn generated_ids_follow_the_short_format() {
        let id = generate_asset_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "AS");
        assert_eq!(parts[1].len(), 4);
        assert_eq!(parts[2].len(), 4);
        assert!(parts[1..].iter().all(|p| p.chars().all(|c| c.is_ascii_digit())));
    }

    #[tokio::test]
    async fn creates_asset_with_defaults() {
        let state = memory_state();
        let asset = create_asset(
            &state,
            "creator-1",
            CreateAssetRequest {
                name: Some("Generator".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("created");
        assert!(asset.asset_id.starts_with("AS-"));
        assert_eq!(asset.location, "Warehouse");
        assert_eq!(asset.status, AssetStatus::Operational);
        assert_eq!(asset.last_scanned_by.as_deref(), Some("creator-1"));
        assert!(state.asset_repo.find_asset(&asset.asset_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn rejects_duplicate_asset_id() {
        let state = memory_state();
        let request = || CreateAssetRequest {
            name: Some("Crane".to_string()),
            asset_id: Some("AS-7".to_string()),
            ..Default::default()
        };
        create_asset(&state, "u", request()).await.expect("first");
        let err = create_asset(&state, "u", request()).await.expect_err("duplicate");
        match err {
            AppError::BadRequest(message) => assert_eq!(message, "Asset ID already exists"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejects_missing_name_and_bad_status() {
        let state = memory_state();
        let missing = create_asset(&state, "u", CreateAssetRequest::default()).await;
        assert!(matches!(missing, Err(AppError::BadRequest(_))));

        let bad_status = create_asset(
            &state,
            "u",
            CreateAssetRequest {
                name: Some("Drill".to_string()),
                status: Some("lost".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(bad_status, Err(AppError::BadRequest(_))));
    }
}
