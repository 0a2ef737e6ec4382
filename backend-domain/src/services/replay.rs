// Read-model replay
// Folds a single validated event into the current state of its asset.

use chrono::{DateTime, Utc};

use crate::entities::{Asset, EventAction, Sighting, SyncEvent, UNKNOWN_LOCATION};

#[derive(Debug, Clone, PartialEq)]
pub enum ReplayOutcome {
    Updated(Asset),
    Created(Asset),
    /// No asset exists and the action does not register one.
    Unchanged,
}

impl ReplayOutcome {
    pub fn asset(&self) -> Option<&Asset> {
        match self {
            ReplayOutcome::Updated(asset) | ReplayOutcome::Created(asset) => Some(asset),
            ReplayOutcome::Unchanged => None,
        }
    }
}

pub fn replay_event(current: Option<Asset>, event: &SyncEvent, now: DateTime<Utc>) -> ReplayOutcome {
    match current {
        Some(mut asset) => {
            apply_action(&mut asset, &event.action);
            apply_sighting(&mut asset, &event.sighting);
            asset.record_scan(event.occurred_at, &event.user_id);
            asset.touch(now);
            ReplayOutcome::Updated(asset)
        }
        None if event.action.registers_unknown_asset() => {
            ReplayOutcome::Created(register_asset(event, now))
        }
        None => ReplayOutcome::Unchanged,
    }
}

fn apply_action(asset: &mut Asset, action: &EventAction) {
    match action {
        EventAction::Scan { .. } => {}
        EventAction::StatusChange { status } => {
            if let Some(status) = status {
                asset.status = *status;
            }
        }
        // location is carried by the sighting and applied there
        EventAction::LocationUpdate => {}
        EventAction::Other { .. } => {}
    }
}

/// Location and GPS piggyback on every action type.
fn apply_sighting(asset: &mut Asset, sighting: &Sighting) {
    if let Some(location) = &sighting.location {
        asset.location = location.clone();
    }
    if let Some(gps) = sighting.gps {
        asset.set_last_gps(gps);
    }
}

fn register_asset(event: &SyncEvent, now: DateTime<Utc>) -> Asset {
    let mut asset = Asset::new(
        event.asset_id.clone(),
        format!("Unknown Asset {}", event.asset_id),
        event
            .sighting
            .location
            .clone()
            .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
        event.action.status().unwrap_or_default(),
        now,
    );
    if let Some(gps) = event.sighting.gps {
        asset.set_last_gps(gps);
    }
    asset.record_scan(event.occurred_at, &event.user_id);
    asset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::{AssetStatus, GpsPoint};
    use chrono::TimeZone;

    fn event(action: EventAction, sighting: Sighting) -> SyncEvent {
        SyncEvent {
            event_id: "evt-1".to_string(),
            asset_id: "AS-42".to_string(),
            user_id: "user-7".to_string(),
            action,
            sighting,
            occurred_at: Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 0).unwrap(),
        }
    }

    fn existing() -> Asset {
        Asset::new(
            "AS-42",
            "Pallet Jack",
            "Dock A",
            AssetStatus::Operational,
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn scan_of_unknown_asset_registers_with_fallbacks() {
        let now = Utc::now();
        let outcome = replay_event(None, &event(EventAction::Scan { status: None }, Sighting::default()), now);
        let ReplayOutcome::Created(asset) = outcome else {
            panic!("expected created asset");
        };
        assert_eq!(asset.asset_id, "AS-42");
        assert_eq!(asset.name, "Unknown Asset AS-42");
        assert_eq!(asset.location, "Unknown Location");
        assert_eq!(asset.status, AssetStatus::Operational);
        assert_eq!(asset.last_scanned_by.as_deref(), Some("user-7"));
        assert!(asset.metadata.is_empty());
        assert_eq!(asset.updated_at, now);
    }

    #[test]
    fn status_change_of_unknown_asset_registers_with_payload_values() {
        let gps = GpsPoint::new(48.1, 11.5).unwrap();
        let outcome = replay_event(
            None,
            &event(
                EventAction::StatusChange {
                    status: Some(AssetStatus::InTransit),
                },
                Sighting {
                    location: Some("Truck 3".to_string()),
                    gps: Some(gps),
                },
            ),
            Utc::now(),
        );
        let asset = outcome.asset().expect("created");
        assert_eq!(asset.status, AssetStatus::InTransit);
        assert_eq!(asset.location, "Truck 3");
        assert_eq!(asset.last_gps(), Some(gps));
    }

    #[test]
    fn location_update_of_unknown_asset_changes_nothing() {
        let outcome = replay_event(
            None,
            &event(
                EventAction::LocationUpdate,
                Sighting {
                    location: Some("Yard".to_string()),
                    gps: None,
                },
            ),
            Utc::now(),
        );
        assert_eq!(outcome, ReplayOutcome::Unchanged);
    }

    #[test]
    fn scan_does_not_change_status_of_existing_asset() {
        let outcome = replay_event(
            Some(existing()),
            &event(
                EventAction::Scan {
                    status: Some(AssetStatus::Retired),
                },
                Sighting::default(),
            ),
            Utc::now(),
        );
        let asset = outcome.asset().expect("updated");
        assert_eq!(asset.status, AssetStatus::Operational);
        assert_eq!(asset.location, "Dock A");
        assert_eq!(
            asset.last_scanned_at,
            Some(Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 0).unwrap())
        );
    }

    #[test]
    fn status_change_overwrites_status() {
        let outcome = replay_event(
            Some(existing()),
            &event(
                EventAction::StatusChange {
                    status: Some(AssetStatus::Maintenance),
                },
                Sighting::default(),
            ),
            Utc::now(),
        );
        assert_eq!(outcome.asset().unwrap().status, AssetStatus::Maintenance);
    }

    #[test]
    fn location_update_overwrites_location_and_ignores_status() {
        let mut input = event(
            EventAction::LocationUpdate,
            Sighting {
                location: Some("Dock C".to_string()),
                gps: None,
            },
        );
        input.user_id = "user-9".to_string();
        let outcome = replay_event(Some(existing()), &input, Utc::now());
        let ReplayOutcome::Updated(asset) = outcome else {
            panic!("expected updated asset");
        };
        assert_eq!(asset.location, "Dock C");
        assert_eq!(asset.status, AssetStatus::Operational);
        assert_eq!(asset.last_scanned_by.as_deref(), Some("user-9"));
    }

    #[test]
    fn unrecognised_action_applies_only_sighting_and_scan_stamp() {
        let action = EventAction::Other {
            name: "INSPECTION".to_string(),
        };
        let sighting = Sighting {
            location: Some("Bay 9".to_string()),
            gps: None,
        };
        let now = Utc::now();

        let updated = replay_event(Some(existing()), &event(action.clone(), sighting.clone()), now);
        let asset = updated.asset().expect("updated");
        assert_eq!(asset.location, "Bay 9");
        assert_eq!(asset.status, AssetStatus::Operational);
        assert_eq!(asset.last_scanned_by.as_deref(), Some("user-7"));
        assert_eq!(asset.updated_at, now);

        let missing = replay_event(None, &event(action, sighting), now);
        assert_eq!(missing, ReplayOutcome::Unchanged);
    }

    #[test]
    fn status_change_without_status_keeps_status() {
        let outcome = replay_event(
            Some(existing()),
            &event(EventAction::StatusChange { status: None }, Sighting::default()),
            Utc::now(),
        );
        assert_eq!(outcome.asset().unwrap().status, AssetStatus::Operational);
    }

    #[test]
    fn sighting_piggybacks_on_scan() {
        let gps = GpsPoint::new(-1.0, 36.8).unwrap();
        let outcome = replay_event(
            Some(existing()),
            &event(
                EventAction::Scan { status: None },
                Sighting {
                    location: Some("Dock B".to_string()),
                    gps: Some(gps),
                },
            ),
            Utc::now(),
        );
        let asset = outcome.asset().unwrap();
        assert_eq!(asset.location, "Dock B");
        assert_eq!(asset.last_gps(), Some(gps));
    }

    #[test]
    fn replaying_twice_yields_same_fields() {
        let now = Utc::now();
        let ev = event(
            EventAction::StatusChange {
                status: Some(AssetStatus::Retired),
            },
            Sighting {
                location: Some("Scrap yard".to_string()),
                gps: None,
            },
        );
        let once = replay_event(Some(existing()), &ev, now);
        let twice = replay_event(once.asset().cloned(), &ev, now);
        assert_eq!(once.asset(), twice.asset());
    }
}
