// Event entities
// Wire input from mobile clients, the validated event used for replay,
// and the immutable log record.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::value_objects::{ActionType, AssetStatus, GpsPoint};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncEventInput {
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub asset_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub action_type: Option<String>,
    #[serde(default)]
    pub occurred_at: Option<TimestampInput>,
    #[serde(default)]
    pub payload: Option<EventPayloadInput>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TimestampInput {
    Millis(i64),
    FractionalMillis(f64),
    Text(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPayloadInput {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub gps: Option<GpsInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GpsInput {
    pub lat: f64,
    pub lng: f64,
}

/// Action-specific part of an event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventAction {
    /// `status` is only consulted when the scan registers an unknown asset.
    Scan { status: Option<AssetStatus> },
    StatusChange { status: Option<AssetStatus> },
    /// The location itself travels in the event's [`Sighting`].
    LocationUpdate,
    /// Unrecognised action: only the sighting and scan stamp apply.
    Other { name: String },
}

impl EventAction {
    pub fn action_type(&self) -> ActionType {
        match self {
            EventAction::Scan { .. } => ActionType::Scan,
            EventAction::StatusChange { .. } => ActionType::StatusChange,
            EventAction::LocationUpdate => ActionType::LocationUpdate,
            EventAction::Other { name } => ActionType::Other(name.clone()),
        }
    }

    pub fn status(&self) -> Option<AssetStatus> {
        match self {
            EventAction::Scan { status } | EventAction::StatusChange { status } => *status,
            EventAction::LocationUpdate | EventAction::Other { .. } => None,
        }
    }

    pub fn registers_unknown_asset(&self) -> bool {
        matches!(self, EventAction::Scan { .. } | EventAction::StatusChange { .. })
    }
}

/// Location and GPS observation carried by any event, whatever its action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sighting {
    pub location: Option<String>,
    pub gps: Option<GpsPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncEvent {
    pub event_id: String,
    pub asset_id: String,
    pub user_id: String,
    pub action: EventAction,
    pub sighting: Sighting,
    pub occurred_at: DateTime<Utc>,
}

impl SyncEvent {
    pub fn action_type(&self) -> ActionType {
        self.action.action_type()
    }

    pub fn to_record(&self, synced_at: DateTime<Utc>) -> EventRecord {
        EventRecord {
            event_id: self.event_id.clone(),
            asset_id: self.asset_id.clone(),
            user_id: self.user_id.clone(),
            action_type: self.action_type(),
            payload: EventPayload {
                status: self.action.status(),
                location: self.sighting.location.clone(),
                gps: self.sighting.gps,
            },
            occurred_at: self.occurred_at,
            synced_at,
        }
    }
}

impl TryFrom<SyncEventInput> for SyncEvent {
    type Error = ValidationError;

    fn try_from(input: SyncEventInput) -> Result<Self, Self::Error> {
        let event_id = required_text(input.event_id, "eventId")?;
        let asset_id = required_text(input.asset_id, "assetId")?;
        let user_id = required_text(input.user_id, "userId")?;
        let action_type = ActionType::from(required_text(input.action_type, "actionType")?);
        let occurred_at = input
            .occurred_at
            .ok_or(ValidationError::MissingField("occurredAt"))
            .and_then(parse_timestamp)?;

        let payload = input.payload.unwrap_or_default();
        let status = normalize_optional_text(payload.status)
            .map(|raw| raw.parse::<AssetStatus>())
            .transpose()?;
        let gps = payload
            .gps
            .map(|gps| GpsPoint::new(gps.lat, gps.lng))
            .transpose()?;
        let sighting = Sighting {
            location: normalize_optional_text(payload.location),
            gps,
        };

        let action = match action_type {
            ActionType::Scan => EventAction::Scan { status },
            ActionType::StatusChange => EventAction::StatusChange { status },
            ActionType::LocationUpdate => EventAction::LocationUpdate,
            ActionType::Other(name) => EventAction::Other { name },
        };

        Ok(Self {
            event_id,
            asset_id,
            user_id,
            action,
            sighting,
            occurred_at,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AssetStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gps: Option<GpsPoint>,
}

/// Entry of the append-only event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub event_id: String,
    pub asset_id: String,
    pub user_id: String,
    pub action_type: ActionType,
    #[serde(default)]
    pub payload: EventPayload,
    pub occurred_at: DateTime<Utc>,
    pub synced_at: DateTime<Utc>,
}

pub fn parse_timestamp(value: TimestampInput) -> Result<DateTime<Utc>, ValidationError> {
    match value {
        TimestampInput::Millis(ms) => Utc
            .timestamp_millis_opt(ms)
            .single()
            .ok_or_else(|| ValidationError::InvalidTimestamp(ms.to_string())),
        TimestampInput::FractionalMillis(ms) => Some(ms)
            .filter(|value| value.is_finite())
            .and_then(|value| Utc.timestamp_millis_opt(value.trunc() as i64).single())
            .ok_or_else(|| ValidationError::InvalidTimestamp(ms.to_string())),
        TimestampInput::Text(text) => DateTime::parse_from_rfc3339(text.trim())
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|_| ValidationError::InvalidTimestamp(text)),
    }
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    normalize_optional_text(value).ok_or(ValidationError::MissingField(field))
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
