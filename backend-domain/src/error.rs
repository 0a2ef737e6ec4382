use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("unknown status '{0}'")]
    UnknownStatus(String),
    #[error("unknown role '{0}'")]
    UnknownRole(String),
    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
    #[error("gps out of range (lat={lat}, lng={lng})")]
    GpsOutOfRange { lat: f64, lng: f64 },
}
