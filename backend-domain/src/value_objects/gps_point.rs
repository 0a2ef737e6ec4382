// GPS coordinate pair

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GpsPoint {
    pub fn new(lat: f64, lng: f64) -> Result<Self, ValidationError> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        if !valid {
            return Err(ValidationError::GpsOutOfRange { lat, lng });
        }
        Ok(Self { lat, lng })
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "lat": self.lat, "lng": self.lng })
    }

    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let lat = value.get("lat")?.as_f64()?;
        let lng = value.get("lng")?.as_f64()?;
        Self::new(lat, lng).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(GpsPoint::new(91.0, 0.0).is_err());
        assert!(GpsPoint::new(0.0, -180.5).is_err());
        assert!(GpsPoint::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn json_form_is_readable_back() {
        let point = GpsPoint::new(52.52, 13.405).expect("valid point");
        assert_eq!(GpsPoint::from_json(&point.to_json()), Some(point));
    }
}
