// Action type value object
// Open set: names outside the known three are kept verbatim.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionType {
    Scan,
    StatusChange,
    LocationUpdate,
    Other(String),
}

impl ActionType {
    pub fn as_str(&self) -> &str {
        match self {
            ActionType::Scan => "SCAN",
            ActionType::StatusChange => "STATUS_CHANGE",
            ActionType::LocationUpdate => "LOCATION_UPDATE",
            ActionType::Other(name) => name,
        }
    }
}

impl FromStr for ActionType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(match trimmed.to_uppercase().as_str() {
            "SCAN" => ActionType::Scan,
            "STATUS_CHANGE" => ActionType::StatusChange,
            "LOCATION_UPDATE" => ActionType::LocationUpdate,
            _ => ActionType::Other(trimmed.to_string()),
        })
    }
}

impl From<String> for ActionType {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(action) => action,
            Err(never) => match never {},
        }
    }
}

impl From<ActionType> for String {
    fn from(value: ActionType) -> Self {
        match value {
            ActionType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
