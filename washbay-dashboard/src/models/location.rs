use serde::{Deserialize, Serialize};
use validator::Validate;

use super::not_blank;

/// A wash bay / physical service location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub address: String,
}

/// Create/update form, also used as the API payload.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LocationForm {
    #[validate(custom(function = "not_blank", message = "Bay name is required"))]
    pub name: String,
    #[serde(default)]
    pub address: String,
}

impl LocationForm {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            address: self.address.trim().to_string(),
        }
    }
}
