use crate::model::custom_fields::CustomFields;
use serde::{Deserialize, Serialize};

/// A participant as stored in the `participants` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub event: String,
    pub position: Option<String>,
    pub date: String,
    #[serde(default)]
    pub custom_fields: CustomFields,
}

impl Participant {
    /// Returns the value of a standard attribute (`name`, `email`, `event`,
    /// `position`, `date`), or `None` when `field` is not one of them or the
    /// stored value is null. Other field names live in `custom_fields`.
    pub fn standard_field(&self, field: &str) -> Option<&str> {
        match field {
            "name" => Some(self.name.as_str()),
            "email" => self.email.as_deref(),
            "event" => Some(self.event.as_str()),
            "position" => self.position.as_deref(),
            "date" => Some(self.date.as_str()),
            _ => None,
        }
    }
}

/// A participant that has not been persisted yet, produced by CSV import or
/// by the manual entry endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewParticipant {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub custom_fields: CustomFields,
}
