//! Deployment options: collection names and the calendar zone.
//!
//! Defaults suit a stock deployment. Per-resource overrides come from the
//! request context's options document at `nouns.<resource>.options`, e.g.
//!
//! ```json
//! { "nouns": { "meetings": { "options": { "timeTableColl": "tt", "timezone": "Europe/Budapest" } } } }
//! ```

use serde::Deserialize;
use serde_json::Value;

use evenday::Calendar;

use crate::error::{MeetingError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MeetingOptions {
    /// Collection holding one timetable document per professional.
    pub time_table_coll: String,
    /// Collection holding the allowed meeting lengths.
    pub interval_coll: String,
    /// Collection holding bookings.
    pub entry_coll: String,
    /// IANA zone used to map timestamps onto weekdays and day keys.
    pub timezone: String,
}

impl Default for MeetingOptions {
    fn default() -> Self {
        Self {
            time_table_coll: "timeTables".to_string(),
            interval_coll: "intervals".to_string(),
            entry_coll: "entries".to_string(),
            timezone: "UTC".to_string(),
        }
    }
}

impl MeetingOptions {
    /// Resolve the options of `resource` from an options document.
    ///
    /// Missing sections or keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`MeetingError::InvalidOptions`] if a present key has the wrong type.
    pub fn from_document(doc: &Value, resource: &str) -> Result<Self> {
        let section = doc
            .get("nouns")
            .and_then(|nouns| nouns.get(resource))
            .and_then(|noun| noun.get("options"));

        match section {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(value) => Self::deserialize(value)
                .map_err(|e| MeetingError::InvalidOptions(format!("{resource}: {e}"))),
        }
    }

    /// The calendar described by [`MeetingOptions::timezone`].
    pub fn calendar(&self) -> Result<Calendar> {
        Ok(Calendar::from_name(&self.timezone)?)
    }
}
