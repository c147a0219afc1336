//! Scheduling detail attached to an accepted ticket.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use aidbridge_core::AppError;

/// Maximum accepted length for free-text volunteer fields.
const MAX_FIELD_LEN: usize = 200;

/// Validated volunteer and time slot for a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingDetail {
    /// Name of the volunteer doing the pickup or handoff.
    pub volunteer_name: String,
    /// Phone number or other contact for the volunteer.
    pub volunteer_contact: String,
    /// Calendar date of the slot.
    pub date: NaiveDate,
    /// Start time of the slot.
    pub time: NaiveTime,
}

impl SchedulingDetail {
    /// The slot start as a UTC timestamp.
    pub fn scheduled_at(&self) -> DateTime<Utc> {
        self.date.and_time(self.time).and_utc()
    }
}

/// Raw scheduling input as received from a caller.
///
/// Every field is optional here so that missing fields are reported as a
/// validation failure naming all of them, not as a deserialization error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// Volunteer name.
    pub volunteer_name: Option<String>,
    /// Volunteer contact.
    pub volunteer_contact: Option<String>,
    /// Date as `YYYY-MM-DD`.
    pub date: Option<String>,
    /// Time as `HH:MM` or `HH:MM:SS`.
    pub time: Option<String>,
}

impl ScheduleRequest {
    /// Build a request with all four fields present.
    pub fn new(
        volunteer_name: impl Into<String>,
        volunteer_contact: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self {
            volunteer_name: Some(volunteer_name.into()),
            volunteer_contact: Some(volunteer_contact.into()),
            date: Some(date.into()),
            time: Some(time.into()),
        }
    }

    /// Validate all four fields and produce a [`SchedulingDetail`].
    pub fn validate(&self) -> Result<SchedulingDetail, AppError> {
        let name = present(&self.volunteer_name);
        let contact = present(&self.volunteer_contact);
        let date = present(&self.date);
        let time = present(&self.time);

        let missing: Vec<&str> = [
            ("volunteer_name", name.is_none()),
            ("volunteer_contact", contact.is_none()),
            ("date", date.is_none()),
            ("time", time.is_none()),
        ]
        .into_iter()
        .filter_map(|(field, absent)| absent.then_some(field))
        .collect();

        if !missing.is_empty() {
            return Err(AppError::validation(format!(
                "Missing scheduling fields: {}",
                missing.join(", ")
            )));
        }

        let (Some(name), Some(contact), Some(date), Some(time)) = (name, contact, date, time)
        else {
            return Err(AppError::internal("scheduling field check out of sync"));
        };

        if name.len() > MAX_FIELD_LEN || contact.len() > MAX_FIELD_LEN {
            return Err(AppError::validation(format!(
                "Volunteer name and contact must be at most {MAX_FIELD_LEN} characters"
            )));
        }

        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
            AppError::validation(format!("Invalid date '{date}', expected YYYY-MM-DD"))
        })?;
        let time = NaiveTime::parse_from_str(time, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
            .map_err(|_| AppError::validation(format!("Invalid time '{time}', expected HH:MM")))?;

        Ok(SchedulingDetail {
            volunteer_name: name.to_string(),
            volunteer_contact: contact.to_string(),
            date,
            time,
        })
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
