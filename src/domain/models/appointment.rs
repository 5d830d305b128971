use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub const MAX_SESSION_NUMBER: i32 = 4;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub customer_id: String,
    pub datetime: DateTime<Utc>,
    #[serde(default = "first_session")]
    pub session_number: i32,
    #[serde(default)]
    pub notes: String,
}

fn first_session() -> i32 {
    1
}

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub customer_id: String,
    pub datetime: DateTime<Utc>,
    pub session_number: i32,
    pub notes: String,
}

impl NewAppointment {
    /// Defaults the session number to 1 and trims the notes.
    pub fn new(customer_id: String, datetime: DateTime<Utc>, session_number: Option<i32>, notes: Option<String>) -> Self {
        Self {
            customer_id,
            datetime,
            session_number: session_number.unwrap_or(1),
            notes: notes.unwrap_or_default().trim().to_string(),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct AppointmentChanges {
    pub datetime: Option<DateTime<Utc>>,
    pub session_number: Option<i32>,
    pub notes: Option<String>,
}

impl AppointmentChanges {
    pub fn is_empty(&self) -> bool {
        self.datetime.is_none() && self.session_number.is_none() && self.notes.is_none()
    }

    pub fn apply_to(&self, appointment: &mut Appointment) {
        if let Some(datetime) = self.datetime {
            appointment.datetime = datetime;
        }
        if let Some(n) = self.session_number {
            appointment.session_number = n;
        }
        if let Some(notes) = &self.notes {
            appointment.notes = notes.clone();
        }
    }
}

/// An existing appointment that collides with a proposed time, labelled for display.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConflictingAppointment {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub customer_name: String,
}
