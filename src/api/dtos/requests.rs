use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use crate::error::AppError;

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
    pub name: String,
    pub price_per_4_sessions: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    pub price_per_4_sessions: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub customer_id: String,
    pub datetime: String,
    pub session_number: Option<i32>,
    pub notes: Option<String>,
    #[serde(default)]
    pub force: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentRequest {
    pub datetime: Option<String>,
    pub session_number: Option<i32>,
    pub notes: Option<String>,
    #[serde(default)]
    pub force: bool,
}

#[derive(Deserialize)]
pub struct ConflictQuery {
    pub datetime: String,
    pub exclude: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub customer_id: String,
    pub sets: Option<i64>,
    pub unit_price: Option<i64>,
    pub date: NaiveDate,
    pub for_period: Option<String>,
    pub note: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentRequest {
    pub sets: Option<i64>,
    pub unit_price: Option<i64>,
    pub date: Option<NaiveDate>,
    pub for_period: Option<String>,
    pub note: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrainingRecordRequest {
    pub customer_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub content: String,
}

#[derive(Deserialize)]
pub struct UpdateTrainingRecordRequest {
    pub date: Option<NaiveDate>,
    pub content: Option<String>,
}

/// RFC 3339, or a wall-clock `YYYY-MM-DDTHH:MM[:SS]` read in the trainer's timezone.
pub fn parse_instant(input: &str, tz: Tz) -> Result<DateTime<Utc>, AppError> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| AppError::Validation("Invalid datetime (expected RFC 3339 or YYYY-MM-DDTHH:MM)".into()))?;

    tz.from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or(AppError::Validation("Invalid local time (ambiguous or skipped due to DST)".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_instant_formats() {
        let utc = parse_instant("2024-03-01T10:00:00Z", chrono_tz::UTC).unwrap();
        assert_eq!(utc.to_rfc3339(), "2024-03-01T10:00:00+00:00");

        let local = parse_instant("2024-03-01T10:00", chrono_tz::Asia::Tokyo).unwrap();
        assert_eq!(local.to_rfc3339(), "2024-03-01T01:00:00+00:00");

        let offset = parse_instant("2024-03-01T10:00:00+09:00", chrono_tz::UTC).unwrap();
        assert_eq!(offset, local);
    }

    #[test]
    fn test_parse_instant_rejects_garbage_and_dst_gaps() {
        assert!(matches!(parse_instant("tomorrow", chrono_tz::UTC), Err(AppError::Validation(_))));
        assert!(matches!(
            parse_instant("2024-03-31T02:30", chrono_tz::Europe::Berlin),
            Err(AppError::Validation(_))
        ));
    }
}
