use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRecord {
    pub id: String,
    pub customer_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct NewTrainingRecord {
    pub customer_id: String,
    pub date: NaiveDate,
    pub content: String,
}

#[derive(Debug, Default, Clone)]
pub struct TrainingRecordChanges {
    pub date: Option<NaiveDate>,
    pub content: Option<String>,
}

impl TrainingRecordChanges {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.content.is_none()
    }

    pub fn apply_to(&self, record: &mut TrainingRecord) {
        if let Some(date) = self.date {
            record.date = date;
        }
        if let Some(content) = &self.content {
            record.content = content.clone();
        }
    }
}
