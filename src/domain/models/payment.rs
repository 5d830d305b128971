use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use sqlx::FromRow;

/// A payment line. Bundle-model records carry `sets` and `unit_price`;
/// legacy records only have `amount`.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub customer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<i64>,
    #[serde(default)]
    pub amount: i64,
    pub date: NaiveDate,
    #[serde(default)]
    pub for_period: String,
    #[serde(default)]
    pub note: String,
}

impl Payment {
    /// `sets * unit_price` when both are present (and sets is non-zero), else the stored amount.
    pub fn total(&self) -> i64 {
        match (self.sets, self.unit_price) {
            (Some(sets), Some(unit_price)) if sets != 0 => sets.saturating_mul(unit_price),
            _ => self.amount,
        }
    }
}

pub fn sum_totals<'a>(payments: impl IntoIterator<Item = &'a Payment>) -> i64 {
    payments.into_iter().map(Payment::total).fold(0, i64::saturating_add)
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub customer_id: String,
    pub sets: i64,
    pub unit_price: i64,
    pub date: NaiveDate,
    pub for_period: String,
    pub note: String,
}

impl NewPayment {
    pub fn amount(&self) -> i64 {
        self.sets.saturating_mul(self.unit_price)
    }
}

/// What a caller asks for; `unit_price` falls back to the customer's bundle price.
#[derive(Debug, Clone)]
pub struct PaymentDraft {
    pub customer_id: String,
    pub sets: i64,
    pub unit_price: Option<i64>,
    pub date: NaiveDate,
    pub for_period: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct PaymentChanges {
    pub sets: Option<i64>,
    pub unit_price: Option<i64>,
    pub date: Option<NaiveDate>,
    pub for_period: Option<String>,
    pub note: Option<String>,
}

impl PaymentChanges {
    pub fn is_empty(&self) -> bool {
        self.sets.is_none()
            && self.unit_price.is_none()
            && self.date.is_none()
            && self.for_period.is_none()
            && self.note.is_none()
    }

    pub fn apply_to(&self, payment: &mut Payment) {
        if let Some(sets) = self.sets {
            payment.sets = Some(sets);
        }
        if let Some(unit_price) = self.unit_price {
            payment.unit_price = Some(unit_price);
        }
        if let (Some(sets), Some(unit_price)) = (payment.sets, payment.unit_price)
            && (self.sets.is_some() || self.unit_price.is_some())
        {
            payment.amount = sets.saturating_mul(unit_price);
        }
        if let Some(date) = self.date {
            payment.date = date;
        }
        if let Some(for_period) = &self.for_period {
            payment.for_period = for_period.clone();
        }
        if let Some(note) = &self.note {
            payment.note = note.clone();
        }
    }
}
