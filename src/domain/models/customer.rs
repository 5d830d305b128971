use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub const DEFAULT_PRICE_PER_4_SESSIONS: i64 = 30000;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    /// `None` only on records written before customers were tagged with an owner.
    #[serde(default, rename = "userId")]
    #[sqlx(rename = "user_id")]
    pub owner_user_id: Option<String>,
    #[serde(default = "default_price")]
    pub price_per_4_sessions: i64,
    pub created_at: DateTime<Utc>,
}

fn default_price() -> i64 {
    DEFAULT_PRICE_PER_4_SESSIONS
}

/// Missing or non-positive prices fall back to the standard bundle price.
pub fn normalize_price(price: Option<i64>) -> i64 {
    match price {
        Some(p) if p > 0 => p,
        _ => DEFAULT_PRICE_PER_4_SESSIONS,
    }
}

impl Customer {
    pub fn is_visible_to(&self, user_id: &str) -> bool {
        match &self.owner_user_id {
            Some(owner) => owner == user_id,
            None => true,
        }
    }

    /// Price with the default applied, for records that stored zero.
    pub fn bundle_price(&self) -> i64 {
        normalize_price(Some(self.price_per_4_sessions))
    }
}

pub struct NewCustomer {
    pub owner_user_id: String,
    pub name: String,
    pub price_per_4_sessions: i64,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerChanges {
    pub name: Option<String>,
    pub price_per_4_sessions: Option<i64>,
}

impl CustomerChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price_per_4_sessions.is_none()
    }

    pub fn apply_to(&self, customer: &mut Customer) {
        if let Some(name) = &self.name {
            customer.name = name.clone();
        }
        if let Some(price) = self.price_per_4_sessions {
            customer.price_per_4_sessions = price;
        }
    }
}
