use serde::Serialize;
use crate::domain::models::{
    appointment::Appointment, customer::Customer, payment::Payment,
    training_record::TrainingRecord, user::Identity,
};

#[derive(Serialize)]
pub struct SessionResponse {
    pub user: Option<Identity>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    #[serde(flatten)]
    pub customer: Customer,
    pub payment_total: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetailResponse {
    pub customer: Customer,
    pub appointments: Vec<Appointment>,
    pub payments: Vec<Payment>,
    pub training_records: Vec<TrainingRecord>,
    pub payment_total: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentListResponse {
    pub payments: Vec<Payment>,
    pub total: i64,
}
