use axum::{
    body::Body,
    extract::Request,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{appointment, auth, customer, health, payment, training_record};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Auth
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/session", get(auth::session))
        .route("/api/v1/auth/password", put(auth::change_password))
        .route("/api/v1/auth/account", delete(auth::delete_account))

        // Customers
        .route("/api/v1/customers", get(customer::list_customers).post(customer::create_customer))
        .route("/api/v1/customers/{customer_id}", get(customer::get_customer).put(customer::update_customer).delete(customer::delete_customer))

        // Appointments
        .route("/api/v1/appointments", get(appointment::list_appointments).post(appointment::create_appointment))
        .route("/api/v1/appointments/conflicts", get(appointment::check_conflicts))
        .route("/api/v1/appointments/{appointment_id}", put(appointment::update_appointment).delete(appointment::delete_appointment))

        // Payments
        .route("/api/v1/payments", get(payment::list_payments).post(payment::create_payment))
        .route("/api/v1/payments/{payment_id}", put(payment::update_payment).delete(payment::delete_payment))

        // Training records
        .route("/api/v1/training-records", get(training_record::list_training_records).post(training_record::create_training_record))
        .route("/api/v1/training-records/{record_id}", put(training_record::update_training_record).delete(training_record::delete_training_record))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
