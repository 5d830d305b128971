#![allow(dead_code)]

use trainer_desk::{
    api::{extractors::auth::SESSION_COOKIE, router::create_router},
    config::Config,
    domain::models::{
        appointment::{Appointment, AppointmentChanges, NewAppointment},
        customer::{Customer, CustomerChanges, NewCustomer},
        payment::{NewPayment, Payment, PaymentChanges},
        session::{generate_session_token, Session},
        training_record::{NewTrainingRecord, TrainingRecord, TrainingRecordChanges},
        user::Identity,
    },
    domain::ports::{
        AppointmentRepository, CustomerRepository, IdentityProvider, PaymentRepository,
        TrainingRecordRepository,
    },
    domain::services::{
        password::PasswordScheme,
        record_store::{RecordStore, SyncStrategy},
    },
    error::AppError,
    infra::factory::{local_state, run_sqlite_migrations},
    state::AppState,
};
use async_trait::async_trait;
use std::sync::Mutex;
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use tower::ServiceExt;
use serde_json::Value;

pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    /// Last session token handed out through `Set-Cookie`.
    pub session_token: Mutex<Option<String>>,
}

pub fn test_config(db_url: &str) -> Config {
    Config {
        database_url: db_url.to_string(),
        port: 0,
        salt_secret: "_trainer_salt_2024".to_string(),
        password_scheme: PasswordScheme::Sha256,
        identity_url: None,
        identity_api_key: None,
        identity_service_key: None,
        identity_email_domain: "@trainer.app".to_string(),
        timezone: chrono_tz::UTC,
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        run_sqlite_migrations(&pool).await;

        let state = Arc::new(local_state(&test_config(&db_url), pool.clone()));
        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            session_token: Mutex::new(None),
        }
    }

    /// Sends a JSON request with the current session cookie and returns the status with
    /// the parsed body (`Null` when empty). A `Set-Cookie` for the session updates the cookie.
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let token = self.session_token.lock().unwrap().clone();
        let (status, value, issued) = self.dispatch(method, uri, body, token.as_deref()).await;
        if let Some(issued) = issued {
            *self.session_token.lock().unwrap() = if issued.is_empty() { None } else { Some(issued) };
        }
        (status, value)
    }

    /// Without any cookie. Leaves the stored session token alone.
    pub async fn send_anonymous(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send_with_token(method, uri, body, None).await
    }

    /// With an explicit token. Leaves the stored session token alone.
    pub async fn send_with_token(&self, method: &str, uri: &str, body: Option<Value>, token: Option<&str>) -> (StatusCode, Value) {
        let (status, value, _) = self.dispatch(method, uri, body, token).await;
        (status, value)
    }

    async fn dispatch(&self, method: &str, uri: &str, body: Option<Value>, token: Option<&str>) -> (StatusCode, Value, Option<String>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("{}={}", SESSION_COOKIE, token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let issued = session_cookie(&response);
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value, issued)
    }

    pub async fn register(&self, username: &str, password: &str) -> Value {
        let (status, body) = self.send(
            "POST",
            "/api/v1/auth/register",
            Some(serde_json::json!({"username": username, "password": password})),
        ).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        body
    }

    pub async fn login(&self, username: &str, password: &str) -> Value {
        let (status, body) = self.send(
            "POST",
            "/api/v1/auth/login",
            Some(serde_json::json!({"username": username, "password": password})),
        ).await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body
    }

    pub async fn create_customer(&self, name: &str) -> String {
        let (status, body) = self.send(
            "POST",
            "/api/v1/customers",
            Some(serde_json::json!({"name": name})),
        ).await;
        assert_eq!(status, StatusCode::CREATED, "create customer failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    /// Writes a raw document into the local store, bypassing the repositories.
    pub async fn put_raw(&self, key: &str, value: &str) {
        sqlx::query("INSERT INTO local_store (key, value, updated_at) VALUES (?, ?, ?)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value")
            .bind(key)
            .bind(value)
            .bind(chrono::Utc::now())
            .execute(&self.pool)
            .await
            .unwrap();
    }

    pub async fn get_raw(&self, key: &str) -> Option<String> {
        sqlx::query_scalar::<_, String>("SELECT value FROM local_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .unwrap()
    }
}

fn session_cookie(response: &axum::response::Response) -> Option<String> {
    let prefix = format!("{}=", SESSION_COOKIE);
    response.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .find(|c| c.starts_with(&prefix))
        .map(|c| {
            let value = &c[prefix.len()..];
            value.split(';').next().unwrap_or("").to_string()
        })
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

/// In-memory stand-in for the four record ports.
///
/// `fail_step` makes the named bulk delete ("appointments", "payments",
/// "training records") or a customer delete ("customer") fail, and
/// `fail_lists` makes every `list` call fail.
#[derive(Default)]
pub struct MemoryRecords {
    pub customers: Mutex<Vec<Customer>>,
    pub appointments: Mutex<Vec<Appointment>>,
    pub payments: Mutex<Vec<Payment>>,
    pub training_records: Mutex<Vec<TrainingRecord>>,
    pub fail_step: Mutex<Option<&'static str>>,
    pub fail_lists: Mutex<bool>,
}

impl MemoryRecords {
    pub fn store(self: &Arc<Self>, sync: SyncStrategy) -> RecordStore {
        RecordStore {
            customers: self.clone(),
            appointments: self.clone(),
            payments: self.clone(),
            training_records: self.clone(),
            sync,
        }
    }

    pub fn fail_at(&self, step: &'static str) {
        *self.fail_step.lock().unwrap() = Some(step);
    }

    fn check(&self, step: &str) -> Result<(), AppError> {
        if *self.fail_step.lock().unwrap() == Some(step) {
            return Err(AppError::Storage(format!("injected failure at {}", step)));
        }
        Ok(())
    }

    fn check_list(&self) -> Result<(), AppError> {
        if *self.fail_lists.lock().unwrap() {
            return Err(AppError::Storage("injected read failure".into()));
        }
        Ok(())
    }
}

fn missing(what: &str) -> AppError {
    AppError::NotFound(format!("{} not found", what))
}

#[async_trait]
impl CustomerRepository for MemoryRecords {
    async fn list(&self) -> Result<Vec<Customer>, AppError> {
        self.check_list()?;
        Ok(self.customers.lock().unwrap().clone())
    }

    async fn insert(&self, customer: &NewCustomer) -> Result<Customer, AppError> {
        let created = Customer {
            id: Uuid::new_v4().to_string(),
            name: customer.name.clone(),
            owner_user_id: Some(customer.owner_user_id.clone()),
            price_per_4_sessions: customer.price_per_4_sessions,
            created_at: chrono::Utc::now(),
        };
        self.customers.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &str, changes: &CustomerChanges) -> Result<(), AppError> {
        let mut items = self.customers.lock().unwrap();
        let c = items.iter_mut().find(|c| c.id == id).ok_or_else(|| missing("Customer"))?;
        changes.apply_to(c);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.check("customer")?;
        self.customers.lock().unwrap().retain(|c| c.id != id);
        Ok(())
    }

    async fn claim_unowned(&self, owner_id: &str) -> Result<usize, AppError> {
        let mut items = self.customers.lock().unwrap();
        let mut claimed = 0;
        for c in items.iter_mut().filter(|c| c.owner_user_id.is_none()) {
            c.owner_user_id = Some(owner_id.to_string());
            claimed += 1;
        }
        Ok(claimed)
    }
}

#[async_trait]
impl AppointmentRepository for MemoryRecords {
    async fn list(&self) -> Result<Vec<Appointment>, AppError> {
        self.check_list()?;
        Ok(self.appointments.lock().unwrap().clone())
    }

    async fn list_for_customers(&self, customer_ids: &[String]) -> Result<Vec<Appointment>, AppError> {
        Ok(self.appointments.lock().unwrap().iter()
            .filter(|a| customer_ids.contains(&a.customer_id))
            .cloned()
            .collect())
    }

    async fn insert(&self, appointment: &NewAppointment) -> Result<Appointment, AppError> {
        let created = Appointment {
            id: Uuid::new_v4().to_string(),
            customer_id: appointment.customer_id.clone(),
            datetime: appointment.datetime,
            session_number: appointment.session_number,
            notes: appointment.notes.clone(),
        };
        self.appointments.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &str, changes: &AppointmentChanges) -> Result<(), AppError> {
        let mut items = self.appointments.lock().unwrap();
        let a = items.iter_mut().find(|a| a.id == id).ok_or_else(|| missing("Appointment"))?;
        changes.apply_to(a);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.appointments.lock().unwrap().retain(|a| a.id != id);
        Ok(())
    }

    async fn delete_by_customer(&self, customer_id: &str) -> Result<(), AppError> {
        self.check("appointments")?;
        self.appointments.lock().unwrap().retain(|a| a.customer_id != customer_id);
        Ok(())
    }
}

#[async_trait]
impl PaymentRepository for MemoryRecords {
    async fn list(&self) -> Result<Vec<Payment>, AppError> {
        self.check_list()?;
        Ok(self.payments.lock().unwrap().clone())
    }

    async fn insert(&self, payment: &NewPayment) -> Result<Payment, AppError> {
        let created = Payment {
            id: Uuid::new_v4().to_string(),
            customer_id: payment.customer_id.clone(),
            sets: Some(payment.sets),
            unit_price: Some(payment.unit_price),
            amount: payment.amount(),
            date: payment.date,
            for_period: payment.for_period.clone(),
            note: payment.note.clone(),
        };
        self.payments.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &str, changes: &PaymentChanges) -> Result<(), AppError> {
        let mut items = self.payments.lock().unwrap();
        let p = items.iter_mut().find(|p| p.id == id).ok_or_else(|| missing("Payment"))?;
        changes.apply_to(p);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.payments.lock().unwrap().retain(|p| p.id != id);
        Ok(())
    }

    async fn delete_by_customer(&self, customer_id: &str) -> Result<(), AppError> {
        self.check("payments")?;
        self.payments.lock().unwrap().retain(|p| p.customer_id != customer_id);
        Ok(())
    }
}

#[async_trait]
impl TrainingRecordRepository for MemoryRecords {
    async fn list(&self) -> Result<Vec<TrainingRecord>, AppError> {
        self.check_list()?;
        Ok(self.training_records.lock().unwrap().clone())
    }

    async fn insert(&self, record: &NewTrainingRecord) -> Result<TrainingRecord, AppError> {
        let created = TrainingRecord {
            id: Uuid::new_v4().to_string(),
            customer_id: record.customer_id.clone(),
            date: record.date,
            content: record.content.clone(),
        };
        self.training_records.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &str, changes: &TrainingRecordChanges) -> Result<(), AppError> {
        let mut items = self.training_records.lock().unwrap();
        let t = items.iter_mut().find(|t| t.id == id).ok_or_else(|| missing("Training record"))?;
        changes.apply_to(t);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.training_records.lock().unwrap().retain(|t| t.id != id);
        Ok(())
    }

    async fn delete_by_customer(&self, customer_id: &str) -> Result<(), AppError> {
        self.check("training records")?;
        self.training_records.lock().unwrap().retain(|t| t.customer_id != customer_id);
        Ok(())
    }
}

/// In-memory identity provider with the hosted service's rules: six-character
/// minimum, generic bad-credentials error, re-authentication before a password change.
pub struct MemoryIdentity {
    pub users: Mutex<Vec<(Identity, String)>>,
    pub session: Mutex<Option<Session>>,
}

pub const MEMORY_MIN_PASSWORD_LEN: usize = 6;

impl MemoryIdentity {
    pub fn new() -> Self {
        Self { users: Mutex::new(Vec::new()), session: Mutex::new(None) }
    }

    fn open(&self, identity: &Identity) -> Session {
        let session = Session::new(identity, generate_session_token());
        *self.session.lock().unwrap() = Some(session.clone());
        session
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    fn min_password_len(&self) -> usize {
        MEMORY_MIN_PASSWORD_LEN
    }

    async fn sign_up(&self, username: &str, password: &str) -> Result<Session, AppError> {
        let identity = {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|(u, _)| u.username == username) {
                return Err(AppError::DuplicateUser);
            }
            let identity = Identity { id: Uuid::new_v4().to_string(), username: username.to_string() };
            users.push((identity.clone(), password.to_string()));
            identity
        };
        Ok(self.open(&identity))
    }

    async fn sign_in(&self, username: &str, password: &str) -> Result<Session, AppError> {
        let identity = self.users.lock().unwrap().iter()
            .find(|(u, p)| u.username == username && p == password)
            .map(|(u, _)| u.clone())
            .ok_or_else(AppError::bad_credentials)?;
        Ok(self.open(&identity))
    }

    async fn current_session(&self) -> Result<Option<Session>, AppError> {
        Ok(self.session.lock().unwrap().clone())
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        *self.session.lock().unwrap() = None;
        Ok(())
    }

    async fn change_password(&self, username: &str, current_password: &str, new_password: &str) -> Result<(), AppError> {
        let mut users = self.users.lock().unwrap();
        let entry = users.iter_mut()
            .find(|(u, p)| u.username == username && p == current_password)
            .ok_or_else(|| AppError::Auth("Current password is incorrect".into()))?;
        if new_password.encode_utf16().count() < MEMORY_MIN_PASSWORD_LEN {
            return Err(AppError::Validation(format!("Password must be at least {} characters", MEMORY_MIN_PASSWORD_LEN)));
        }
        entry.1 = new_password.to_string();
        Ok(())
    }

    async fn remove_user(&self, user_id: &str) -> Result<(), AppError> {
        self.users.lock().unwrap().retain(|(u, _)| u.id != user_id);
        Ok(())
    }
}
