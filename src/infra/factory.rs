use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::ports::IdentityProvider;
use crate::domain::services::{
    auth_service::AuthService,
    password::CredentialHasher,
    record_store::{RecordStore, SyncStrategy},
};
use crate::infra::identity::{hosted_identity::HostedIdentityProvider, local_identity::LocalIdentityProvider};
use crate::infra::local::document_store::LocalDocumentStore;
use crate::infra::repositories::{
    local_appointment_repo::LocalAppointmentRepo, local_credential_repo::LocalCredentialRepo,
    local_customer_repo::LocalCustomerRepo, local_payment_repo::LocalPaymentRepo,
    local_training_record_repo::LocalTrainingRecordRepo,
    postgres_appointment_repo::PostgresAppointmentRepo, postgres_customer_repo::PostgresCustomerRepo,
    postgres_payment_repo::PostgresPaymentRepo, postgres_training_record_repo::PostgresTrainingRecordRepo,
};

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    if config.is_hosted() {
        info!("Initializing PostgreSQL connection (hosted mode)...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        let provider: Arc<dyn IdentityProvider> = Arc::new(HostedIdentityProvider::new(
            config.identity_url.clone().expect("IDENTITY_URL must be set in hosted mode"),
            config.identity_api_key.clone().expect("IDENTITY_API_KEY must be set in hosted mode"),
            config.identity_service_key.clone(),
            config.identity_email_domain.clone(),
        ));

        let records = hosted_records(pool);
        let auth_service = Arc::new(AuthService::new(provider, records.clone()));
        AppState::new(config.clone(), auth_service, records)
    } else {
        info!("Initializing SQLite connection with WAL Mode (local mode)...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        local_state(config, pool)
    }
}

/// Wires the local backend on an already-migrated pool.
pub fn local_state(config: &Config, pool: SqlitePool) -> AppState {
    let store = Arc::new(LocalDocumentStore::new(pool));
    let hasher = CredentialHasher::new(config.salt_secret.clone(), config.password_scheme);
    let provider: Arc<dyn IdentityProvider> = Arc::new(LocalIdentityProvider::new(
        Arc::new(LocalCredentialRepo::new(store.clone())),
        hasher,
    ));

    let records = RecordStore {
        customers: Arc::new(LocalCustomerRepo::new(store.clone())),
        appointments: Arc::new(LocalAppointmentRepo::new(store.clone())),
        payments: Arc::new(LocalPaymentRepo::new(store.clone())),
        training_records: Arc::new(LocalTrainingRecordRepo::new(store)),
        sync: SyncStrategy::InPlace,
    };
    let auth_service = Arc::new(AuthService::new(provider, records.clone()));
    AppState::new(config.clone(), auth_service, records)
}

fn hosted_records(pool: PgPool) -> RecordStore {
    RecordStore {
        customers: Arc::new(PostgresCustomerRepo::new(pool.clone())),
        appointments: Arc::new(PostgresAppointmentRepo::new(pool.clone())),
        payments: Arc::new(PostgresPaymentRepo::new(pool.clone())),
        training_records: Arc::new(PostgresTrainingRecordRepo::new(pool)),
        sync: SyncStrategy::Reload,
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

pub async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
