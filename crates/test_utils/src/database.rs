//! Database Test Utilities
//!
//! Starts a throwaway PostgreSQL container with the notes schema applied.
//! Tests build their own pools from [`TestDatabase::connection_url`], so each
//! pool lives on the test's own runtime.

use sqlx::{Connection, Executor, PgConnection};
use std::time::Duration;
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};

/// Default PostgreSQL image for testing
const POSTGRES_IMAGE: &str = "postgres";
const POSTGRES_TAG: &str = "16-alpine";
const POSTGRES_USER: &str = "test_user";
const POSTGRES_PASSWORD: &str = "test_password";
const POSTGRES_DB: &str = "notes_test";

/// Schema for the `notes` table
pub const NOTES_SCHEMA: &str = include_str!("../../../migrations/20240101_000001_create_notes.sql");

const CONNECT_ATTEMPTS: u32 = 30;

pub type TestResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Configuration for test database
#[derive(Debug, Clone)]
pub struct TestDatabaseConfig {
    pub user: String,
    pub password: String,
    pub database: String,
    pub host: String,
    pub port: u16,
}

impl Default for TestDatabaseConfig {
    fn default() -> Self {
        Self {
            user: POSTGRES_USER.to_string(),
            password: POSTGRES_PASSWORD.to_string(),
            database: POSTGRES_DB.to_string(),
            host: "localhost".to_string(),
            port: 5432,
        }
    }
}

impl TestDatabaseConfig {
    /// Creates the database connection URL
    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

/// A wrapper around a PostgreSQL test container
pub struct TestDatabase {
    _container: ContainerAsync<GenericImage>,
    pub config: TestDatabaseConfig,
}

impl TestDatabase {
    /// Starts a new PostgreSQL container and applies the notes schema
    ///
    /// # Errors
    ///
    /// Returns an error if the container fails to start or the schema fails to apply
    pub async fn new() -> TestResult<Self> {
        let container = GenericImage::new(POSTGRES_IMAGE, POSTGRES_TAG)
            .with_exposed_port(5432.tcp())
            .with_wait_for(WaitFor::message_on_stderr(
                "database system is ready to accept connections",
            ))
            .with_env_var("POSTGRES_USER", POSTGRES_USER)
            .with_env_var("POSTGRES_PASSWORD", POSTGRES_PASSWORD)
            .with_env_var("POSTGRES_DB", POSTGRES_DB)
            .start()
            .await?;

        let port = container.get_host_port_ipv4(5432).await?;
        let host = container.get_host().await?.to_string();

        let test_db = Self {
            _container: container,
            config: TestDatabaseConfig {
                host,
                port,
                ..TestDatabaseConfig::default()
            },
        };

        test_db.execute(NOTES_SCHEMA).await?;
        Ok(test_db)
    }

    pub fn connection_url(&self) -> String {
        self.config.connection_url()
    }

    /// Runs raw SQL on a dedicated connection
    ///
    /// Retries the connect while the server finishes its startup restart.
    pub async fn execute(&self, sql: &str) -> TestResult<()> {
        let mut conn = self.connect().await?;
        conn.execute(sql).await?;
        conn.close().await?;
        Ok(())
    }

    /// Empties the notes table and resets its id sequence
    pub async fn clear_data(&self) -> TestResult<()> {
        self.execute("TRUNCATE TABLE notes RESTART IDENTITY").await
    }

    async fn connect(&self) -> TestResult<PgConnection> {
        let url = self.connection_url();
        let mut attempt = 0;
        loop {
            match PgConnection::connect(&url).await {
                Ok(conn) => return Ok(conn),
                Err(_) if attempt < CONNECT_ATTEMPTS => {
                    attempt += 1;
                    tokio::time::sleep(Duration::from_millis(200)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
