//! Common test utilities for integration tests.
//!
//! Tests run against a real PostgreSQL database given by `TEST_DATABASE_URL`.
//! Each test gets its own schema, so tests can run in parallel without
//! seeing each other's rows. Without `TEST_DATABASE_URL` the database tests
//! return early.

#![allow(dead_code)]

use client_directory::{ClientDirectory, NewClient};
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use uuid::Uuid;

/// A directory bound to a private schema.
pub struct TestContext {
    pub directory: ClientDirectory,
    admin_pool: PgPool,
    schema: String,
}

impl TestContext {
    /// Creates a fresh schema with initialized tables, or `None` if no test
    /// database is configured.
    pub async fn new() -> Option<Self> {
        let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("TEST_DATABASE_URL not set, skipping database test");
            return None;
        };

        let schema = format!("client_directory_test_{}", Uuid::new_v4().simple());

        let admin_pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        sqlx::query(&format!("CREATE SCHEMA {}", schema))
            .execute(&admin_pool)
            .await
            .expect("Failed to create test schema");

        let search_path = format!("SET search_path TO {}", schema);
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .after_connect(move |conn, _meta| {
                let sql = search_path.clone();
                Box::pin(async move {
                    sqlx::query(&sql).execute(&mut *conn).await?;
                    Ok(())
                })
            })
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        let directory = ClientDirectory::new(pool);
        directory
            .initialize()
            .await
            .expect("Failed to initialize tables");

        Some(Self {
            directory,
            admin_pool,
            schema,
        })
    }

    /// Counts rows in `clients_numbers`.
    pub async fn phone_row_count(&self) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM clients_numbers")
            .fetch_one(self.directory.pool())
            .await
            .expect("Failed to count phone numbers")
    }

    /// Counts rows in `clients`.
    pub async fn client_row_count(&self) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM clients")
            .fetch_one(self.directory.pool())
            .await
            .expect("Failed to count clients")
    }

    /// Drops the schema and everything in it.
    pub async fn cleanup(self) {
        self.directory.pool().close().await;
        sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .execute(&self.admin_pool)
            .await
            .expect("Failed to drop test schema");
    }
}

/// A client with random names and a unique email.
pub fn fake_client() -> NewClient {
    let first_name: String = FirstName().fake();
    let last_name: String = LastName().fake();
    let email = format!("{}@example.com", Uuid::new_v4().simple());
    NewClient::new(first_name, last_name, email)
}
