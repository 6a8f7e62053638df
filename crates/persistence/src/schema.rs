//! Table schema for clients and their phone numbers.

use sqlx::PgPool;

use crate::metrics::QueryTimer;

/// DDL for the `clients` and `clients_numbers` tables.
pub const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Creates the tables if they do not exist yet. Safe to run repeatedly.
pub async fn create_tables(pool: &PgPool) -> Result<(), sqlx::Error> {
    let timer = QueryTimer::new("create_tables");
    let result = sqlx::raw_sql(SCHEMA_SQL).execute(pool).await.map(|_| ());
    timer.finish(&result);
    result
}
