//! Client repository for database operations.

use domain::models::{ClientFilter, ClientUpdate};
use sqlx::{PgConnection, PgPool};

use crate::entities::ClientPhoneRowEntity;
use crate::metrics::QueryTimer;

const CLIENT_ROWS_SELECT: &str = r#"
    SELECT c.id, c.first_name, c.last_name, c.email, cn.phone_number
    FROM clients c
    LEFT JOIN clients_numbers cn ON cn.client_id = c.id
"#;

const CLIENT_ROWS_ORDER: &str = " ORDER BY c.id, cn.id";

/// Repository for client and phone number database operations.
#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    /// Creates a new ClientRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert a client and its phone numbers in one transaction.
    ///
    /// Returns the id assigned to the client.
    pub async fn insert_client(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        phone_numbers: &[String],
    ) -> Result<i32, sqlx::Error> {
        let timer = QueryTimer::new("insert_client");
        let result: Result<i32, sqlx::Error> = async {
            let mut tx = self.pool.begin().await?;

            let client_id = sqlx::query_scalar::<_, i32>(
                r#"
                INSERT INTO clients (first_name, last_name, email)
                VALUES ($1, $2, $3)
                RETURNING id
                "#,
            )
            .bind(first_name)
            .bind(last_name)
            .bind(email)
            .fetch_one(&mut *tx)
            .await?;

            insert_phone_numbers(&mut *tx, client_id, phone_numbers).await?;

            tx.commit().await?;
            Ok(client_id)
        }
        .await;
        timer.finish(&result);
        result
    }

    /// Insert a single phone number for a client.
    ///
    /// Returns the id of the new phone number row.
    pub async fn insert_phone_number(
        &self,
        client_id: i32,
        phone_number: &str,
    ) -> Result<i32, sqlx::Error> {
        let timer = QueryTimer::new("insert_phone_number");
        let result = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO clients_numbers (phone_number, client_id)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(phone_number)
        .bind(client_id)
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Apply a partial update to a client in one transaction.
    ///
    /// Only present fields are written. A present phone number list replaces
    /// every existing number of the client. Returns whether a client with
    /// `client_id` exists.
    pub async fn update_client(
        &self,
        client_id: i32,
        update: &ClientUpdate,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("update_client");
        let result: Result<bool, sqlx::Error> = async {
            let mut tx = self.pool.begin().await?;

            let client_found = if update.has_field_changes() {
                let query = format!(
                    "UPDATE clients SET {} WHERE id = $1",
                    update_assignments(update).join(", ")
                );

                let mut q = sqlx::query(&query).bind(client_id);
                if let Some(first_name) = &update.first_name {
                    q = q.bind(first_name);
                }
                if let Some(last_name) = &update.last_name {
                    q = q.bind(last_name);
                }
                if let Some(email) = &update.email {
                    q = q.bind(email);
                }

                q.execute(&mut *tx).await?.rows_affected() > 0
            } else {
                sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)",
                )
                .bind(client_id)
                .fetch_one(&mut *tx)
                .await?
            };

            if let Some(phone_numbers) = &update.phone_numbers {
                sqlx::query("DELETE FROM clients_numbers WHERE client_id = $1")
                    .bind(client_id)
                    .execute(&mut *tx)
                    .await?;

                insert_phone_numbers(&mut *tx, client_id, phone_numbers).await?;
            }

            tx.commit().await?;
            Ok(client_found)
        }
        .await;
        timer.finish(&result);
        result
    }

    /// Delete the phone number rows matching both the client and the value.
    ///
    /// Returns the number of rows removed.
    pub async fn delete_phone_number(
        &self,
        client_id: i32,
        phone_number: &str,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_phone_number");
        let result = sqlx::query(
            r#"
            DELETE FROM clients_numbers
            WHERE client_id = $1 AND phone_number = $2
            "#,
        )
        .bind(client_id)
        .bind(phone_number)
        .execute(&self.pool)
        .await
        .map(|r| r.rows_affected());
        timer.finish(&result);
        result
    }

    /// Delete a client. Its phone numbers go with it via `ON DELETE CASCADE`.
    ///
    /// Returns the number of client rows removed.
    pub async fn delete_client(&self, client_id: i32) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_client");
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(client_id)
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected());
        timer.finish(&result);
        result
    }

    /// Fetch joined client/phone rows matching the filter.
    ///
    /// Rows are ordered by client id, then by phone number insertion order.
    pub async fn search(
        &self,
        filter: &ClientFilter,
    ) -> Result<Vec<ClientPhoneRowEntity>, sqlx::Error> {
        let timer = QueryTimer::new("search_clients");

        let conditions = search_conditions(filter);
        let mut query = CLIENT_ROWS_SELECT.to_string();
        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }
        query.push_str(CLIENT_ROWS_ORDER);

        tracing::debug!(criteria = conditions.len(), "Searching clients");

        let mut q = sqlx::query_as::<_, ClientPhoneRowEntity>(&query);
        if let Some(first_name) = &filter.first_name {
            q = q.bind(substring_pattern(first_name));
        }
        if let Some(last_name) = &filter.last_name {
            q = q.bind(substring_pattern(last_name));
        }
        if let Some(email) = &filter.email {
            q = q.bind(email);
        }
        if let Some(phone_number) = &filter.phone_number {
            q = q.bind(phone_number);
        }

        let result = q.fetch_all(&self.pool).await;
        timer.finish(&result);
        result
    }

    /// Fetch joined client/phone rows for a single client.
    pub async fn find_rows_by_id(
        &self,
        client_id: i32,
    ) -> Result<Vec<ClientPhoneRowEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_client_by_id");
        let query = format!("{} WHERE c.id = $1{}", CLIENT_ROWS_SELECT, CLIENT_ROWS_ORDER);
        let result = sqlx::query_as::<_, ClientPhoneRowEntity>(&query)
            .bind(client_id)
            .fetch_all(&self.pool)
            .await;
        timer.finish(&result);
        result
    }
}

async fn insert_phone_numbers(
    conn: &mut PgConnection,
    client_id: i32,
    phone_numbers: &[String],
) -> Result<(), sqlx::Error> {
    for number in phone_numbers {
        sqlx::query(
            r#"
            INSERT INTO clients_numbers (phone_number, client_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(number)
        .bind(client_id)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// `SET` clauses for the present fields. `$1` is reserved for the client id.
fn update_assignments(update: &ClientUpdate) -> Vec<String> {
    let mut assignments = Vec::new();
    let mut param_idx = 2;

    if update.first_name.is_some() {
        assignments.push(format!("first_name = ${}", param_idx));
        param_idx += 1;
    }
    if update.last_name.is_some() {
        assignments.push(format!("last_name = ${}", param_idx));
        param_idx += 1;
    }
    if update.email.is_some() {
        assignments.push(format!("email = ${}", param_idx));
    }

    assignments
}

/// `WHERE` conditions for the present criteria, in bind order.
fn search_conditions(filter: &ClientFilter) -> Vec<String> {
    let mut conditions = Vec::new();
    let mut param_idx = 1;

    if filter.first_name.is_some() {
        conditions.push(format!("c.first_name ILIKE ${}", param_idx));
        param_idx += 1;
    }
    if filter.last_name.is_some() {
        conditions.push(format!("c.last_name ILIKE ${}", param_idx));
        param_idx += 1;
    }
    if filter.email.is_some() {
        conditions.push(format!("c.email = ${}", param_idx));
        param_idx += 1;
    }
    // Matched through a subquery so the client keeps all of its numbers.
    if filter.phone_number.is_some() {
        conditions.push(format!(
            "EXISTS (SELECT 1 FROM clients_numbers pn WHERE pn.client_id = c.id AND pn.phone_number = ${})",
            param_idx
        ));
    }

    conditions
}

fn substring_pattern(value: &str) -> String {
    format!("%{}%", value)
}
