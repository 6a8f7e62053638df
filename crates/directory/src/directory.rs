//! The client directory component.

use domain::models::{Client, ClientFilter, ClientUpdate, NewClient, UpdateOutcome};
use persistence::db::{create_pool, DatabaseConfig};
use persistence::entities::group_client_rows;
use persistence::repositories::ClientRepository;
use persistence::schema;
use sqlx::PgPool;
use tracing::{debug, info, warn};

use crate::error::DirectoryError;

/// Create, read, update and delete access to clients and their phone numbers.
///
/// Holds a connection pool handle; every operation checks a connection out
/// for the duration of its statement or transaction. Cloning is cheap and
/// shares the pool.
#[derive(Clone)]
pub struct ClientDirectory {
    repo: ClientRepository,
}

impl ClientDirectory {
    /// Creates a directory over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            repo: ClientRepository::new(pool),
        }
    }

    /// Connects to the database described by `config`.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DirectoryError> {
        let pool = create_pool(config).await.map_err(|e| {
            let err = DirectoryError::from(e);
            warn!(host = %config.host, database = %config.name, error = %err, "Failed to connect");
            err
        })?;
        info!(host = %config.host, database = %config.name, "Connected to client database");
        Ok(Self::new(pool))
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        self.repo.pool()
    }

    /// Creates the client tables if they do not exist.
    pub async fn initialize(&self) -> Result<(), DirectoryError> {
        schema::create_tables(self.pool()).await?;
        info!("Client tables ready");
        Ok(())
    }

    /// Creates a client with its phone numbers and returns the new client id.
    ///
    /// The client row and its numbers are written in one transaction. Fails
    /// with `UniqueConstraintViolation` if the email is already taken.
    pub async fn create_client(&self, client: &NewClient) -> Result<i32, DirectoryError> {
        let client_id = self
            .repo
            .insert_client(
                &client.first_name,
                &client.last_name,
                &client.email,
                &client.phone_numbers,
            )
            .await
            .map_err(|e| {
                let err = DirectoryError::from(e);
                warn!(email = %client.email, error = %err, "Failed to create client");
                err
            })?;

        info!(
            client_id,
            phone_count = client.phone_numbers.len(),
            "Client created"
        );
        Ok(client_id)
    }

    /// Adds a phone number to an existing client and returns the number's id.
    ///
    /// Fails with `ForeignKeyViolation` if the client does not exist.
    pub async fn add_phone_number(
        &self,
        phone_number: &str,
        client_id: i32,
    ) -> Result<i32, DirectoryError> {
        let phone_id = self
            .repo
            .insert_phone_number(client_id, phone_number)
            .await
            .map_err(|e| {
                let err = DirectoryError::from(e);
                warn!(client_id, error = %err, "Failed to add phone number");
                err
            })?;

        info!(client_id, phone_id, "Phone number added");
        Ok(phone_id)
    }

    /// Applies a partial update to a client.
    ///
    /// An update with no fields set returns `NoChangesRequested` without
    /// touching the database.
    pub async fn update_client(
        &self,
        client_id: i32,
        update: &ClientUpdate,
    ) -> Result<UpdateOutcome, DirectoryError> {
        if update.is_empty() {
            debug!(client_id, "Update requested with no changes");
            return Ok(UpdateOutcome::NoChangesRequested);
        }

        let client_found = self.repo.update_client(client_id, update).await?;

        if client_found {
            info!(
                client_id,
                replaced_phones = update.phone_numbers.is_some(),
                "Client updated"
            );
        } else {
            debug!(client_id, "Update matched no client");
        }
        Ok(UpdateOutcome::Updated { client_found })
    }

    /// Removes `phone_number` from the given client only.
    ///
    /// Returns the number of rows removed; zero is not an error.
    pub async fn delete_phone_number(
        &self,
        client_id: i32,
        phone_number: &str,
    ) -> Result<u64, DirectoryError> {
        let removed = self.repo.delete_phone_number(client_id, phone_number).await?;
        info!(client_id, removed, "Phone number deleted");
        Ok(removed)
    }

    /// Deletes a client together with all of its phone numbers.
    ///
    /// Returns the number of clients removed; zero is not an error.
    pub async fn delete_client(&self, client_id: i32) -> Result<u64, DirectoryError> {
        let removed = self.repo.delete_client(client_id).await?;
        info!(client_id, removed, "Client deleted");
        Ok(removed)
    }

    /// Finds the clients matching every criterion set in `filter`.
    ///
    /// Each client carries all of its phone numbers. An empty filter lists
    /// every client.
    pub async fn find_clients(&self, filter: &ClientFilter) -> Result<Vec<Client>, DirectoryError> {
        let rows = self.repo.search(filter).await?;
        let clients = group_client_rows(rows);
        debug!(count = clients.len(), "Clients found");
        Ok(clients)
    }

    /// Lists every client with its phone numbers.
    pub async fn list_all_clients(&self) -> Result<Vec<Client>, DirectoryError> {
        self.find_clients(&ClientFilter::default()).await
    }

    /// Fetches a single client by id.
    pub async fn get_client(&self, client_id: i32) -> Result<Option<Client>, DirectoryError> {
        let rows = self.repo.find_rows_by_id(client_id).await?;
        Ok(group_client_rows(rows).into_iter().next())
    }
}
