//! Client entity (database row mapping).

use domain::models::Client;
use indexmap::IndexMap;
use sqlx::FromRow;

/// One row of `clients LEFT JOIN clients_numbers`.
///
/// A client with several numbers yields several rows; a client with none
/// yields one row whose `phone_number` is NULL.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ClientPhoneRowEntity {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
}

/// Folds joined rows into one `Client` per id.
///
/// Clients keep the order in which they first appear and phone numbers keep
/// row order. NULL and empty phone values are skipped, so a client without
/// numbers still comes back with an empty list.
pub fn group_client_rows<I>(rows: I) -> Vec<Client>
where
    I: IntoIterator<Item = ClientPhoneRowEntity>,
{
    let mut clients: IndexMap<i32, Client> = IndexMap::new();

    for row in rows {
        let client = clients
            .entry(row.id)
            .or_insert_with(|| Client::new(row.id, row.first_name, row.last_name, row.email));

        if let Some(phone) = row.phone_number.filter(|p| !p.is_empty()) {
            client.phones.push(phone);
        }
    }

    clients.into_values().collect()
}
