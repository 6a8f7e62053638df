//! Client domain models.

use serde::{Deserialize, Serialize};

/// A client together with every phone number recorded for it.
///
/// Records are rebuilt from storage on every read; `phones` keeps the order in
/// which the numbers were inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Client {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phones: Vec<String>,
}

impl Client {
    /// Creates a client record with no phone numbers.
    pub fn new(id: i32, first_name: String, last_name: String, email: String) -> Self {
        Self {
            id,
            first_name,
            last_name,
            email,
            phones: Vec::new(),
        }
    }
}

/// Input for creating a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NewClient {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone_numbers: Vec<String>,
}

impl NewClient {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone_numbers: Vec::new(),
        }
    }

    /// Sets the phone numbers to record alongside the client.
    pub fn with_phone_numbers<I, S>(mut self, phone_numbers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.phone_numbers = phone_numbers.into_iter().map(Into::into).collect();
        self
    }
}

/// Partial update of a client.
///
/// `None` leaves a field untouched. `phone_numbers: Some(..)` replaces the
/// whole set of numbers, so `Some(vec![])` removes them all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ClientUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_numbers: Option<Vec<String>>,
}

impl ClientUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    pub fn last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn phone_numbers<I, S>(mut self, phone_numbers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.phone_numbers = Some(phone_numbers.into_iter().map(Into::into).collect());
        self
    }

    /// Returns true if no field would be written.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.phone_numbers.is_none()
    }

    /// Returns true if any column of the clients table is touched.
    pub fn has_field_changes(&self) -> bool {
        self.first_name.is_some() || self.last_name.is_some() || self.email.is_some()
    }
}

/// Search criteria for clients. Criteria are combined with AND.
///
/// Names match as case-insensitive substrings, email and phone number match
/// exactly. An empty filter matches every client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ClientFilter {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

impl ClientFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    pub fn last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    /// Returns true if no criterion is set.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.phone_number.is_none()
    }
}

/// Result of a client update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum UpdateOutcome {
    /// Statements were executed. `client_found` is false when no client has
    /// the given id, in which case nothing was changed.
    Updated { client_found: bool },
    /// Every field was absent; storage was not touched.
    NoChangesRequested,
}

impl UpdateOutcome {
    pub fn is_no_changes(&self) -> bool {
        matches!(self, UpdateOutcome::NoChangesRequested)
    }
}
