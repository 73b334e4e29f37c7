//! Account operations against the users table.
//!
//! The credential check is an equality filter evaluated by the remote store;
//! the scheme itself belongs to the backend. Errors surface synchronously to
//! the login/register form and commit no partial state.

use crate::catalog::CatalogClient;
use crate::client::ListOptions;
use crate::error::{Result, StoreError};
use crate::filter::Filter;
use chorus_core::decode::fields;
use chorus_core::{decode_user, User};
use serde_json::{Map, Value};
use tracing::info;

impl CatalogClient {
    /// Sign in. Zero matching rows means bad credentials.
    pub(crate) async fn auth_login(&self, email: &str, password: &str) -> Result<User> {
        let filter = Filter::all(vec![
            Filter::field_eq(fields::EMAIL, email),
            Filter::field_eq(fields::PASSWORD, password),
        ]);
        let records = self
            .store()
            .list(&self.tables().users, &ListOptions::filtered(filter))
            .await?;

        let record = records.first().ok_or(StoreError::InvalidCredentials)?;
        let user = decode_user(record)
            .entity()
            .ok_or_else(|| StoreError::Parse(format!("user {}: malformed row", record.id)))?;
        info!(user = %user.id, "Signed in");
        Ok(user)
    }

    /// Register a new account. The email must not already exist.
    pub(crate) async fn auth_register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<User> {
        let existing = self
            .store()
            .list(
                &self.tables().users,
                &ListOptions::filtered(Filter::field_eq(fields::EMAIL, email)),
            )
            .await?;
        if !existing.is_empty() {
            return Err(StoreError::EmailTaken);
        }

        let mut new_fields = Map::new();
        new_fields.insert(fields::EMAIL.into(), Value::String(email.into()));
        new_fields.insert(fields::PASSWORD.into(), Value::String(password.into()));
        new_fields.insert(fields::NAME.into(), Value::String(name.into()));

        let record = self.store().create(&self.tables().users, new_fields).await?;
        let user = decode_user(&record)
            .entity()
            .ok_or_else(|| StoreError::Parse(format!("user {}: malformed row", record.id)))?;
        info!(user = %user.id, "Registered account");
        Ok(user)
    }
}
