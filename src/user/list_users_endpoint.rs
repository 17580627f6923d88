//! Defines the endpoint for listing every registered account.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::Claims,
    user::{User, core::list_users},
};

/// The state needed to list user accounts.
#[derive(Debug, Clone)]
pub struct ListUsersState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListUsersState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for listing every registered account, newest first.
///
/// Only admins and managers may list users.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn list_users_endpoint(
    State(state): State<ListUsersState>,
    claims: Claims,
) -> Result<Json<Vec<User>>, Error> {
    if !claims.role.is_privileged() {
        return Err(Error::Forbidden);
    }

    let connection = state.db_connection.lock().unwrap();
    let users = list_users(&connection)?;

    Ok(Json(users))
}
